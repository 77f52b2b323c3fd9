// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

pub fn type_change_not_supported(attribute: &str, from: &str, to: &str) -> Diagnostic {
	Diagnostic {
		code: "ALTER_001".to_string(),
		message: format!("cannot change attribute `{}` from {} to {}", attribute, from, to),
		label: Some("unsupported type transition".to_string()),
		help: Some("add a new attribute with the target type and copy the data explicitly".to_string()),
		..Default::default()
	}
}

pub fn type_change_not_supported_with_config(attribute: &str, from: &str, to: &str) -> Diagnostic {
	Diagnostic {
		code: "ALTER_002".to_string(),
		message: format!("narrowing attribute `{}` from {} to {} is not allowed in strict mode", attribute, from, to),
		label: Some("strict type change".to_string()),
		help: Some("disable `alter_table_change_type_strict` to let rows be checked individually".to_string()),
		..Default::default()
	}
}

pub fn collation_change_not_supported(attribute: &str, from: &str, to: &str) -> Diagnostic {
	Diagnostic {
		code: "ALTER_003".to_string(),
		message: format!("cannot change collation of `{}` from {} to {}", attribute, from, to),
		label: Some("incompatible codeset".to_string()),
		..Default::default()
	}
}

pub fn auto_increment_not_supported(attribute: &str, domain: &str) -> Diagnostic {
	Diagnostic {
		code: "ALTER_004".to_string(),
		message: format!("AUTO_INCREMENT is not supported for attribute `{}` of type {}", attribute, domain),
		label: Some("invalid auto increment".to_string()),
		help: Some("AUTO_INCREMENT requires an instance attribute of an integral type".to_string()),
		..Default::default()
	}
}

pub fn partition_key_domain_not_supported(attribute: &str, domain: &str) -> Diagnostic {
	Diagnostic {
		code: "ALTER_005".to_string(),
		message: format!("attribute `{}` of type {} cannot be used as a partition key", attribute, domain),
		label: Some("invalid partition key".to_string()),
		..Default::default()
	}
}

pub fn no_hard_default(attribute: &str, domain: &str) -> Diagnostic {
	Diagnostic {
		code: "ALTER_006".to_string(),
		message: format!("type {} of attribute `{}` has no hard default value", domain, attribute),
		label: Some("missing hard default".to_string()),
		help: Some("provide an explicit DEFAULT for the attribute".to_string()),
		..Default::default()
	}
}

pub fn change_requires_row_update(attribute: &str) -> Diagnostic {
	Diagnostic {
		code: "ALTER_010".to_string(),
		message: format!("changing attribute `{}` requires rewriting existing rows", attribute),
		label: Some("schema-only change rejected".to_string()),
		..Default::default()
	}
}

pub fn index_across_type_change(attribute: &str, constraint: &str) -> Diagnostic {
	Diagnostic {
		code: "ALTER_011".to_string(),
		message: format!(
			"constraint `{}` on attribute `{}` must be rebuilt because its type changes",
			constraint, attribute
		),
		label: Some("schema-only change rejected".to_string()),
		..Default::default()
	}
}

pub fn auto_increment_with_type_change(attribute: &str) -> Diagnostic {
	Diagnostic {
		code: "ALTER_012".to_string(),
		message: format!("cannot gain AUTO_INCREMENT on `{}` while its type changes in place", attribute),
		label: Some("schema-only change rejected".to_string()),
		..Default::default()
	}
}

pub fn change_requires_row_check(attribute: &str, from: &str, to: &str) -> Diagnostic {
	Diagnostic {
		code: "ALTER_013".to_string(),
		message: format!("changing `{}` from {} to {} requires checking every row", attribute, from, to),
		label: Some("row update change rejected".to_string()),
		..Default::default()
	}
}
