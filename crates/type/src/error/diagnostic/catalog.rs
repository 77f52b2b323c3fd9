// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

pub fn class_not_found(class: &str) -> Diagnostic {
	Diagnostic {
		code: "CA_001".to_string(),
		message: format!("class `{}` not found", class),
		label: Some("unknown class".to_string()),
		help: Some("check the class name or create the class first".to_string()),
		..Default::default()
	}
}

pub fn attribute_not_found(class: &str, attribute: &str) -> Diagnostic {
	Diagnostic {
		code: "CA_002".to_string(),
		message: format!("attribute `{}` not found in class `{}`", attribute, class),
		label: Some("unknown attribute".to_string()),
		..Default::default()
	}
}

pub fn attribute_already_exists(class: &str, attribute: &str) -> Diagnostic {
	Diagnostic {
		code: "CA_003".to_string(),
		message: format!("attribute `{}` already exists in class `{}`", attribute, class),
		label: Some("duplicate attribute".to_string()),
		help: Some("attribute names are case-insensitive and unique across all namespaces".to_string()),
		..Default::default()
	}
}

pub fn class_already_exists(class: &str) -> Diagnostic {
	Diagnostic {
		code: "CA_004".to_string(),
		message: format!("class `{}` already exists", class),
		label: Some("duplicate class".to_string()),
		..Default::default()
	}
}

pub fn constraint_not_found(class: &str, constraint: &str) -> Diagnostic {
	Diagnostic {
		code: "CA_005".to_string(),
		message: format!("constraint `{}` not found in class `{}`", constraint, class),
		label: Some("unknown constraint".to_string()),
		..Default::default()
	}
}

pub fn partition_not_found(class: &str, partition: &str) -> Diagnostic {
	Diagnostic {
		code: "CA_006".to_string(),
		message: format!("partition `{}` does not exist in class `{}`", partition, class),
		label: Some("unknown partition".to_string()),
		..Default::default()
	}
}

pub fn serial_not_found(serial: &str) -> Diagnostic {
	Diagnostic {
		code: "CA_007".to_string(),
		message: format!("serial `{}` not found", serial),
		label: Some("unknown serial".to_string()),
		..Default::default()
	}
}

pub fn serial_already_exists(serial: &str) -> Diagnostic {
	Diagnostic {
		code: "CA_008".to_string(),
		message: format!("serial `{}` already exists", serial),
		label: Some("duplicate serial".to_string()),
		..Default::default()
	}
}

pub fn constraint_already_exists(class: &str, constraint: &str) -> Diagnostic {
	Diagnostic {
		code: "CA_009".to_string(),
		message: format!("constraint `{}` already exists in class `{}`", constraint, class),
		label: Some("duplicate constraint".to_string()),
		..Default::default()
	}
}

pub fn class_id_not_found(id: u64) -> Diagnostic {
	Diagnostic {
		code: "CA_010".to_string(),
		message: format!("class with id {} not found", id),
		label: Some("stale class reference".to_string()),
		notes: vec!["the class may have been dropped by an earlier clause".to_string()],
		..Default::default()
	}
}
