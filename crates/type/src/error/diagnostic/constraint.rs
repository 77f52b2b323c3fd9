// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

pub fn partition_key_change(attribute: &str) -> Diagnostic {
	Diagnostic {
		code: "CONSTRAINT_001".to_string(),
		message: format!("attribute `{}` is the partition key and cannot be changed", attribute),
		label: Some("partition key".to_string()),
		help: Some("remove partitioning before changing the key attribute".to_string()),
		..Default::default()
	}
}

pub fn foreign_key_attribute_change(attribute: &str, constraint: &str) -> Diagnostic {
	Diagnostic {
		code: "CONSTRAINT_002".to_string(),
		message: format!(
			"attribute `{}` is part of foreign key `{}` and only the foreign key itself may change",
			attribute, constraint
		),
		label: Some("foreign key member".to_string()),
		help: Some("drop the foreign key, alter the attribute, then recreate the foreign key".to_string()),
		..Default::default()
	}
}

pub fn namespace_change(attribute: &str, from: &str, to: &str) -> Diagnostic {
	Diagnostic {
		code: "CONSTRAINT_003".to_string(),
		message: format!("attribute `{}` cannot move from {} to {}", attribute, from, to),
		label: Some("namespace change".to_string()),
		..Default::default()
	}
}

pub fn not_null_on_lob(attribute: &str) -> Diagnostic {
	Diagnostic {
		code: "CONSTRAINT_004".to_string(),
		message: format!("NOT NULL cannot be added to LOB attribute `{}`", attribute),
		label: Some("lob attribute".to_string()),
		..Default::default()
	}
}

pub fn not_null_on_class_attribute(attribute: &str) -> Diagnostic {
	Diagnostic {
		code: "CONSTRAINT_005".to_string(),
		message: format!("NOT NULL cannot be added to class attribute `{}`", attribute),
		label: Some("class attribute".to_string()),
		..Default::default()
	}
}

pub fn multiple_primary_keys(class: &str) -> Diagnostic {
	Diagnostic {
		code: "CONSTRAINT_006".to_string(),
		message: format!("class `{}` already has a primary key", class),
		label: Some("duplicate primary key".to_string()),
		help: Some("drop the existing primary key first".to_string()),
		..Default::default()
	}
}

pub fn subclass_schema_frozen(class: &str, attribute: &str) -> Diagnostic {
	Diagnostic {
		code: "CONSTRAINT_007".to_string(),
		message: format!(
			"class `{}` has subclasses; only the default value of `{}` may be changed",
			class, attribute
		),
		label: Some("inherited attribute".to_string()),
		..Default::default()
	}
}

pub fn null_values_present(class: &str, attribute: &str, count: u64) -> Diagnostic {
	Diagnostic {
		code: "CONSTRAINT_008".to_string(),
		message: format!("cannot add NOT NULL to `{}.{}`: {} row(s) hold NULL", class, attribute, count),
		label: Some("null values".to_string()),
		help: Some("provide a DEFAULT or enable `add_column_update_hard_default`".to_string()),
		..Default::default()
	}
}

pub fn duplicate_values(class: &str, constraint: &str, count: u64) -> Diagnostic {
	Diagnostic {
		code: "CONSTRAINT_009".to_string(),
		message: format!("cannot create `{}` on `{}`: {} duplicate key(s)", constraint, class, count),
		label: Some("duplicate keys".to_string()),
		..Default::default()
	}
}

pub fn primary_key_referenced(class: &str, constraint: &str, referencing: &str) -> Diagnostic {
	Diagnostic {
		code: "CONSTRAINT_010".to_string(),
		message: format!(
			"primary key `{}` of `{}` is referenced by foreign key `{}`",
			constraint, class, referencing
		),
		label: Some("referenced primary key".to_string()),
		help: Some("drop the referencing foreign key first".to_string()),
		..Default::default()
	}
}

pub fn foreign_key_target_invalid(constraint: &str, referenced: &str, reason: &str) -> Diagnostic {
	Diagnostic {
		code: "CONSTRAINT_011".to_string(),
		message: format!("foreign key `{}` cannot reference `{}`: {}", constraint, referenced, reason),
		label: Some("invalid foreign key".to_string()),
		..Default::default()
	}
}

pub fn prefix_index_collation(attribute: &str, constraint: &str, collation: &str) -> Diagnostic {
	Diagnostic {
		code: "CONSTRAINT_012".to_string(),
		message: format!(
			"prefix index `{}` on `{}` is not allowed with collation {}",
			constraint, attribute, collation
		),
		label: Some("prefix index".to_string()),
		..Default::default()
	}
}

pub fn partition_key_locked(attribute: &str, operation: &str) -> Diagnostic {
	Diagnostic {
		code: "CONSTRAINT_013".to_string(),
		message: format!("cannot {} partition key attribute `{}`", operation, attribute),
		label: Some("partition key".to_string()),
		..Default::default()
	}
}

pub fn expression_recompile_failed(constraint: &str, expression: &str, reason: &str) -> Diagnostic {
	Diagnostic {
		code: "CONSTRAINT_014".to_string(),
		message: format!("cannot recompile expression `{}` of `{}`: {}", expression, constraint, reason),
		label: Some("stale expression".to_string()),
		..Default::default()
	}
}

pub fn empty_constraint(constraint: &str) -> Diagnostic {
	Diagnostic {
		code: "CONSTRAINT_015".to_string(),
		message: format!("constraint `{}` lists no attributes", constraint),
		..Default::default()
	}
}

pub fn class_attribute_in_key(attribute: &str, constraint: &str) -> Diagnostic {
	Diagnostic {
		code: "CONSTRAINT_016".to_string(),
		message: format!("`{}` is not an instance attribute and cannot be part of `{}`", attribute, constraint),
		label: Some("shared or class attribute".to_string()),
		..Default::default()
	}
}
