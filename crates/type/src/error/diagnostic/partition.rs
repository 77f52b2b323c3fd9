// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

pub fn referenced_by_foreign_key(class: &str, operation: &str) -> Diagnostic {
	Diagnostic {
		code: "PARTITION_001".to_string(),
		message: format!("cannot {} on `{}`: the class is referenced by a foreign key", operation, class),
		label: Some("referenced class".to_string()),
		help: Some("only ADD PARTITION and ANALYZE PARTITION are allowed on referenced classes".to_string()),
		..Default::default()
	}
}

pub fn not_partitioned(class: &str) -> Diagnostic {
	Diagnostic {
		code: "PARTITION_002".to_string(),
		message: format!("class `{}` is not partitioned", class),
		..Default::default()
	}
}

pub fn already_partitioned(class: &str) -> Diagnostic {
	Diagnostic {
		code: "PARTITION_003".to_string(),
		message: format!("class `{}` is already partitioned", class),
		..Default::default()
	}
}

pub fn operation_not_allowed(class: &str, operation: &str, kind: &str) -> Diagnostic {
	Diagnostic {
		code: "PARTITION_004".to_string(),
		message: format!("{} is not allowed on {} partitioned class `{}`", operation, kind, class),
		..Default::default()
	}
}

pub fn invalid_range(class: &str, partition: &str, reason: &str) -> Diagnostic {
	Diagnostic {
		code: "PARTITION_005".to_string(),
		message: format!("invalid range for partition `{}` of `{}`: {}", partition, class, reason),
		label: Some("range bounds".to_string()),
		..Default::default()
	}
}

pub fn duplicate_list_value(class: &str, value: &str) -> Diagnostic {
	Diagnostic {
		code: "PARTITION_006".to_string(),
		message: format!("list value {} appears in more than one partition of `{}`", value, class),
		..Default::default()
	}
}

pub fn invalid_hash_size(class: &str, size: u32, max: u32) -> Diagnostic {
	Diagnostic {
		code: "PARTITION_007".to_string(),
		message: format!("invalid hash partition count {} for `{}` (allowed 1..={})", size, class, max),
		..Default::default()
	}
}

pub fn no_partition_for_value(class: &str, value: &str) -> Diagnostic {
	Diagnostic {
		code: "PARTITION_008".to_string(),
		message: format!("no partition of `{}` accepts key value {}", class, value),
		label: Some("unroutable row".to_string()),
		..Default::default()
	}
}

pub fn cannot_remove_all(class: &str, operation: &str) -> Diagnostic {
	Diagnostic {
		code: "PARTITION_009".to_string(),
		message: format!("{} would leave `{}` without partitions", operation, class),
		help: Some("use REMOVE PARTITIONING instead".to_string()),
		..Default::default()
	}
}

pub fn unique_without_key(class: &str, constraint: &str, key: &str) -> Diagnostic {
	Diagnostic {
		code: "PARTITION_010".to_string(),
		message: format!("constraint `{}` of `{}` must include partition key `{}`", constraint, class, key),
		..Default::default()
	}
}

pub fn duplicate_partition_name(class: &str, partition: &str) -> Diagnostic {
	Diagnostic {
		code: "PARTITION_011".to_string(),
		message: format!("partition `{}` already exists in `{}`", partition, class),
		..Default::default()
	}
}
