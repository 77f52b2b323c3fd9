// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

pub fn value_out_of_range(value: &str, domain: &str) -> Diagnostic {
	Diagnostic {
		code: "COERCE_001".to_string(),
		message: format!("value {} is out of range for {}", value, domain),
		label: Some("overflow".to_string()),
		..Default::default()
	}
}

pub fn value_too_long(value: &str, domain: &str, length: usize) -> Diagnostic {
	Diagnostic {
		code: "COERCE_002".to_string(),
		message: format!("value {} of length {} does not fit {}", value, length, domain),
		label: Some("truncation".to_string()),
		..Default::default()
	}
}

pub fn invalid_conversion(value: &str, domain: &str) -> Diagnostic {
	Diagnostic {
		code: "COERCE_003".to_string(),
		message: format!("cannot convert {} to {}", value, domain),
		label: Some("invalid conversion".to_string()),
		..Default::default()
	}
}

pub fn row_coercion_failed(class: &str, attribute: &str, cause: Diagnostic) -> Diagnostic {
	Diagnostic {
		code: "COERCE_004".to_string(),
		message: format!("existing row of `{}` cannot be converted for attribute `{}`", class, attribute),
		label: Some("row rewrite failed".to_string()),
		help: Some("fix or delete the offending rows before changing the attribute".to_string()),
		cause: Some(Box::new(cause)),
		..Default::default()
	}
}

pub fn default_coercion_failed(attribute: &str, cause: Diagnostic) -> Diagnostic {
	Diagnostic {
		code: "COERCE_005".to_string(),
		message: format!("default value of `{}` does not fit its type", attribute),
		label: Some("invalid default".to_string()),
		cause: Some(Box::new(cause)),
		..Default::default()
	}
}
