// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

/// Internal invariant violation with the source location attached
pub fn internal_with_context(reason: impl Into<String>, file: &str, line: u32, module_path: &str) -> Diagnostic {
	Diagnostic {
		code: "INTERNAL_ERROR".to_string(),
		message: format!("internal error: {}", reason.into()),
		label: Some(format!("internal invariant violated at {}:{}", file, line)),
		help: Some("this is a bug; please report it together with the statement".to_string()),
		notes: vec![format!("module: {}", module_path)],
		..Default::default()
	}
}

pub fn internal(reason: impl Into<String>) -> Diagnostic {
	internal_with_context(reason, "unknown", 0, "unknown")
}

pub fn allocation_failed(what: &str, detail: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "ALLOC_001".to_string(),
		message: format!("out of memory while allocating {}: {}", what, detail.into()),
		label: Some("allocation".to_string()),
		..Default::default()
	}
}
