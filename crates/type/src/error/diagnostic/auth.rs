// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

/// DDL statements are blocked by configuration
pub fn ddl_blocked() -> Diagnostic {
	Diagnostic {
		code: "AUTH_001".to_string(),
		message: "DDL statements are blocked for this session".to_string(),
		help: Some("unset `block_ddl_statement` to allow schema changes".to_string()),
		..Default::default()
	}
}
