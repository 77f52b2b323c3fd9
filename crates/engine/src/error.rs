// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use altera_type::{Diagnostic, Error, IntoDiagnostic};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
	#[error("invalid DDL configuration: {reason}")]
	InvalidConfig {
		reason: String,
	},

	#[error("cannot parse expression `{expression}`: {reason}")]
	InvalidExpression {
		expression: String,
		reason: String,
	},
}

impl IntoDiagnostic for EngineError {
	fn into_diagnostic(self) -> Diagnostic {
		match self {
			EngineError::InvalidConfig {
				reason,
			} => Diagnostic {
				code: "CONFIG_001".to_string(),
				message: format!("invalid DDL configuration: {}", reason),
				label: Some("configuration".to_string()),
				help: Some("omitted fields keep their default value".to_string()),
				..Default::default()
			},

			EngineError::InvalidExpression {
				expression,
				reason,
			} => Diagnostic {
				code: "EXPRESSION_001".to_string(),
				message: format!("cannot parse expression `{}`: {}", expression, reason),
				label: Some("invalid expression".to_string()),
				..Default::default()
			},
		}
	}
}

impl From<EngineError> for Error {
	fn from(err: EngineError) -> Self {
		Error::new(err.into_diagnostic())
	}
}
