// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

/// The transaction no longer exists; nothing can be rolled back inside it.
pub fn transaction_aborted(reason: &str) -> Diagnostic {
	Diagnostic {
		code: "TXN_001".to_string(),
		message: format!("transaction was aborted: {}", reason),
		label: Some("transaction gone".to_string()),
		help: Some("restart the transaction".to_string()),
		..Default::default()
	}
}

pub fn deadlock_victim(class: &str) -> Diagnostic {
	Diagnostic {
		code: "TXN_002".to_string(),
		message: format!("transaction chosen as deadlock victim while locking `{}`", class),
		label: Some("transaction gone".to_string()),
		help: Some("retry the statement in a new transaction".to_string()),
		..Default::default()
	}
}

pub fn unknown_savepoint(name: &str) -> Diagnostic {
	Diagnostic {
		code: "TXN_003".to_string(),
		message: format!("savepoint `{}` does not exist", name),
		..Default::default()
	}
}

pub fn transaction_closed() -> Diagnostic {
	Diagnostic {
		code: "TXN_004".to_string(),
		message: "transaction is already committed or rolled back".to_string(),
		..Default::default()
	}
}

/// Another transaction committed a change to the same object first.
pub fn write_conflict(object: &str) -> Diagnostic {
	Diagnostic {
		code: "TXN_005".to_string(),
		message: format!("`{}` was changed by a transaction that committed first", object),
		label: Some("write conflict".to_string()),
		help: Some("retry the transaction".to_string()),
		..Default::default()
	}
}
