// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use altera_type::Result;
use tracing::{debug, warn};

use crate::service::SchemaStorage;

/// Runs `f` under a named savepoint. On success the savepoint is released.
/// On error the transaction is rolled back to the savepoint, unless the
/// error says the transaction itself is gone.
pub fn with_savepoint<X, T, F>(txn: &mut X, name: &str, f: F) -> Result<T>
where
	X: SchemaStorage + ?Sized,
	F: FnOnce(&mut X) -> Result<T>,
{
	txn.savepoint(name)?;

	match f(txn) {
		Ok(value) => {
			txn.release_savepoint(name)?;
			Ok(value)
		}
		Err(err) if err.is_transaction_aborted() => {
			debug!(savepoint = name, code = err.code(), "transaction aborted, skipping rollback");
			Err(err)
		}
		Err(err) => {
			debug!(savepoint = name, code = err.code(), "rolling back to savepoint");
			if let Err(rollback) = txn.abort_to_savepoint(name).and_then(|_| txn.release_savepoint(name)) {
				warn!(savepoint = name, code = rollback.code(), "rollback to savepoint failed");
			}
			Err(err)
		}
	}
}
