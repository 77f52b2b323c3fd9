// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

use std::fmt::{Display, Formatter};

pub use altera_type::{Error, Result};

pub mod bulk;
pub mod memory;
pub mod savepoint;
pub mod service;

pub use bulk::BulkStatement;
pub use memory::{MemoryDatabase, MemoryTransaction, Row};
pub use savepoint::with_savepoint;
pub use service::{DdlTransaction, QueryService, SchemaStorage, SerialService, SerialSpec};

#[repr(transparent)]
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TransactionId(pub u64);

impl Display for TransactionId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "txn-{}", self.0)
	}
}
