// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use altera_type::Result;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Session parameters consulted by ALTER execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DdlConfig {
	/// Narrowing of character and bit types becomes a configuration error
	/// instead of a per-row check, and NULLs never get filled when NOT NULL
	/// is gained.
	pub alter_table_change_type_strict: bool,
	/// Fill existing NULLs with the type's hard default when NOT NULL is
	/// gained.
	pub add_column_update_hard_default: bool,
	pub block_ddl_statement: bool,
	/// Upper bound for the number of HASH partitions.
	pub max_hash_partitions: u32,
}

impl Default for DdlConfig {
	fn default() -> Self {
		Self {
			alter_table_change_type_strict: false,
			add_column_update_hard_default: false,
			block_ddl_statement: false,
			max_hash_partitions: 1024,
		}
	}
}

impl DdlConfig {
	pub fn from_json(json: &str) -> Result<Self> {
		serde_json::from_str(json).map_err(|err| {
			EngineError::InvalidConfig {
				reason: err.to_string(),
			}
			.into()
		})
	}

	pub fn alter_table_change_type_strict(mut self, value: bool) -> Self {
		self.alter_table_change_type_strict = value;
		self
	}

	pub fn add_column_update_hard_default(mut self, value: bool) -> Self {
		self.add_column_update_hard_default = value;
		self
	}

	pub fn block_ddl_statement(mut self, value: bool) -> Self {
		self.block_ddl_statement = value;
		self
	}

	pub fn max_hash_partitions(mut self, value: u32) -> Self {
		self.max_hash_partitions = value;
		self
	}
}
