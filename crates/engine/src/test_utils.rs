// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use altera_catalog::{AttributeDef, AttributePosition, ClassDef, ClassId};
use altera_transaction::{MemoryDatabase, SchemaStorage};
use altera_type::{Domain, Value};
use indexmap::IndexMap;

use crate::{
	AlterResult, DdlConfig, Executor, Result,
	statement::{AlterClause, AlterStatement},
};

/// A memory database together with an executor sharing its auth cache.
pub struct TestDatabase {
	pub db: MemoryDatabase,
	pub executor: Executor,
}

impl Default for TestDatabase {
	fn default() -> Self {
		Self::new()
	}
}

impl TestDatabase {
	pub fn new() -> Self {
		Self::with_config(DdlConfig::default())
	}

	pub fn with_config(config: DdlConfig) -> Self {
		let db = MemoryDatabase::new();
		let executor = Executor::new(config, db.cache());
		Self {
			db,
			executor,
		}
	}

	/// Creates and commits a plain class with the given attributes.
	pub fn create_class(&self, name: &str, attributes: &[(&str, Domain)]) -> ClassId {
		let mut txn = self.db.begin("dba");
		let mut template = txn.create_template(name).unwrap();
		for (attribute, domain) in attributes {
			template.add_attribute(AttributeDef::new(*attribute, domain.clone()), AttributePosition::Last).unwrap();
		}
		let id = txn.commit_template(template).unwrap();
		txn.commit().unwrap();
		id
	}

	pub fn insert(&self, class: &str, rows: &[&[(&str, Value)]]) {
		let mut txn = self.db.begin("dba");
		for row in rows {
			txn.insert(class, row).unwrap();
		}
		txn.commit().unwrap();
	}

	/// Runs the statement in its own transaction, committing on success and
	/// rolling back otherwise.
	pub fn alter(&self, statement: AlterStatement) -> Result<AlterResult> {
		let mut txn = self.db.begin("dba");
		match self.executor.execute_alter(&mut txn, "dba", &statement) {
			Ok(result) => {
				txn.commit()?;
				Ok(result)
			}
			Err(err) => {
				txn.rollback();
				Err(err)
			}
		}
	}

	pub fn alter_one(&self, class: &str, clause: AlterClause) -> Result<AlterResult> {
		self.alter(AlterStatement::new(class, vec![clause]))
	}

	pub fn class(&self, name: &str) -> ClassDef {
		self.db.class(name).unwrap_or_else(|| panic!("class {} does not exist", name))
	}

	pub fn select(&self, class: &str) -> Vec<IndexMap<String, Value>> {
		self.db.select(class).unwrap()
	}

	/// Values of one attribute across the class and its partitions, sorted.
	pub fn column(&self, class: &str, attribute: &str) -> Vec<Value> {
		let mut values: Vec<Value> = self.select(class).into_iter().map(|row| row[attribute].clone()).collect();
		values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
		values
	}

	/// Rows stored directly in the class.
	pub fn rows_in(&self, class: &str) -> usize {
		let txn = self.db.begin("dba");
		let count = txn.select_only(class).unwrap().len();
		txn.rollback();
		count
	}
}
