// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashSet;

use altera_catalog::{AuthCache, ClassDef, ClassId, ClassTemplate, name::names_equal};
use altera_transaction::{DdlTransaction, SchemaStorage, with_savepoint};
use altera_type::{Result, error::diagnostic::catalog, return_error};
use tracing::{trace, warn};

use crate::{change::ClassHierarchy, config::DdlConfig, statement::AlterHints};

pub const STATEMENT_SAVEPOINT: &str = "__alter_statement";
pub const ADD_ATTRIBUTE_SAVEPOINT: &str = "__alter_add_attribute";
pub const DROP_ATTRIBUTE_SAVEPOINT: &str = "__alter_drop_attribute";
pub const CHANGE_ATTRIBUTE_SAVEPOINT: &str = "__alter_change_attribute";
pub const RENAME_ATTRIBUTE_SAVEPOINT: &str = "__alter_rename_attribute";
pub const DEFAULT_SAVEPOINT: &str = "__alter_default";
pub const CONSTRAINT_SAVEPOINT: &str = "__alter_constraint";
pub const RENAME_CLASS_SAVEPOINT: &str = "__alter_rename_class";
pub const PARTITION_SAVEPOINT: &str = "__alter_partition";

/// Session state threaded through one ALTER statement.
pub struct SchemaEditContext<'a> {
	pub config: &'a DdlConfig,
	pub cache: &'a AuthCache,
	pub user: &'a str,
	pub hints: AlterHints,
	/// Name the next clause resolves its class by. Re-pointed after a
	/// RENAME clause.
	pub entity: String,
	savepoints: Vec<&'static str>,
	warnings: Vec<String>,
}

impl<'a> SchemaEditContext<'a> {
	pub fn new(
		config: &'a DdlConfig,
		cache: &'a AuthCache,
		user: &'a str,
		hints: AlterHints,
		entity: impl Into<String>,
	) -> Self {
		Self {
			config,
			cache,
			user,
			hints,
			entity: entity.into(),
			savepoints: Vec::new(),
			warnings: Vec::new(),
		}
	}

	/// Runs `f` under the named system savepoint; a failure rolls the
	/// transaction back to it.
	pub fn savepoint<T, F>(&mut self, txn: &mut dyn DdlTransaction, name: &'static str, f: F) -> Result<T>
	where
		F: FnOnce(&mut dyn DdlTransaction, &mut Self) -> Result<T>,
	{
		self.savepoints.push(name);
		trace!(savepoint = name, depth = self.savepoints.len(), "enter savepoint");
		let result = with_savepoint(txn, name, |txn| f(txn, &mut *self));
		self.savepoints.pop();
		result
	}

	pub fn savepoint_depth(&self) -> usize {
		self.savepoints.len()
	}

	pub fn warn(&mut self, message: impl Into<String>) {
		let message = message.into();
		warn!(class = %self.entity, "{}", message);
		self.warnings.push(message);
	}

	pub fn warnings(&self) -> &[String] {
		&self.warnings
	}

	pub fn take_warnings(&mut self) -> Vec<String> {
		std::mem::take(&mut self.warnings)
	}

	/// Resolves the class the current clause applies to.
	pub fn class(&self, txn: &dyn DdlTransaction) -> Result<ClassDef> {
		resolve_class(txn, &self.entity)
	}
}

pub fn resolve_class(txn: &dyn DdlTransaction, name: &str) -> Result<ClassDef> {
	match txn.find_class(name)? {
		Some(class) => Ok(class),
		None => return_error!(catalog::class_not_found(name)),
	}
}

/// Flushes the class and fetches it again under a write-exclusive lock.
pub fn lock_class(txn: &mut dyn DdlTransaction, class: ClassId) -> Result<ClassDef> {
	txn.flush_class(class)?;
	txn.fetch_class_for_write(class)
}

/// Opens a template on the class and hands it to `f`. The template is
/// committed when `f` succeeds and aborted otherwise.
pub fn edit_class<T, F>(txn: &mut dyn DdlTransaction, class: ClassId, f: F) -> Result<T>
where
	F: FnOnce(&mut dyn DdlTransaction, &mut ClassTemplate) -> Result<T>,
{
	let mut template = txn.open_template(class)?;
	match f(txn, &mut template) {
		Ok(value) => {
			txn.commit_template(template)?;
			Ok(value)
		}
		Err(err) => {
			txn.abort_template(template);
			Err(err)
		}
	}
}

/// Classes holding rows of `class`: the class itself followed by its
/// partitions.
pub fn storage_classes(txn: &dyn DdlTransaction, class: &ClassDef) -> Result<Vec<ClassDef>> {
	let mut classes = Vec::new();
	let partitions = class.partition.as_ref().map(|info| info.size()).unwrap_or(0);
	classes.try_reserve(partitions + 1)?;
	classes.push(class.clone());
	if let Some(info) = &class.partition {
		for id in info.classes() {
			classes.push(txn.get_class(id)?);
		}
	}
	Ok(classes)
}

/// Class hierarchy as seen by the running transaction.
pub struct TransactionHierarchy<'a> {
	txn: &'a dyn DdlTransaction,
}

impl<'a> TransactionHierarchy<'a> {
	pub fn new(txn: &'a dyn DdlTransaction) -> Self {
		Self {
			txn,
		}
	}
}

impl ClassHierarchy for TransactionHierarchy<'_> {
	fn is_superclass(&self, class: &str, superclass: &str) -> bool {
		let Ok(Some(start)) = self.txn.find_class(class) else {
			return false;
		};

		let mut pending = start.superclasses;
		let mut seen = HashSet::new();
		while let Some(id) = pending.pop() {
			if !seen.insert(id) {
				continue;
			}
			let Ok(def) = self.txn.get_class(id) else {
				continue;
			};
			if names_equal(&def.name, superclass) {
				return true;
			}
			pending.extend(def.superclasses);
		}
		false
	}

	fn contains(&self, class: &str) -> bool {
		matches!(self.txn.find_class(class), Ok(Some(_)))
	}
}

#[cfg(test)]
mod tests {
	use altera_catalog::ClassTemplate;
	use altera_transaction::{MemoryDatabase, MemoryTransaction, SchemaStorage};
	use altera_type::error;

	use super::*;

	fn create(txn: &mut MemoryTransaction, name: &str, superclass: Option<ClassId>) -> ClassId {
		let mut template: ClassTemplate = txn.create_template(name).unwrap();
		if let Some(superclass) = superclass {
			template.add_superclass(superclass);
		}
		txn.commit_template(template).unwrap()
	}

	#[test]
	fn test_hierarchy_walks_superclasses() {
		let db = MemoryDatabase::new();
		let mut txn = db.begin("dba");
		let animal = create(&mut txn, "animal", None);
		let dog = create(&mut txn, "dog", Some(animal));
		create(&mut txn, "puppy", Some(dog));

		let hierarchy = TransactionHierarchy::new(&txn);
		assert!(hierarchy.is_superclass("puppy", "animal"));
		assert!(hierarchy.is_superclass("puppy", "DOG"));
		assert!(!hierarchy.is_superclass("animal", "puppy"));
		assert!(hierarchy.contains("dog"));
		assert!(!hierarchy.contains("cat"));
	}

	#[test]
	fn test_edit_class_aborts_template_on_error() {
		let db = MemoryDatabase::new();
		let mut txn = db.begin("dba");
		let id = create(&mut txn, "t", None);

		let result: Result<()> = edit_class(&mut txn, id, |_, template| {
			template.rename("u");
			Err(error!(catalog::class_not_found("x")))
		});
		assert!(result.is_err());
		assert!(txn.find_class("t").unwrap().is_some());
		assert!(txn.find_class("u").unwrap().is_none());
	}

	#[test]
	fn test_savepoint_rolls_back_nested_work() {
		let db = MemoryDatabase::new();
		let mut txn = db.begin("dba");
		let config = DdlConfig::default();
		let cache = AuthCache::new();
		let mut ctx = SchemaEditContext::new(&config, &cache, "dba", AlterHints::default(), "t");

		let result: Result<()> = ctx.savepoint(&mut txn, STATEMENT_SAVEPOINT, |txn, ctx| {
			assert_eq!(ctx.savepoint_depth(), 1);
			let template = txn.create_template("t")?;
			txn.commit_template(template)?;
			Err(error!(catalog::class_not_found("missing")))
		});

		assert_eq!(result.unwrap_err().code(), "CA_001");
		assert_eq!(ctx.savepoint_depth(), 0);
		assert!(txn.find_class("t").unwrap().is_none());
	}
}
