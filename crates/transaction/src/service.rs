// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use altera_catalog::{ClassDef, ClassId, ClassTemplate, ConstraintDef, SerialDef, SerialId};
use altera_type::Result;

use crate::bulk::BulkStatement;

/// Schema side of the storage and lock server. Every call is a blocking
/// request; none can be cancelled half way.
pub trait SchemaStorage {
	fn find_class(&self, name: &str) -> Result<Option<ClassDef>>;

	fn get_class(&self, class: ClassId) -> Result<ClassDef>;

	/// Fetches the class holding a write-exclusive lock on it.
	fn fetch_class_for_write(&mut self, class: ClassId) -> Result<ClassDef>;

	/// Writes any dirty instances of the class back to the server.
	fn flush_class(&mut self, class: ClassId) -> Result<()>;

	fn open_template(&mut self, class: ClassId) -> Result<ClassTemplate>;

	/// Opens a template for a class that does not exist yet.
	fn create_template(&mut self, name: &str) -> Result<ClassTemplate>;

	/// Publishes the template as the new version of its class.
	fn commit_template(&mut self, template: ClassTemplate) -> Result<ClassId>;

	fn abort_template(&mut self, template: ClassTemplate);

	/// Drops the class together with its instances.
	fn drop_class(&mut self, class: ClassId) -> Result<()>;

	/// Foreign keys, on any class, that reference `class`.
	fn referencing_foreign_keys(&self, class: ClassId) -> Result<Vec<(ClassId, ConstraintDef)>>;

	fn update_statistics(&mut self, class: ClassId) -> Result<()>;

	fn savepoint(&mut self, name: &str) -> Result<()>;

	fn abort_to_savepoint(&mut self, name: &str) -> Result<()>;

	/// Forgets the savepoint and every savepoint set after it, keeping
	/// their work.
	fn release_savepoint(&mut self, name: &str) -> Result<()>;
}

/// Runs generated statements and reports how many rows they touched.
pub trait QueryService {
	fn run(&mut self, statement: &BulkStatement) -> Result<u64>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SerialSpec {
	pub name: String,
	pub start: i64,
	pub increment: i64,
	pub owner_class: Option<ClassId>,
	pub owner_attribute: Option<String>,
}

pub trait SerialService {
	fn create_serial(&mut self, spec: SerialSpec) -> Result<SerialDef>;

	/// Deletes the serial and drops any cached values of it.
	fn delete_serial(&mut self, serial: SerialId) -> Result<()>;

	fn rename_serial(&mut self, serial: SerialId, name: &str) -> Result<()>;

	fn find_serial(&self, name: &str) -> Result<Option<SerialDef>>;

	fn get_serial(&self, serial: SerialId) -> Result<SerialDef>;
}

/// Everything a DDL statement needs from the transaction it runs in.
pub trait DdlTransaction: SchemaStorage + QueryService + SerialService {}

impl<T: SchemaStorage + QueryService + SerialService + ?Sized> DdlTransaction for T {}
