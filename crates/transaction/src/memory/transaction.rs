// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use altera_catalog::{ClassDef, ClassId, ClassTemplate, ConstraintDef};
use altera_type::{
	Result, Value, coerce,
	error::diagnostic::{catalog, coerce as coerce_diag, partition, transaction},
	return_error,
};
use indexmap::IndexMap;
use tracing::{debug, instrument, trace, warn};

use crate::{
	TransactionId,
	memory::{MemoryDatabase, Row, State},
	service::SchemaStorage,
};

#[derive(Debug)]
pub struct MemoryTransaction {
	id: TransactionId,
	user: String,
	db: MemoryDatabase,
	pub(crate) state: State,
	savepoints: Vec<(String, State)>,
	aborted: Option<String>,
}

impl MemoryTransaction {
	pub(crate) fn new(id: TransactionId, user: String, db: MemoryDatabase, state: State) -> Self {
		Self {
			id,
			user,
			db,
			state,
			savepoints: Vec::new(),
			aborted: None,
		}
	}

	pub fn id(&self) -> TransactionId {
		self.id
	}

	pub fn user(&self) -> &str {
		&self.user
	}

	pub fn is_aborted(&self) -> bool {
		self.aborted.is_some()
	}

	/// Number of savepoints currently held.
	pub fn savepoint_depth(&self) -> usize {
		self.savepoints.len()
	}

	#[instrument(name = "transaction::commit", level = "debug", skip(self), fields(transaction = %self.id))]
	pub fn commit(self) -> Result<()> {
		if let Some(reason) = &self.aborted {
			return_error!(transaction::transaction_aborted(reason));
		}
		let published = self.db.publish(self.state);
		self.db.release(self.id);
		self.db.invalidate_cache();
		published
	}

	#[instrument(name = "transaction::rollback", level = "debug", skip(self), fields(transaction = %self.id))]
	pub fn rollback(self) {
		self.db.release(self.id);
		self.db.invalidate_cache();
	}

	/// Inserts a row given by attribute name. Missing attributes take their
	/// default, AUTO_INCREMENT attributes draw from their serial and every
	/// value is coerced into its attribute's domain.
	pub fn insert(&mut self, class: &str, values: &[(&str, Value)]) -> Result<()> {
		self.ensure_active()?;
		let class = self.state.class_by_name(class)?;

		for (name, _) in values {
			if class.find_attribute(name).is_none() {
				return_error!(catalog::attribute_not_found(&class.name, name));
			}
		}

		let mut row = Row::new();
		for attr in class.instance_attributes() {
			let given = values.iter().find(|(name, _)| altera_catalog::name::names_equal(name, &attr.name));
			let value = match given {
				Some((_, value)) => value.clone(),
				None => match &attr.default {
					Some(default) => default.evaluate(&self.user),
					None => Value::Null,
				},
			};

			let value = match (&value, attr.auto_increment) {
				(Value::Null, Some(serial)) => {
					let mut def = match self.state.catalog.find_serial(serial) {
						Some(def) => def,
						None => return_error!(catalog::serial_not_found(&serial.to_string())),
					};
					let next = def.next_value()?;
					self.state.catalog.set_serial(serial, Some(def));
					self.state.touch_serial(serial);
					Value::BigInt(next)
				}
				_ => value,
			};

			let value = coerce(&value, &attr.domain)
				.map_err(|err| coerce_diag::row_coercion_failed(&class.name, &attr.name, err.diagnostic()))
				.map_err(altera_type::Error::new)?;
			row.insert(attr.id, value);
		}

		self.place(&class, row)?;
		Ok(())
	}

	/// Rows of the class and its partitions, keyed by attribute name.
	pub fn select(&self, class: &str) -> Result<Vec<IndexMap<String, Value>>> {
		let class = self.state.class_by_name(class)?;
		let rows = self.state.scan(&class);
		Ok(self.state.named(&class, rows))
	}

	/// Rows stored in the class itself, ignoring partitions.
	pub fn select_only(&self, class: &str) -> Result<Vec<IndexMap<String, Value>>> {
		let class = self.state.class_by_name(class)?;
		let rows = self.state.rows.get(&class.id).cloned().unwrap_or_default();
		Ok(self.state.named(&class, rows))
	}

	pub fn statistics(&self, class: &str) -> Result<Option<u64>> {
		let class = self.state.class_by_name(class)?;
		Ok(self.state.statistics.get(&class.id).copied())
	}

	/// Stores the row in the class or, when the class is partitioned, in the
	/// partition its key value routes to.
	pub(crate) fn place(&mut self, class: &ClassDef, row: Row) -> Result<ClassId> {
		let target = match &class.partition {
			None => class.id,
			Some(info) => {
				let key = match class.find_attribute(&info.key) {
					Some(attr) => row.get(&attr.id).cloned().unwrap_or(Value::Null),
					None => return_error!(catalog::attribute_not_found(&class.name, &info.key)),
				};
				match info.route(&key) {
					Some(def) => def.class,
					None => return_error!(partition::no_partition_for_value(&class.name, &key.to_string())),
				}
			}
		};
		self.state.rows_mut(target).push(row);
		Ok(target)
	}

	pub(crate) fn ensure_active(&self) -> Result<()> {
		match &self.aborted {
			Some(reason) => return_error!(transaction::transaction_aborted(reason)),
			None => Ok(()),
		}
	}

	/// The server gave up on this transaction. Its work is discarded and
	/// every later request fails.
	fn abort_unilaterally(&mut self, reason: String) {
		warn!(transaction = %self.id, reason = %reason, "transaction aborted by server");
		self.state = self.db.snapshot();
		self.savepoints.clear();
		self.db.release(self.id);
		self.aborted = Some(reason);
	}
}

impl SchemaStorage for MemoryTransaction {
	fn find_class(&self, name: &str) -> Result<Option<ClassDef>> {
		self.ensure_active()?;
		Ok(self.state.catalog.find_class_by_name(name))
	}

	fn get_class(&self, class: ClassId) -> Result<ClassDef> {
		self.ensure_active()?;
		self.state.class(class)
	}

	fn fetch_class_for_write(&mut self, class: ClassId) -> Result<ClassDef> {
		self.ensure_active()?;
		let def = self.state.class(class)?;
		if !self.db.lock(class, self.id) {
			self.abort_unilaterally(format!("lock conflict on {}", def.name));
			return_error!(transaction::deadlock_victim(&def.name));
		}
		trace!(transaction = %self.id, class = %def.name, "write lock");
		Ok(def)
	}

	fn flush_class(&mut self, class: ClassId) -> Result<()> {
		self.ensure_active()?;
		self.state.class(class)?;
		Ok(())
	}

	fn open_template(&mut self, class: ClassId) -> Result<ClassTemplate> {
		let def = self.fetch_class_for_write(class)?;
		Ok(ClassTemplate::edit(def))
	}

	fn create_template(&mut self, name: &str) -> Result<ClassTemplate> {
		self.ensure_active()?;
		if self.state.catalog.find_class_by_name(name).is_some() {
			return_error!(catalog::class_already_exists(name));
		}
		let id = self.state.catalog.next_class_id();
		self.db.lock(id, self.id);
		Ok(ClassTemplate::create(id, name))
	}

	fn commit_template(&mut self, template: ClassTemplate) -> Result<ClassId> {
		self.ensure_active()?;
		if let Some(existing) = self.state.catalog.find_class_by_name(template.name()) {
			if existing.id != template.id() {
				return_error!(catalog::class_already_exists(template.name()));
			}
		}

		let class = template.finish();
		let id = class.id;
		debug!(transaction = %self.id, class = %class.name, version = class.version, "commit template");
		self.state.catalog.set_class(id, Some(class));
		self.state.rows_mut(id);
		self.db.cache().invalidate_class(id);
		Ok(id)
	}

	fn abort_template(&mut self, template: ClassTemplate) {
		trace!(transaction = %self.id, class = %template.name(), "abort template");
		template.abort();
	}

	fn drop_class(&mut self, class: ClassId) -> Result<()> {
		let def = self.fetch_class_for_write(class)?;
		debug!(transaction = %self.id, class = %def.name, "drop class");
		self.state.catalog.set_class(class, None);
		self.state.touch_class(class);
		self.state.rows.remove(&class);
		self.state.statistics.remove(&class);
		self.db.cache().invalidate_class(class);
		Ok(())
	}

	fn referencing_foreign_keys(&self, class: ClassId) -> Result<Vec<(ClassId, ConstraintDef)>> {
		self.ensure_active()?;
		Ok(self.state.catalog.referencing_foreign_keys(class))
	}

	fn update_statistics(&mut self, class: ClassId) -> Result<()> {
		self.ensure_active()?;
		self.state.class(class)?;
		let count = self.state.rows.get(&class).map(|rows| rows.len() as u64).unwrap_or(0);
		self.state.statistics.insert(class, count);
		self.state.touch_class(class);
		Ok(())
	}

	fn savepoint(&mut self, name: &str) -> Result<()> {
		self.ensure_active()?;
		trace!(transaction = %self.id, savepoint = name, "savepoint");
		self.savepoints.push((name.to_string(), self.state.fork()));
		Ok(())
	}

	fn abort_to_savepoint(&mut self, name: &str) -> Result<()> {
		self.ensure_active()?;
		let Some(position) = self.savepoints.iter().rposition(|(n, _)| n == name) else {
			return_error!(transaction::unknown_savepoint(name));
		};
		self.savepoints.truncate(position + 1);
		self.state = self.savepoints[position].1.fork();
		debug!(transaction = %self.id, savepoint = name, "rolled back to savepoint");
		Ok(())
	}

	fn release_savepoint(&mut self, name: &str) -> Result<()> {
		self.ensure_active()?;
		let Some(position) = self.savepoints.iter().rposition(|(n, _)| n == name) else {
			return_error!(transaction::unknown_savepoint(name));
		};
		self.savepoints.truncate(position);
		trace!(transaction = %self.id, savepoint = name, "released savepoint");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use altera_catalog::{AttributeDef, AttributePosition, Privileges};
	use altera_type::Domain;

	use super::*;
	use crate::service::{SerialService, SerialSpec};

	fn create_table(txn: &mut MemoryTransaction, name: &str) -> ClassId {
		let mut template = txn.create_template(name).unwrap();
		template.add_attribute(AttributeDef::new("id", Domain::integer()), AttributePosition::Last).unwrap();
		template.add_attribute(AttributeDef::new("name", Domain::varchar(10)), AttributePosition::Last).unwrap();
		txn.commit_template(template).unwrap()
	}

	#[test]
	fn test_commit_publishes() {
		let db = MemoryDatabase::new();
		let mut txn = db.begin("dba");
		create_table(&mut txn, "t");
		txn.insert("t", &[("id", Value::Integer(1))]).unwrap();
		assert!(db.class("t").is_none());

		txn.commit().unwrap();
		let rows = db.select("t").unwrap();
		assert_eq!(rows.len(), 1);
		assert_eq!(rows[0]["id"], Value::Integer(1));
		assert_eq!(rows[0]["name"], Value::Null);
	}

	#[test]
	fn test_rollback_discards() {
		let db = MemoryDatabase::new();
		let mut txn = db.begin("dba");
		create_table(&mut txn, "t");
		txn.rollback();
		assert!(db.class("t").is_none());
	}

	#[test]
	fn test_abort_to_savepoint() {
		let db = MemoryDatabase::new();
		let mut txn = db.begin("dba");
		create_table(&mut txn, "t");
		txn.savepoint("sp").unwrap();
		txn.insert("t", &[("id", Value::Integer(1))]).unwrap();
		create_table(&mut txn, "u");

		txn.abort_to_savepoint("sp").unwrap();
		assert!(txn.select("t").unwrap().is_empty());
		assert!(txn.find_class("u").unwrap().is_none());

		let err = txn.abort_to_savepoint("missing").unwrap_err();
		assert_eq!(err.code(), "TXN_003");
	}

	fn add_column(txn: &mut MemoryTransaction, class: ClassId, name: &str) {
		let mut template = txn.open_template(class).unwrap();
		template.add_attribute(AttributeDef::new(name, Domain::integer()), AttributePosition::Last).unwrap();
		txn.commit_template(template).unwrap();
	}

	#[test]
	fn test_interleaved_commits_keep_both_changes() {
		let db = MemoryDatabase::new();
		let mut setup = db.begin("dba");
		let t = create_table(&mut setup, "t");
		let u = create_table(&mut setup, "u");
		setup.insert("t", &[("id", Value::Integer(1))]).unwrap();
		setup.commit().unwrap();

		let mut ta = db.begin("dba");
		let mut tb = db.begin("dba");
		add_column(&mut tb, u, "b");
		tb.commit().unwrap();
		add_column(&mut ta, t, "c");
		ta.commit().unwrap();

		assert!(db.class("u").unwrap().find_attribute("b").is_some());
		assert!(db.class("t").unwrap().find_attribute("c").is_some());
		assert_eq!(db.select("t").unwrap().len(), 1);
	}

	#[test]
	fn test_conflicting_commit_is_rejected() {
		let db = MemoryDatabase::new();
		let mut setup = db.begin("dba");
		let t = create_table(&mut setup, "t");
		setup.commit().unwrap();

		let mut ta = db.begin("dba");
		let mut tb = db.begin("dba");
		add_column(&mut tb, t, "b");
		tb.commit().unwrap();
		add_column(&mut ta, t, "c");

		let err = ta.commit().unwrap_err();
		assert_eq!(err.code(), "TXN_005");
		assert!(err.is_transaction_aborted());

		let class = db.class("t").unwrap();
		assert!(class.find_attribute("b").is_some());
		assert!(class.find_attribute("c").is_none());

		let mut retry = db.begin("dba");
		add_column(&mut retry, t, "c");
		retry.commit().unwrap();
		assert!(db.class("t").unwrap().find_attribute("c").is_some());
	}

	#[test]
	fn test_concurrent_creates_draw_distinct_ids() {
		let db = MemoryDatabase::new();
		let mut ta = db.begin("dba");
		let mut tb = db.begin("dba");
		let t = create_table(&mut ta, "t");
		let u = create_table(&mut tb, "u");
		assert_ne!(t, u);

		tb.commit().unwrap();
		ta.commit().unwrap();
		assert_eq!(db.class("t").unwrap().id, t);
		assert_eq!(db.class("u").unwrap().id, u);
	}

	#[test]
	fn test_concurrent_creates_of_same_name_conflict() {
		let db = MemoryDatabase::new();
		let mut ta = db.begin("dba");
		let mut tb = db.begin("dba");
		create_table(&mut ta, "t");
		let winner = create_table(&mut tb, "t");

		tb.commit().unwrap();
		assert_eq!(ta.commit().unwrap_err().code(), "TXN_005");
		assert_eq!(db.class("t").unwrap().id, winner);
	}

	#[test]
	fn test_lock_conflict_aborts_requester() {
		let db = MemoryDatabase::new();
		let mut setup = db.begin("dba");
		let id = create_table(&mut setup, "t");
		setup.commit().unwrap();

		let mut first = db.begin("dba");
		let mut second = db.begin("dba");
		first.fetch_class_for_write(id).unwrap();

		let err = second.fetch_class_for_write(id).unwrap_err();
		assert_eq!(err.code(), "TXN_002");
		assert!(err.is_transaction_aborted());
		assert!(second.is_aborted());
		assert_eq!(second.get_class(id).unwrap_err().code(), "TXN_001");
		assert!(second.commit().is_err());

		first.commit().unwrap();
		let mut third = db.begin("dba");
		assert!(third.fetch_class_for_write(id).is_ok());
	}

	#[test]
	fn test_insert_coerces_and_checks_attributes() {
		let db = MemoryDatabase::new();
		let mut txn = db.begin("dba");
		create_table(&mut txn, "t");

		txn.insert("t", &[("id", Value::String("42".to_string()))]).unwrap();
		assert_eq!(txn.select("t").unwrap()[0]["id"], Value::Integer(42));

		let err = txn.insert("t", &[("missing", Value::Integer(1))]).unwrap_err();
		assert_eq!(err.code(), "CA_002");

		let err = txn.insert("t", &[("name", Value::String("far too long value".to_string()))]).unwrap_err();
		assert_eq!(err.code(), "COERCE_004");
	}

	#[test]
	fn test_insert_draws_auto_increment() {
		let db = MemoryDatabase::new();
		let mut txn = db.begin("dba");
		let id = create_table(&mut txn, "t");
		let serial = txn
			.create_serial(SerialSpec {
				name: "t_ai_id".to_string(),
				start: 5,
				increment: 1,
				owner_class: Some(id),
				owner_attribute: Some("id".to_string()),
			})
			.unwrap();
		let mut template = txn.open_template(id).unwrap();
		let attr = template.class().find_attribute("id").unwrap().id;
		template.attribute_mut(attr).unwrap().auto_increment = Some(serial.id);
		txn.commit_template(template).unwrap();

		txn.insert("t", &[("name", Value::String("a".to_string()))]).unwrap();
		txn.insert("t", &[("name", Value::String("b".to_string()))]).unwrap();
		let ids: Vec<Value> = txn.select("t").unwrap().into_iter().map(|r| r["id"].clone()).collect();
		assert_eq!(ids, vec![Value::Integer(5), Value::Integer(6)]);
	}

	#[test]
	fn test_commit_invalidates_auth_cache() {
		let db = MemoryDatabase::new();
		let mut txn = db.begin("dba");
		let id = create_table(&mut txn, "t");
		txn.commit().unwrap();

		db.grant("alice", "t", Privileges::SELECT).unwrap();
		assert_eq!(db.privileges("alice", "t").unwrap(), Privileges::SELECT);
		assert!(db.cache().lookup("alice", id).is_some());

		db.begin("dba").commit().unwrap();
		assert!(db.cache().lookup("alice", id).is_none());
		assert_eq!(db.privileges("dba", "t").unwrap(), Privileges::ALL);
	}
}
