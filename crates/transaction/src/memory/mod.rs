// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Single-process storage backend. Committed state lives behind one lock;
//! every transaction works on its own copy. On commit only the classes and
//! serials the transaction wrote are merged back, after checking nobody
//! committed them in between.

use std::{
	collections::{BTreeMap, HashMap, HashSet},
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
};

use altera_catalog::{
	AuthCache, ClassDef, ClassId, MaterializedCatalog, Privileges, SerialId,
	name::{name_key, names_equal},
};
use altera_type::{
	Result, Value,
	error::diagnostic::{catalog, transaction as txn_diag},
	return_error,
};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::TransactionId;

mod query;
mod serial;
mod transaction;

pub use transaction::MemoryTransaction;

/// One stored instance, keyed by attribute id.
pub type Row = BTreeMap<altera_catalog::AttributeId, Value>;

pub(crate) const DBA: &str = "dba";

/// Classes and serials a transaction changed, whether schema, rows or
/// statistics.
#[derive(Debug, Clone, Default)]
pub(crate) struct WriteSet {
	pub(crate) classes: HashSet<ClassId>,
	pub(crate) serials: HashSet<SerialId>,
}

#[derive(Debug)]
pub(crate) struct State {
	pub(crate) catalog: MaterializedCatalog,
	pub(crate) rows: HashMap<ClassId, Vec<Row>>,
	pub(crate) statistics: HashMap<ClassId, u64>,
	/// Commit count per class and serial, as of the snapshot.
	class_versions: HashMap<ClassId, u64>,
	serial_versions: HashMap<SerialId, u64>,
	pub(crate) written: WriteSet,
}

impl State {
	fn new() -> Self {
		Self {
			catalog: MaterializedCatalog::new(),
			rows: HashMap::new(),
			statistics: HashMap::new(),
			class_versions: HashMap::new(),
			serial_versions: HashMap::new(),
			written: WriteSet::default(),
		}
	}

	pub(crate) fn fork(&self) -> Self {
		Self {
			catalog: self.catalog.fork(),
			rows: self.rows.clone(),
			statistics: self.statistics.clone(),
			class_versions: self.class_versions.clone(),
			serial_versions: self.serial_versions.clone(),
			written: self.written.clone(),
		}
	}

	/// Rows of the class, marking it written.
	pub(crate) fn rows_mut(&mut self, class: ClassId) -> &mut Vec<Row> {
		self.written.classes.insert(class);
		self.rows.entry(class).or_default()
	}

	pub(crate) fn touch_class(&mut self, class: ClassId) {
		self.written.classes.insert(class);
	}

	pub(crate) fn touch_serial(&mut self, serial: SerialId) {
		self.written.serials.insert(serial);
	}

	/// Fails when a class or serial in `other`'s write set was committed
	/// after `other` took its snapshot, or when a name `other` claims now
	/// belongs to a different committed class or serial.
	fn check_conflicts(&self, other: &State) -> Result<()> {
		for id in &other.written.classes {
			if self.class_versions.get(id) != other.class_versions.get(id) {
				let name = other.catalog.find_class(*id).or_else(|| self.catalog.find_class(*id));
				let name = name.map(|c| c.name).unwrap_or_else(|| id.to_string());
				return_error!(txn_diag::write_conflict(&name));
			}
			if let Some(class) = other.catalog.find_class(*id) {
				if let Some(existing) = self.catalog.find_class_by_name(&class.name) {
					if existing.id != *id && !other.written.classes.contains(&existing.id) {
						return_error!(txn_diag::write_conflict(&class.name));
					}
				}
			}
		}

		for id in &other.written.serials {
			if self.serial_versions.get(id) != other.serial_versions.get(id) {
				return_error!(txn_diag::write_conflict(&id.to_string()));
			}
			if let Some(serial) = other.catalog.find_serial(*id) {
				if let Some(existing) = self.catalog.find_serial_by_name(&serial.name) {
					if existing.id != *id && !other.written.serials.contains(&existing.id) {
						return_error!(txn_diag::write_conflict(&serial.name));
					}
				}
			}
		}
		Ok(())
	}

	/// Copies everything in `other`'s write set over this state.
	fn merge(&mut self, mut other: State) {
		// Clear first so a name that moved between two written classes is
		// not dropped from the name index.
		for id in &other.written.classes {
			self.catalog.set_class(*id, None);
		}
		for id in &other.written.serials {
			self.catalog.set_serial(*id, None);
		}

		for id in other.written.classes.drain() {
			self.catalog.set_class(id, other.catalog.find_class(id));
			match other.rows.remove(&id) {
				Some(rows) => self.rows.insert(id, rows),
				None => self.rows.remove(&id),
			};
			match other.statistics.remove(&id) {
				Some(count) => self.statistics.insert(id, count),
				None => self.statistics.remove(&id),
			};
			*self.class_versions.entry(id).or_default() += 1;
		}
		for id in other.written.serials.drain() {
			self.catalog.set_serial(id, other.catalog.find_serial(id));
			*self.serial_versions.entry(id).or_default() += 1;
		}
	}

	pub(crate) fn class_by_name(&self, name: &str) -> Result<ClassDef> {
		match self.catalog.find_class_by_name(name) {
			Some(class) => Ok(class),
			None => return_error!(catalog::class_not_found(name)),
		}
	}

	pub(crate) fn class(&self, id: ClassId) -> Result<ClassDef> {
		match self.catalog.find_class(id) {
			Some(class) => Ok(class),
			None => return_error!(catalog::class_id_not_found(id.0)),
		}
	}

	/// Rows of the class and, for a partitioned class, of its partitions.
	pub(crate) fn scan(&self, class: &ClassDef) -> Vec<Row> {
		let mut result = self.rows.get(&class.id).cloned().unwrap_or_default();
		if let Some(partition) = &class.partition {
			for id in partition.classes() {
				if let Some(rows) = self.rows.get(&id) {
					result.extend(rows.iter().cloned());
				}
			}
		}
		result
	}

	pub(crate) fn named(&self, class: &ClassDef, rows: Vec<Row>) -> Vec<IndexMap<String, Value>> {
		rows.into_iter()
			.map(|row| {
				class.instance_attributes()
					.map(|attr| (attr.name.clone(), row.get(&attr.id).cloned().unwrap_or(Value::Null)))
					.collect()
			})
			.collect()
	}
}

#[derive(Debug)]
struct Inner {
	committed: RwLock<State>,
	locks: Mutex<HashMap<ClassId, TransactionId>>,
	grants: RwLock<HashMap<(String, ClassId), Privileges>>,
	cache: Arc<AuthCache>,
	next_transaction: AtomicU64,
}

#[derive(Debug, Clone)]
pub struct MemoryDatabase(Arc<Inner>);

impl Default for MemoryDatabase {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryDatabase {
	pub fn new() -> Self {
		Self(Arc::new(Inner {
			committed: RwLock::new(State::new()),
			locks: Mutex::new(HashMap::new()),
			grants: RwLock::new(HashMap::new()),
			cache: Arc::new(AuthCache::new()),
			next_transaction: AtomicU64::new(1),
		}))
	}

	pub fn begin(&self, user: impl Into<String>) -> MemoryTransaction {
		let id = TransactionId(self.0.next_transaction.fetch_add(1, Ordering::Relaxed));
		let user = user.into();
		debug!(transaction = %id, user = %user, "begin");
		MemoryTransaction::new(id, user, self.clone(), self.0.committed.read().fork())
	}

	pub fn cache(&self) -> Arc<AuthCache> {
		self.0.cache.clone()
	}

	/// Committed definition of the class.
	pub fn class(&self, name: &str) -> Option<ClassDef> {
		self.0.committed.read().catalog.find_class_by_name(name)
	}

	/// Committed rows of the class and its partitions, keyed by attribute
	/// name.
	pub fn select(&self, name: &str) -> Result<Vec<IndexMap<String, Value>>> {
		let state = self.0.committed.read();
		let class = state.class_by_name(name)?;
		let rows = state.scan(&class);
		Ok(state.named(&class, rows))
	}

	pub fn grant(&self, user: &str, class: &str, privileges: Privileges) -> Result<()> {
		let class = self.0.committed.read().class_by_name(class)?;
		self.0.grants.write().insert((name_key(user), class.id), privileges);
		self.0.cache.invalidate_user(user);
		Ok(())
	}

	/// Privileges of `user` on the class, served from the shared cache.
	pub fn privileges(&self, user: &str, class: &str) -> Result<Privileges> {
		let class = self.0.committed.read().class_by_name(class)?;
		self.0.cache.get_or_compute(user, class.id, || {
			if names_equal(user, DBA) {
				return Ok(Privileges::ALL);
			}
			Ok(self.0.grants.read().get(&(name_key(user), class.id)).copied().unwrap_or(Privileges::NONE))
		})
	}

	/// Merges the transaction's writes into the committed state, or fails
	/// without publishing anything when another commit got there first.
	pub(crate) fn publish(&self, state: State) -> Result<()> {
		let mut committed = self.0.committed.write();
		committed.check_conflicts(&state)?;
		debug!(
			classes = state.written.classes.len(),
			serials = state.written.serials.len(),
			"publish write set"
		);
		committed.merge(state);
		Ok(())
	}

	pub(crate) fn snapshot(&self) -> State {
		self.0.committed.read().fork()
	}

	/// Takes the write lock on the class. Returns false when another
	/// transaction holds it.
	pub(crate) fn lock(&self, class: ClassId, owner: TransactionId) -> bool {
		let mut locks = self.0.locks.lock();
		match locks.get(&class) {
			Some(holder) if *holder != owner => false,
			_ => {
				locks.insert(class, owner);
				true
			}
		}
	}

	pub(crate) fn release(&self, owner: TransactionId) {
		self.0.locks.lock().retain(|_, holder| *holder != owner);
	}

	pub(crate) fn invalidate_cache(&self) {
		self.0.cache.invalidate_all();
	}
}
