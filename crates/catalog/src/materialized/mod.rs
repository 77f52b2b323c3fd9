// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::{
	Arc,
	atomic::{AtomicU64, Ordering},
};

use crossbeam_skiplist::SkipMap;

use crate::{
	class::ClassDef,
	id::{ClassId, SerialId},
	serial::SerialDef,
};

mod class;
mod serial;

/// In-memory view of all class and serial definitions.
#[derive(Debug)]
pub struct MaterializedCatalog {
	pub(crate) classes: SkipMap<ClassId, ClassDef>,
	pub(crate) classes_by_name: SkipMap<String, ClassId>,
	pub(crate) serials: SkipMap<SerialId, SerialDef>,
	pub(crate) serials_by_name: SkipMap<String, SerialId>,
	/// Id counters are shared by every fork, so ids drawn in concurrent
	/// transactions never collide.
	next_class: Arc<AtomicU64>,
	next_serial: Arc<AtomicU64>,
}

impl Default for MaterializedCatalog {
	fn default() -> Self {
		Self::new()
	}
}

impl MaterializedCatalog {
	pub fn new() -> Self {
		Self {
			classes: SkipMap::new(),
			classes_by_name: SkipMap::new(),
			serials: SkipMap::new(),
			serials_by_name: SkipMap::new(),
			next_class: Arc::new(AtomicU64::new(1)),
			next_serial: Arc::new(AtomicU64::new(1)),
		}
	}

	pub fn next_class_id(&self) -> ClassId {
		ClassId(self.next_class.fetch_add(1, Ordering::Relaxed))
	}

	pub fn next_serial_id(&self) -> SerialId {
		SerialId(self.next_serial.fetch_add(1, Ordering::Relaxed))
	}

	/// Deep copy, used for transaction working sets and savepoints.
	pub fn fork(&self) -> Self {
		let fork = Self {
			next_class: self.next_class.clone(),
			next_serial: self.next_serial.clone(),
			..Self::new()
		};
		for entry in self.classes.iter() {
			fork.set_class(*entry.key(), Some(entry.value().clone()));
		}
		for entry in self.serials.iter() {
			fork.set_serial(*entry.key(), Some(entry.value().clone()));
		}
		fork
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_fork_is_independent() {
		let catalog = MaterializedCatalog::new();
		let id = catalog.next_class_id();
		catalog.set_class(id, Some(ClassDef::new(id, "t")));

		let fork = catalog.fork();
		fork.set_class(id, None);

		assert!(catalog.find_class(id).is_some());
		assert!(fork.find_class(id).is_none());
		let from_fork = fork.next_class_id();
		assert_ne!(from_fork, catalog.next_class_id());
		assert!(from_fork > id);
	}
}
