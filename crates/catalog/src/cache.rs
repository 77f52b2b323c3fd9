// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use altera_type::Result;
use indexmap::IndexSet;
use parking_lot::RwLock;
use tracing::trace;

use crate::{id::ClassId, name::name_key};

/// Number of user slots added each time the cache runs out of them.
pub const AUTH_CACHE_INCREMENT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Privileges(pub u8);

impl Privileges {
	pub const NONE: Privileges = Privileges(0);
	pub const SELECT: Privileges = Privileges(1);
	pub const INSERT: Privileges = Privileges(1 << 1);
	pub const UPDATE: Privileges = Privileges(1 << 2);
	pub const DELETE: Privileges = Privileges(1 << 3);
	pub const ALTER: Privileges = Privileges(1 << 4);
	pub const INDEX: Privileges = Privileges(1 << 5);
	pub const EXECUTE: Privileges = Privileges(1 << 6);
	pub const ALL: Privileges = Privileges(0x7f);

	pub fn contains(&self, other: Privileges) -> bool {
		self.0 & other.0 == other.0
	}
}

#[derive(Debug, Default)]
struct Matrix {
	users: IndexSet<String>,
	classes: IndexSet<ClassId>,
	/// One row per class, one column per user slot.
	rows: Vec<Vec<Option<Privileges>>>,
	capacity: usize,
}

impl Matrix {
	fn user_slot(&mut self, user: &str) -> usize {
		let (slot, inserted) = self.users.insert_full(name_key(user));
		if inserted && slot >= self.capacity {
			self.capacity += AUTH_CACHE_INCREMENT;
			for row in &mut self.rows {
				row.resize(self.capacity, None);
			}
			trace!(capacity = self.capacity, "authorization cache grown");
		}
		slot
	}

	fn class_slot(&mut self, class: ClassId) -> usize {
		let (slot, inserted) = self.classes.insert_full(class);
		if inserted {
			self.rows.push(vec![None; self.capacity]);
		}
		slot
	}
}

/// Process-wide cache of privileges keyed by (user, class). Entries are
/// computed lazily; invalidation only clears cells, it never shrinks the
/// matrix.
#[derive(Debug, Default)]
pub struct AuthCache {
	matrix: RwLock<Matrix>,
}

impl AuthCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn user_slot(&self, user: &str) -> usize {
		if let Some(slot) = self.matrix.read().users.get_index_of(&name_key(user)) {
			return slot;
		}
		self.matrix.write().user_slot(user)
	}

	pub fn capacity(&self) -> usize {
		self.matrix.read().capacity
	}

	pub fn lookup(&self, user: &str, class: ClassId) -> Option<Privileges> {
		let matrix = self.matrix.read();
		let user = matrix.users.get_index_of(&name_key(user))?;
		let class = matrix.classes.get_index_of(&class)?;
		matrix.rows.get(class).and_then(|row| row.get(user).copied().flatten())
	}

	pub fn get_or_compute<F>(&self, user: &str, class: ClassId, compute: F) -> Result<Privileges>
	where
		F: FnOnce() -> Result<Privileges>,
	{
		if let Some(privileges) = self.lookup(user, class) {
			return Ok(privileges);
		}

		let privileges = compute()?;
		let mut matrix = self.matrix.write();
		let user = matrix.user_slot(user);
		let class = matrix.class_slot(class);
		matrix.rows[class][user] = Some(privileges);
		Ok(privileges)
	}

	pub fn invalidate_all(&self) {
		for row in &mut self.matrix.write().rows {
			row.fill(None);
		}
	}

	pub fn invalidate_user(&self, user: &str) {
		let mut matrix = self.matrix.write();
		if let Some(slot) = matrix.users.get_index_of(&name_key(user)) {
			for row in &mut matrix.rows {
				row[slot] = None;
			}
		}
	}

	pub fn invalidate_class(&self, class: ClassId) {
		let mut matrix = self.matrix.write();
		if let Some(slot) = matrix.classes.get_index_of(&class) {
			matrix.rows[slot].fill(None);
		}
	}
}
