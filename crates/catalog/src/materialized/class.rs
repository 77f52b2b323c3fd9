// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{
	class::ClassDef,
	constraint::{ConstraintDef, ConstraintKind},
	id::ClassId,
	materialized::MaterializedCatalog,
	name::name_key,
};

impl MaterializedCatalog {
	pub fn find_class(&self, class: ClassId) -> Option<ClassDef> {
		self.classes.get(&class).map(|entry| entry.value().clone())
	}

	pub fn find_class_by_name(&self, name: &str) -> Option<ClassDef> {
		self.classes_by_name.get(&name_key(name)).and_then(|entry| self.find_class(*entry.value()))
	}

	pub fn set_class(&self, id: ClassId, class: Option<ClassDef>) {
		if let Some(entry) = self.classes.get(&id) {
			self.classes_by_name.remove(&name_key(&entry.value().name));
		}

		match class {
			Some(class) => {
				self.classes_by_name.insert(name_key(&class.name), id);
				self.classes.insert(id, class);
			}
			None => {
				self.classes.remove(&id);
			}
		}
	}

	pub fn list_classes(&self) -> Vec<ClassDef> {
		self.classes.iter().map(|entry| entry.value().clone()).collect()
	}

	/// Foreign keys of any class that reference `class`.
	pub fn referencing_foreign_keys(&self, class: ClassId) -> Vec<(ClassId, ConstraintDef)> {
		self.classes
			.iter()
			.flat_map(|entry| {
				let owner = *entry.key();
				entry.value()
					.constraints
					.iter()
					.filter(|c| c.kind == ConstraintKind::ForeignKey)
					.filter(|c| c.foreign_key.as_ref().is_some_and(|fk| fk.class == class))
					.map(|c| (owner, c.clone()))
					.collect::<Vec<_>>()
			})
			.collect()
	}
}
