// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use altera_type::{
	Result,
	error::diagnostic::{catalog, constraint},
	return_error,
};
use tracing::trace;

use crate::{
	attribute::AttributeDef,
	class::ClassDef,
	constraint::{ConstraintDef, ConstraintKind},
	id::{AttributeId, ClassId},
	name::names_equal,
	partition::{PartitionInfo, PartitionOf},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributePosition {
	First,
	After(AttributeId),
	Last,
}

/// Exclusive working copy of a class definition. Nothing done to a template
/// is visible until the storage layer commits it; `finish` and `abort`
/// consume the template so it cannot be touched afterwards.
#[derive(Debug)]
pub struct ClassTemplate {
	base: Option<ClassDef>,
	current: ClassDef,
}

impl ClassTemplate {
	pub fn edit(class: ClassDef) -> Self {
		Self {
			base: Some(class.clone()),
			current: class,
		}
	}

	pub fn create(id: ClassId, name: impl Into<String>) -> Self {
		Self {
			base: None,
			current: ClassDef::new(id, name),
		}
	}

	pub fn id(&self) -> ClassId {
		self.current.id
	}

	pub fn name(&self) -> &str {
		&self.current.name
	}

	pub fn class(&self) -> &ClassDef {
		&self.current
	}

	/// Definition the template was opened on; `None` for a new class.
	pub fn base(&self) -> Option<&ClassDef> {
		self.base.as_ref()
	}

	pub fn is_new(&self) -> bool {
		self.base.is_none()
	}

	pub fn rename(&mut self, name: impl Into<String>) {
		self.current.name = name.into();
	}

	pub fn set_comment(&mut self, comment: Option<String>) {
		self.current.comment = comment;
	}

	pub fn add_attribute(&mut self, mut attribute: AttributeDef, position: AttributePosition) -> Result<AttributeId> {
		if self.current.find_attribute(&attribute.name).is_some() {
			return_error!(catalog::attribute_already_exists(&self.current.name, &attribute.name));
		}

		attribute.id = AttributeId(self.current.next_attribute_id);
		self.current.next_attribute_id += 1;
		let id = attribute.id;
		self.current.attributes.push(attribute);
		self.move_attribute(id, position)?;
		trace!(class = %self.current.name, attribute = %id, "attribute added to template");
		Ok(id)
	}

	/// Replaces the attribute list wholesale, keeping the given ids.
	pub fn set_attributes(&mut self, attributes: Vec<AttributeDef>) {
		let next = attributes.iter().map(|a| a.id.0 + 1).max().unwrap_or(1);
		self.current.next_attribute_id = self.current.next_attribute_id.max(next);
		self.current.attributes = attributes;
		self.renumber();
	}

	pub fn attribute(&self, id: AttributeId) -> Result<&AttributeDef> {
		match self.current.attribute(id) {
			Some(attribute) => Ok(attribute),
			None => return_error!(catalog::attribute_not_found(&self.current.name, &id.to_string())),
		}
	}

	pub fn attribute_mut(&mut self, id: AttributeId) -> Result<&mut AttributeDef> {
		let class = self.current.name.clone();
		match self.current.attributes.iter_mut().find(|a| a.id == id) {
			Some(attribute) => Ok(attribute),
			None => return_error!(catalog::attribute_not_found(&class, &id.to_string())),
		}
	}

	pub fn rename_attribute(&mut self, id: AttributeId, name: &str) -> Result<()> {
		if let Some(existing) = self.current.find_attribute(name) {
			if existing.id != id {
				return_error!(catalog::attribute_already_exists(&self.current.name, name));
			}
		}
		self.attribute_mut(id)?.name = name.to_string();
		Ok(())
	}

	pub fn drop_attribute(&mut self, id: AttributeId) -> Result<AttributeDef> {
		let Some(index) = self.current.attributes.iter().position(|a| a.id == id) else {
			return_error!(catalog::attribute_not_found(&self.current.name, &id.to_string()));
		};
		let dropped = self.current.attributes.remove(index);
		self.renumber();
		Ok(dropped)
	}

	pub fn move_attribute(&mut self, id: AttributeId, position: AttributePosition) -> Result<()> {
		let Some(from) = self.current.attributes.iter().position(|a| a.id == id) else {
			return_error!(catalog::attribute_not_found(&self.current.name, &id.to_string()));
		};
		let attribute = self.current.attributes.remove(from);

		let to = match position {
			AttributePosition::First => 0,
			AttributePosition::Last => self.current.attributes.len(),
			AttributePosition::After(anchor) => {
				match self.current.attributes.iter().position(|a| a.id == anchor) {
					Some(index) => index + 1,
					None => {
						self.current.attributes.insert(from, attribute);
						return_error!(catalog::attribute_not_found(
							&self.current.name,
							&anchor.to_string()
						));
					}
				}
			}
		};
		self.current.attributes.insert(to, attribute);
		self.renumber();
		Ok(())
	}

	fn renumber(&mut self) {
		let mut counters = [0u32; 3];
		for attribute in &mut self.current.attributes {
			let slot = attribute.namespace as usize;
			attribute.order = counters[slot];
			counters[slot] += 1;
		}
	}

	pub fn add_constraint(&mut self, constraint: ConstraintDef) -> Result<()> {
		if constraint.keys.is_empty() {
			return_error!(constraint::empty_constraint(&constraint.name));
		}
		if self.current.find_constraint(&constraint.name).is_some() {
			return_error!(catalog::constraint_already_exists(&self.current.name, &constraint.name));
		}
		if constraint.kind == ConstraintKind::PrimaryKey && self.current.primary_key().is_some() {
			return_error!(constraint::multiple_primary_keys(&self.current.name));
		}
		for id in constraint.attributes() {
			self.attribute(id)?;
		}
		self.current.constraints.push(constraint);
		Ok(())
	}

	pub fn drop_constraint(&mut self, name: &str) -> Result<ConstraintDef> {
		let Some(index) = self.current.constraints.iter().position(|c| names_equal(&c.name, name)) else {
			return_error!(catalog::constraint_not_found(&self.current.name, name));
		};
		Ok(self.current.constraints.remove(index))
	}

	pub fn constraint_mut(&mut self, name: &str) -> Result<&mut ConstraintDef> {
		let class = self.current.name.clone();
		match self.current.constraints.iter_mut().find(|c| names_equal(&c.name, name)) {
			Some(constraint) => Ok(constraint),
			None => return_error!(catalog::constraint_not_found(&class, name)),
		}
	}

	pub fn set_partition(&mut self, partition: Option<PartitionInfo>) {
		self.current.partition = partition;
	}

	pub fn partition_mut(&mut self) -> Option<&mut PartitionInfo> {
		self.current.partition.as_mut()
	}

	pub fn set_partition_of(&mut self, partition_of: Option<PartitionOf>) {
		self.current.partition_of = partition_of;
	}

	pub fn add_superclass(&mut self, class: ClassId) {
		if !self.current.superclasses.contains(&class) {
			self.current.superclasses.push(class);
		}
	}

	pub fn remove_superclass(&mut self, class: ClassId) {
		self.current.superclasses.retain(|c| *c != class);
	}

	pub fn add_subclass(&mut self, class: ClassId) {
		if !self.current.subclasses.contains(&class) {
			self.current.subclasses.push(class);
		}
	}

	pub fn remove_subclass(&mut self, class: ClassId) {
		self.current.subclasses.retain(|c| *c != class);
	}

	/// Publishes the edited definition with a bumped version.
	pub fn finish(self) -> ClassDef {
		let mut class = self.current;
		class.version += 1;
		class
	}

	/// Discards all edits, returning the untouched definition if any.
	pub fn abort(self) -> Option<ClassDef> {
		self.base
	}
}
