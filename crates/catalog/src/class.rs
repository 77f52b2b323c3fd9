// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};

use crate::{
	attribute::{AttributeDef, AttributeNamespace},
	constraint::{ConstraintDef, ConstraintKind},
	id::{AttributeId, ClassId},
	name::names_equal,
	partition::{PartitionInfo, PartitionOf},
};

/// Persisted definition of a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
	pub id: ClassId,
	pub name: String,
	/// Attributes in ordinal order within each namespace.
	pub attributes: Vec<AttributeDef>,
	pub constraints: Vec<ConstraintDef>,
	pub superclasses: Vec<ClassId>,
	/// Direct subclasses, partition sub-classes included.
	pub subclasses: Vec<ClassId>,
	pub partition: Option<PartitionInfo>,
	pub partition_of: Option<PartitionOf>,
	pub comment: Option<String>,
	pub version: u64,
	pub next_attribute_id: u32,
}

impl ClassDef {
	pub fn new(id: ClassId, name: impl Into<String>) -> Self {
		Self {
			id,
			name: name.into(),
			attributes: vec![],
			constraints: vec![],
			superclasses: vec![],
			subclasses: vec![],
			partition: None,
			partition_of: None,
			comment: None,
			version: 0,
			next_attribute_id: 1,
		}
	}

	pub fn attribute(&self, id: AttributeId) -> Option<&AttributeDef> {
		self.attributes.iter().find(|a| a.id == id)
	}

	pub fn attribute_name(&self, id: AttributeId) -> Option<&str> {
		self.attribute(id).map(|a| a.name.as_str())
	}

	/// Looks the attribute up in every namespace.
	pub fn find_attribute(&self, name: &str) -> Option<&AttributeDef> {
		self.attributes.iter().find(|a| names_equal(&a.name, name))
	}

	pub fn find_attribute_in(&self, name: &str, namespace: AttributeNamespace) -> Option<&AttributeDef> {
		self.attributes.iter().find(|a| a.namespace == namespace && names_equal(&a.name, name))
	}

	pub fn instance_attributes(&self) -> impl Iterator<Item = &AttributeDef> {
		self.attributes.iter().filter(|a| a.is_instance())
	}

	pub fn primary_key(&self) -> Option<&ConstraintDef> {
		self.constraints.iter().find(|c| c.kind == ConstraintKind::PrimaryKey)
	}

	pub fn find_constraint(&self, name: &str) -> Option<&ConstraintDef> {
		self.constraints.iter().find(|c| names_equal(&c.name, name))
	}

	pub fn constraints_on(&self, attribute: AttributeId) -> impl Iterator<Item = &ConstraintDef> {
		self.constraints.iter().filter(move |c| c.covers(attribute))
	}

	pub fn is_partitioned(&self) -> bool {
		self.partition.is_some()
	}

	pub fn is_partition_key(&self, attribute: &str) -> bool {
		self.partition.as_ref().is_some_and(|p| p.is_key(attribute))
	}

	/// Subclasses other than the class's own partitions.
	pub fn has_subclasses(&self) -> bool {
		self.subclasses.iter().any(|sub| match &self.partition {
			Some(info) => info.by_class(*sub).is_none(),
			None => true,
		})
	}

	/// Attribute names of a constraint's keys, in key order.
	pub fn key_names(&self, constraint: &ConstraintDef) -> Vec<String> {
		constraint.attributes().filter_map(|id| self.attribute_name(id).map(str::to_string)).collect()
	}
}
