// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::id::{AttributeId, ClassId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
	Unique,
	ReverseUnique,
	PrimaryKey,
	ForeignKey,
	Index,
	ReverseIndex,
}

impl ConstraintKind {
	pub fn is_unique(&self) -> bool {
		matches!(self, ConstraintKind::Unique | ConstraintKind::ReverseUnique | ConstraintKind::PrimaryKey)
	}

	pub fn is_plain_index(&self) -> bool {
		matches!(self, ConstraintKind::Index | ConstraintKind::ReverseIndex)
	}

	/// Prefix used when a constraint is created without a name.
	pub fn name_prefix(&self) -> &'static str {
		match self {
			ConstraintKind::Unique => "u",
			ConstraintKind::ReverseUnique => "ru",
			ConstraintKind::PrimaryKey => "pk",
			ConstraintKind::ForeignKey => "fk",
			ConstraintKind::Index => "i",
			ConstraintKind::ReverseIndex => "ri",
		}
	}
}

impl Display for ConstraintKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			ConstraintKind::Unique => "UNIQUE",
			ConstraintKind::ReverseUnique => "REVERSE UNIQUE",
			ConstraintKind::PrimaryKey => "PRIMARY KEY",
			ConstraintKind::ForeignKey => "FOREIGN KEY",
			ConstraintKind::Index => "INDEX",
			ConstraintKind::ReverseIndex => "REVERSE INDEX",
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexKey {
	pub attribute: AttributeId,
	pub descending: bool,
	pub prefix_length: Option<u32>,
}

impl IndexKey {
	pub fn new(attribute: AttributeId) -> Self {
		Self {
			attribute,
			descending: false,
			prefix_length: None,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForeignKeyAction {
	Cascade,
	Restrict,
	NoAction,
	SetNull,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
	pub class: ClassId,
	pub attributes: Vec<AttributeId>,
	/// Name of the referenced primary key.
	pub constraint: String,
	pub on_delete: ForeignKeyAction,
	pub on_update: ForeignKeyAction,
}

/// Expression kept both as source text and in compiled form. The compiled
/// form addresses attributes by name, so it goes stale on rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredExpression {
	pub text: String,
	pub compiled: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintDef {
	pub name: String,
	pub kind: ConstraintKind,
	pub keys: Vec<IndexKey>,
	pub filter: Option<StoredExpression>,
	pub function: Option<StoredExpression>,
	pub foreign_key: Option<ForeignKeyRef>,
	pub comment: Option<String>,
	/// Copied from the partition root rather than declared on this class.
	pub inherited: bool,
}

impl ConstraintDef {
	pub fn new(name: impl Into<String>, kind: ConstraintKind, keys: Vec<IndexKey>) -> Self {
		Self {
			name: name.into(),
			kind,
			keys,
			filter: None,
			function: None,
			foreign_key: None,
			comment: None,
			inherited: false,
		}
	}

	pub fn covers(&self, attribute: AttributeId) -> bool {
		self.keys.iter().any(|k| k.attribute == attribute)
	}

	pub fn is_single_column(&self) -> bool {
		self.keys.len() == 1
	}

	pub fn has_prefix_on(&self, attribute: AttributeId) -> bool {
		self.keys.iter().any(|k| k.attribute == attribute && k.prefix_length.is_some())
	}

	pub fn has_expression(&self) -> bool {
		self.filter.is_some() || self.function.is_some()
	}

	pub fn attributes(&self) -> impl Iterator<Item = AttributeId> + '_ {
		self.keys.iter().map(|k| k.attribute)
	}
}
