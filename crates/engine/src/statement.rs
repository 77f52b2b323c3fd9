// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Validated ALTER statement as handed over by the parser.

use altera_catalog::{AttributeDef, AttributeNamespace, ConstraintKind, DefaultExpr, DefaultValue, ForeignKeyAction, SerialDef};
use altera_type::{Domain, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct AlterStatement {
	pub entity_name: String,
	pub clauses: Vec<AlterClause>,
	pub hints: AlterHints,
}

impl AlterStatement {
	pub fn new(entity_name: impl Into<String>, clauses: Vec<AlterClause>) -> Self {
		Self {
			entity_name: entity_name.into(),
			clauses,
			hints: AlterHints::default(),
		}
	}

	pub fn with_hints(mut self, hints: AlterHints) -> Self {
		self.hints = hints;
		self
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlterHints {
	/// Add NOT NULL without touching rows that are NULL today.
	pub skip_update_null: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterClause {
	AddAttributes(Vec<AttributeDefinition>),
	DropAttributes(Vec<AttributeRef>),
	/// CHANGE when `old_name` is given, MODIFY otherwise.
	Change {
		old_name: Option<String>,
		definition: AttributeDefinition,
		constraints: Vec<ConstraintDefinition>,
	},
	RenameAttribute {
		namespace: AttributeNamespace,
		from: String,
		to: String,
	},
	ModifyDefault(Vec<(AttributeRef, Option<DefaultValue>)>),
	AddConstraints(Vec<ConstraintDefinition>),
	DropConstraint {
		name: String,
	},
	RenameClass {
		to: String,
	},
	Partition(PartitionClause),
}

impl AlterClause {
	pub fn name(&self) -> &'static str {
		match self {
			AlterClause::AddAttributes(_) => "ADD ATTRIBUTE",
			AlterClause::DropAttributes(_) => "DROP ATTRIBUTE",
			AlterClause::Change {
				old_name: Some(_),
				..
			} => "CHANGE",
			AlterClause::Change {
				..
			} => "MODIFY",
			AlterClause::RenameAttribute {
				..
			} => "RENAME ATTRIBUTE",
			AlterClause::ModifyDefault(_) => "ALTER DEFAULT",
			AlterClause::AddConstraints(_) => "ADD CONSTRAINT",
			AlterClause::DropConstraint {
				..
			} => "DROP CONSTRAINT",
			AlterClause::RenameClass {
				..
			} => "RENAME",
			AlterClause::Partition(clause) => clause.name(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRef {
	pub name: String,
	pub namespace: AttributeNamespace,
}

impl AttributeRef {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			namespace: AttributeNamespace::Normal,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoIncrement {
	pub start: Option<i64>,
	pub increment: i64,
}

impl Default for AutoIncrement {
	fn default() -> Self {
		Self {
			start: None,
			increment: 1,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeOrder {
	First,
	After(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDefinition {
	pub name: String,
	pub namespace: AttributeNamespace,
	pub domain: Domain,
	pub default: Option<DefaultValue>,
	pub on_update: Option<DefaultExpr>,
	pub not_null: bool,
	pub auto_increment: Option<AutoIncrement>,
	pub order: Option<AttributeOrder>,
	pub check: Option<String>,
	pub comment: Option<String>,
}

impl AttributeDefinition {
	pub fn new(name: impl Into<String>, domain: Domain) -> Self {
		Self {
			name: name.into(),
			namespace: AttributeNamespace::Normal,
			domain,
			default: None,
			on_update: None,
			not_null: false,
			auto_increment: None,
			order: None,
			check: None,
			comment: None,
		}
	}

	/// Definition that restates `attribute` as it is stored today.
	pub fn from_attribute(attribute: &AttributeDef, serial: Option<&SerialDef>) -> Self {
		Self {
			name: attribute.name.clone(),
			namespace: attribute.namespace,
			domain: attribute.domain.clone(),
			default: attribute.default.clone(),
			on_update: attribute.on_update,
			not_null: attribute.not_null,
			auto_increment: serial.map(|serial| AutoIncrement {
				start: None,
				increment: serial.increment,
			}),
			order: None,
			check: None,
			comment: attribute.comment.clone(),
		}
	}

	pub fn not_null(mut self) -> Self {
		self.not_null = true;
		self
	}

	pub fn default_value(mut self, value: Value) -> Self {
		self.default = Some(DefaultValue::Literal(value));
		self
	}

	pub fn namespace(mut self, namespace: AttributeNamespace) -> Self {
		self.namespace = namespace;
		self
	}

	pub fn auto_increment(mut self, start: Option<i64>, increment: i64) -> Self {
		self.auto_increment = Some(AutoIncrement {
			start,
			increment,
		});
		self
	}

	pub fn order(mut self, order: AttributeOrder) -> Self {
		self.order = Some(order);
		self
	}

	pub fn comment(mut self, comment: impl Into<String>) -> Self {
		self.comment = Some(comment.into());
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexKeyDefinition {
	pub attribute: String,
	pub descending: bool,
	pub prefix_length: Option<u32>,
}

impl IndexKeyDefinition {
	pub fn new(attribute: impl Into<String>) -> Self {
		Self {
			attribute: attribute.into(),
			descending: false,
			prefix_length: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDefinition {
	pub class: String,
	/// Referenced attributes; the primary key when empty.
	pub attributes: Vec<String>,
	pub on_delete: ForeignKeyAction,
	pub on_update: ForeignKeyAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintDefinition {
	pub name: Option<String>,
	pub kind: ConstraintKind,
	pub keys: Vec<IndexKeyDefinition>,
	pub filter: Option<String>,
	pub function: Option<String>,
	pub foreign_key: Option<ForeignKeyDefinition>,
	pub comment: Option<String>,
}

impl ConstraintDefinition {
	pub fn new(kind: ConstraintKind, attributes: &[&str]) -> Self {
		Self {
			name: None,
			kind,
			keys: attributes.iter().map(|a| IndexKeyDefinition::new(*a)).collect(),
			filter: None,
			function: None,
			foreign_key: None,
			comment: None,
		}
	}

	pub fn named(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn filter(mut self, predicate: impl Into<String>) -> Self {
		self.filter = Some(predicate.into());
		self
	}

	pub fn references(mut self, class: impl Into<String>, attributes: &[&str]) -> Self {
		self.foreign_key = Some(ForeignKeyDefinition {
			class: class.into(),
			attributes: attributes.iter().map(|a| a.to_string()).collect(),
			on_delete: ForeignKeyAction::Restrict,
			on_update: ForeignKeyAction::Restrict,
		});
		self
	}

	pub fn covers(&self, attribute: &str) -> bool {
		self.keys.iter().any(|k| altera_catalog::name::names_equal(&k.attribute, attribute))
	}

	pub fn is_single_column(&self) -> bool {
		self.keys.len() == 1
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartitionBound {
	/// `VALUES LESS THAN`; `None` is MAXVALUE.
	LessThan(Option<Value>),
	In(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartitionDefinition {
	pub name: String,
	pub bound: PartitionBound,
	pub comment: Option<String>,
}

impl PartitionDefinition {
	pub fn less_than(name: impl Into<String>, bound: Option<Value>) -> Self {
		Self {
			name: name.into(),
			bound: PartitionBound::LessThan(bound),
			comment: None,
		}
	}

	pub fn values_in(name: impl Into<String>, values: Vec<Value>) -> Self {
		Self {
			name: name.into(),
			bound: PartitionBound::In(values),
			comment: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartitionScheme {
	Range(Vec<PartitionDefinition>),
	List(Vec<PartitionDefinition>),
	Hash(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartitionClause {
	Apply {
		key: String,
		scheme: PartitionScheme,
	},
	Add(Vec<PartitionDefinition>),
	AddHash(u32),
	/// Number of HASH partitions that remain.
	Coalesce(u32),
	Reorganize {
		names: Vec<String>,
		into: Vec<PartitionDefinition>,
	},
	Remove,
	Drop(Vec<String>),
	Promote(Vec<String>),
	/// Every partition when empty.
	Analyze(Vec<String>),
}

impl PartitionClause {
	pub fn name(&self) -> &'static str {
		match self {
			PartitionClause::Apply {
				..
			} => "PARTITION BY",
			PartitionClause::Add(_) => "ADD PARTITION",
			PartitionClause::AddHash(_) => "ADD PARTITION PARTITIONS",
			PartitionClause::Coalesce(_) => "COALESCE PARTITION",
			PartitionClause::Reorganize {
				..
			} => "REORGANIZE PARTITION",
			PartitionClause::Remove => "REMOVE PARTITIONING",
			PartitionClause::Drop(_) => "DROP PARTITION",
			PartitionClause::Promote(_) => "PROMOTE PARTITION",
			PartitionClause::Analyze(_) => "ANALYZE PARTITION",
		}
	}
}
