// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use altera_type::{Domain, Value};
use chrono::{Local, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{AttributeId, ClassId, SerialId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeNamespace {
	/// Per-instance column.
	Normal,
	/// One value shared by every instance.
	Shared,
	/// Static attribute of the class object itself.
	Class,
}

impl Display for AttributeNamespace {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			AttributeNamespace::Normal => f.write_str("INSTANCE ATTRIBUTE"),
			AttributeNamespace::Shared => f.write_str("SHARED ATTRIBUTE"),
			AttributeNamespace::Class => f.write_str("CLASS ATTRIBUTE"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefaultExpr {
	SysDate,
	SysTime,
	SysDatetime,
	SysTimestamp,
	CurrentUser,
	UnixTimestamp,
}

impl Display for DefaultExpr {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			DefaultExpr::SysDate => "SYS_DATE",
			DefaultExpr::SysTime => "SYS_TIME",
			DefaultExpr::SysDatetime => "SYS_DATETIME",
			DefaultExpr::SysTimestamp => "SYS_TIMESTAMP",
			DefaultExpr::CurrentUser => "CURRENT_USER",
			DefaultExpr::UnixTimestamp => "UNIX_TIMESTAMP()",
		})
	}
}

impl DefaultExpr {
	/// Value of the expression at the moment of the call.
	pub fn evaluate(&self, user: &str) -> Value {
		let now = Local::now().naive_local();
		match self {
			DefaultExpr::SysDate => Value::Date(now.date()),
			DefaultExpr::SysTime => Value::Time(now.time().trunc_subsecs(0)),
			DefaultExpr::SysDatetime => Value::DateTime(now.trunc_subsecs(3)),
			DefaultExpr::SysTimestamp => Value::Timestamp(now.trunc_subsecs(0)),
			DefaultExpr::CurrentUser => Value::String(user.to_string()),
			DefaultExpr::UnixTimestamp => Value::BigInt(Utc::now().timestamp()),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
	Literal(Value),
	Expr(DefaultExpr),
}

impl DefaultValue {
	pub fn evaluate(&self, user: &str) -> Value {
		match self {
			DefaultValue::Literal(value) => value.clone(),
			DefaultValue::Expr(expr) => expr.evaluate(user),
		}
	}
}

impl Display for DefaultValue {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			DefaultValue::Literal(value) => write!(f, "{}", value),
			DefaultValue::Expr(expr) => write!(f, "{}", expr),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDef {
	pub id: AttributeId,
	pub name: String,
	pub namespace: AttributeNamespace,
	pub domain: Domain,
	pub default: Option<DefaultValue>,
	pub on_update: Option<DefaultExpr>,
	pub not_null: bool,
	pub auto_increment: Option<SerialId>,
	/// Ordinal position among the attributes of the same namespace.
	pub order: u32,
	pub comment: Option<String>,
	/// Stored value of a SHARED or CLASS attribute.
	pub value: Option<Value>,
	/// Set on partition sub-classes for attributes owned by the root.
	pub inherited_from: Option<ClassId>,
}

impl AttributeDef {
	pub fn new(name: impl Into<String>, domain: Domain) -> Self {
		Self {
			id: AttributeId(0),
			name: name.into(),
			namespace: AttributeNamespace::Normal,
			domain,
			default: None,
			on_update: None,
			not_null: false,
			auto_increment: None,
			order: 0,
			comment: None,
			value: None,
			inherited_from: None,
		}
	}

	pub fn is_instance(&self) -> bool {
		self.namespace == AttributeNamespace::Normal
	}

	/// Literal default, if the default is not an expression.
	pub fn default_literal(&self) -> Option<&Value> {
		match &self.default {
			Some(DefaultValue::Literal(value)) => Some(value),
			_ => None,
		}
	}
}
