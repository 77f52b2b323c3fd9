// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::value::{
	collation::{Codeset, CollationId},
	r#type::Type,
};

/// Semantic type of an attribute. Compared structurally; two domains are
/// identical only when tag, precision, scale, collation and nested
/// information all agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain {
	pub ty: Type,
	pub precision: u32,
	pub scale: u16,
	pub collation: CollationId,
	/// Element domains of a collection. Empty means any element type.
	pub elements: Vec<Domain>,
	/// Labels of an enumeration, in declaration order.
	pub enumeration: Vec<String>,
	/// Referenced class of an object domain.
	pub class: Option<String>,
}

impl Domain {
	pub fn new(ty: Type) -> Self {
		let collation = match ty {
			Type::Bit | Type::VarBit | Type::Blob => CollationId::BINARY,
			_ => CollationId::default(),
		};
		Self {
			ty,
			precision: ty.default_precision(),
			scale: 0,
			collation,
			elements: vec![],
			enumeration: vec![],
			class: None,
		}
	}

	pub fn short() -> Self {
		Self::new(Type::Short)
	}

	pub fn integer() -> Self {
		Self::new(Type::Integer)
	}

	pub fn bigint() -> Self {
		Self::new(Type::BigInt)
	}

	pub fn float() -> Self {
		Self::new(Type::Float)
	}

	pub fn double() -> Self {
		Self::new(Type::Double)
	}

	pub fn monetary() -> Self {
		Self::new(Type::Monetary)
	}

	pub fn numeric(precision: u32, scale: u16) -> Self {
		Self {
			precision,
			scale,
			..Self::new(Type::Numeric)
		}
	}

	pub fn char(length: u32) -> Self {
		Self::sized(Type::Char, length)
	}

	pub fn varchar(length: u32) -> Self {
		Self::sized(Type::VarChar, length)
	}

	pub fn nchar(length: u32) -> Self {
		Self::sized(Type::NChar, length)
	}

	pub fn varnchar(length: u32) -> Self {
		Self::sized(Type::VarNChar, length)
	}

	pub fn bit(length: u32) -> Self {
		Self::sized(Type::Bit, length)
	}

	pub fn varbit(length: u32) -> Self {
		Self::sized(Type::VarBit, length)
	}

	pub fn date() -> Self {
		Self::new(Type::Date)
	}

	pub fn time() -> Self {
		Self::new(Type::Time)
	}

	pub fn timestamp() -> Self {
		Self::new(Type::Timestamp)
	}

	pub fn timestamptz() -> Self {
		Self::new(Type::TimestampTz)
	}

	pub fn datetime() -> Self {
		Self::new(Type::DateTime)
	}

	pub fn datetimetz() -> Self {
		Self::new(Type::DateTimeTz)
	}

	pub fn blob() -> Self {
		Self::new(Type::Blob)
	}

	pub fn clob() -> Self {
		Self::new(Type::Clob)
	}

	pub fn enumeration<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
		Self {
			enumeration: labels.into_iter().map(Into::into).collect(),
			..Self::new(Type::Enumeration)
		}
	}

	pub fn set(elements: Vec<Domain>) -> Self {
		Self {
			elements,
			..Self::new(Type::Set)
		}
	}

	pub fn multiset(elements: Vec<Domain>) -> Self {
		Self {
			elements,
			..Self::new(Type::Multiset)
		}
	}

	pub fn sequence(elements: Vec<Domain>) -> Self {
		Self {
			elements,
			..Self::new(Type::Sequence)
		}
	}

	pub fn object(class: impl Into<String>) -> Self {
		Self {
			class: Some(class.into()),
			..Self::new(Type::Object)
		}
	}

	fn sized(ty: Type, length: u32) -> Self {
		Self {
			precision: length,
			..Self::new(ty)
		}
	}

	pub fn with_collation(mut self, collation: CollationId) -> Self {
		self.collation = collation;
		self
	}

	pub fn codeset(&self) -> Codeset {
		self.collation.collation().codeset
	}

	/// Number of digits left of the decimal point a NUMERIC can hold.
	pub fn integer_digits(&self) -> u32 {
		self.precision.saturating_sub(self.scale as u32)
	}

	pub fn has_collation(&self) -> bool {
		self.ty.is_character() || self.ty == Type::Clob || self.ty == Type::Enumeration
	}
}

impl Display for Domain {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.ty {
			Type::Numeric => write!(f, "NUMERIC({},{})", self.precision, self.scale)?,
			Type::Char | Type::VarChar | Type::NChar | Type::VarNChar | Type::Bit | Type::VarBit => {
				write!(f, "{}({})", self.ty, self.precision)?
			}
			Type::Enumeration => {
				let labels: Vec<String> = self.enumeration.iter().map(|l| format!("'{}'", l)).collect();
				write!(f, "ENUM({})", labels.join(", "))?
			}
			Type::Set | Type::Multiset | Type::Sequence => {
				let elements: Vec<String> = self.elements.iter().map(ToString::to_string).collect();
				write!(f, "{} OF ({})", self.ty, elements.join(", "))?
			}
			Type::Object => write!(f, "{}", self.class.as_deref().unwrap_or("OBJECT"))?,
			ty => write!(f, "{}", ty)?,
		}

		if self.ty.is_character() && self.collation != CollationId::default() {
			write!(f, " COLLATE {}", self.collation)?;
		}
		Ok(())
	}
}
