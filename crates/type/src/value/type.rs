// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Type tag of a domain. Precision, scale and element information live on
/// [`Domain`](crate::Domain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Type {
	Short,
	Integer,
	BigInt,
	Float,
	Double,
	Monetary,
	Numeric,
	Char,
	VarChar,
	NChar,
	VarNChar,
	Bit,
	VarBit,
	Date,
	Time,
	Timestamp,
	TimestampTz,
	DateTime,
	DateTimeTz,
	Blob,
	Clob,
	Enumeration,
	Set,
	Multiset,
	Sequence,
	Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFamily {
	Numeric,
	Character,
	Bit,
	Temporal,
	Lob,
	Enumeration,
	Collection,
	Object,
}

impl Type {
	pub const ALL: [Type; 26] = [
		Type::Short,
		Type::Integer,
		Type::BigInt,
		Type::Float,
		Type::Double,
		Type::Monetary,
		Type::Numeric,
		Type::Char,
		Type::VarChar,
		Type::NChar,
		Type::VarNChar,
		Type::Bit,
		Type::VarBit,
		Type::Date,
		Type::Time,
		Type::Timestamp,
		Type::TimestampTz,
		Type::DateTime,
		Type::DateTimeTz,
		Type::Blob,
		Type::Clob,
		Type::Enumeration,
		Type::Set,
		Type::Multiset,
		Type::Sequence,
		Type::Object,
	];

	pub fn family(&self) -> TypeFamily {
		match self {
			Type::Short
			| Type::Integer
			| Type::BigInt
			| Type::Float
			| Type::Double
			| Type::Monetary
			| Type::Numeric => TypeFamily::Numeric,
			Type::Char | Type::VarChar | Type::NChar | Type::VarNChar => TypeFamily::Character,
			Type::Bit | Type::VarBit => TypeFamily::Bit,
			Type::Date
			| Type::Time
			| Type::Timestamp
			| Type::TimestampTz
			| Type::DateTime
			| Type::DateTimeTz => TypeFamily::Temporal,
			Type::Blob | Type::Clob => TypeFamily::Lob,
			Type::Enumeration => TypeFamily::Enumeration,
			Type::Set | Type::Multiset | Type::Sequence => TypeFamily::Collection,
			Type::Object => TypeFamily::Object,
		}
	}

	pub fn is_integral(&self) -> bool {
		matches!(self, Type::Short | Type::Integer | Type::BigInt)
	}

	pub fn is_floating(&self) -> bool {
		matches!(self, Type::Float | Type::Double | Type::Monetary)
	}

	pub fn is_numeric(&self) -> bool {
		self.family() == TypeFamily::Numeric
	}

	pub fn is_character(&self) -> bool {
		self.family() == TypeFamily::Character
	}

	pub fn is_bit(&self) -> bool {
		self.family() == TypeFamily::Bit
	}

	pub fn is_string(&self) -> bool {
		self.is_character() || self.is_bit()
	}

	pub fn is_temporal(&self) -> bool {
		self.family() == TypeFamily::Temporal
	}

	pub fn is_lob(&self) -> bool {
		self.family() == TypeFamily::Lob
	}

	pub fn is_collection(&self) -> bool {
		self.family() == TypeFamily::Collection
	}

	/// Fixed-length strings are blank (or zero) padded to their precision.
	pub fn is_fixed_length(&self) -> bool {
		matches!(self, Type::Char | Type::NChar | Type::Bit)
	}

	pub fn is_national(&self) -> bool {
		matches!(self, Type::NChar | Type::VarNChar)
	}

	pub fn has_timezone(&self) -> bool {
		matches!(self, Type::TimestampTz | Type::DateTimeTz)
	}

	/// Whether rows can be routed to partitions by a key of this type.
	pub fn is_partitionable(&self) -> bool {
		!matches!(self.family(), TypeFamily::Lob | TypeFamily::Collection | TypeFamily::Object)
	}

	/// Precision implied by the type when the definition does not give one.
	pub fn default_precision(&self) -> u32 {
		match self {
			Type::Short => 5,
			Type::Integer => 10,
			Type::BigInt => 19,
			Type::Float => 7,
			Type::Double | Type::Monetary => 15,
			Type::Numeric => 15,
			Type::Char | Type::NChar | Type::Bit => 1,
			Type::VarChar | Type::VarNChar => 1_073_741_823,
			Type::VarBit => 1_073_741_823,
			_ => 0,
		}
	}

	/// Widest printed form of any value of the type, used to decide whether
	/// a string column can hold it.
	pub fn printed_width(&self, precision: u32, scale: u16) -> Option<u32> {
		match self {
			Type::Short => Some(6),
			Type::Integer => Some(11),
			Type::BigInt => Some(20),
			Type::Float => Some(15),
			Type::Double => Some(24),
			Type::Monetary => Some(24),
			Type::Numeric => Some(precision + if scale > 0 { 2 } else { 1 }),
			Type::Date => Some(10),
			Type::Time => Some(8),
			Type::Timestamp => Some(19),
			Type::TimestampTz => Some(25),
			Type::DateTime => Some(23),
			Type::DateTimeTz => Some(29),
			_ => None,
		}
	}

	pub fn name(&self) -> &'static str {
		match self {
			Type::Short => "SHORT",
			Type::Integer => "INTEGER",
			Type::BigInt => "BIGINT",
			Type::Float => "FLOAT",
			Type::Double => "DOUBLE",
			Type::Monetary => "MONETARY",
			Type::Numeric => "NUMERIC",
			Type::Char => "CHAR",
			Type::VarChar => "VARCHAR",
			Type::NChar => "NCHAR",
			Type::VarNChar => "NCHAR VARYING",
			Type::Bit => "BIT",
			Type::VarBit => "BIT VARYING",
			Type::Date => "DATE",
			Type::Time => "TIME",
			Type::Timestamp => "TIMESTAMP",
			Type::TimestampTz => "TIMESTAMPTZ",
			Type::DateTime => "DATETIME",
			Type::DateTimeTz => "DATETIMETZ",
			Type::Blob => "BLOB",
			Type::Clob => "CLOB",
			Type::Enumeration => "ENUM",
			Type::Set => "SET",
			Type::Multiset => "MULTISET",
			Type::Sequence => "SEQUENCE",
			Type::Object => "OBJECT",
		}
	}
}

impl Display for Type {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_every_type_has_a_family() {
		for ty in Type::ALL {
			let _ = ty.family();
		}
		assert_eq!(Type::ALL.len(), 26);
	}

	#[test]
	fn test_partitionable() {
		assert!(Type::Integer.is_partitionable());
		assert!(Type::VarChar.is_partitionable());
		assert!(Type::Date.is_partitionable());
		assert!(!Type::Blob.is_partitionable());
		assert!(!Type::Set.is_partitionable());
		assert!(!Type::Object.is_partitionable());
	}
}
