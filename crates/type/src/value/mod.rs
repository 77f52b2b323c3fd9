// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	cmp::Ordering,
	fmt::{Display, Formatter},
};

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

pub mod coerce;
pub mod collation;
pub mod domain;
pub mod r#type;

/// A single stored attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
	Null,
	Short(i16),
	Integer(i32),
	BigInt(i64),
	Float(f32),
	Double(f64),
	Monetary(f64),
	Numeric(BigDecimal),
	/// Any character string (CHAR, VARCHAR, NCHAR, NCHAR VARYING).
	String(String),
	/// Binary digits of a BIT or BIT VARYING value, e.g. `"0101"`.
	Bit(String),
	Date(NaiveDate),
	Time(NaiveTime),
	Timestamp(NaiveDateTime),
	TimestampTz(DateTime<FixedOffset>),
	DateTime(NaiveDateTime),
	DateTimeTz(DateTime<FixedOffset>),
	Blob(Vec<u8>),
	Clob(String),
	Enum(String),
	Collection(Vec<Value>),
	Object(u64),
}

impl Value {
	pub fn string(s: impl Into<String>) -> Self {
		Value::String(s.into())
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	pub fn is_numeric(&self) -> bool {
		matches!(
			self,
			Value::Short(_)
				| Value::Integer(_) | Value::BigInt(_)
				| Value::Float(_) | Value::Double(_)
				| Value::Monetary(_) | Value::Numeric(_)
		)
	}

	pub fn as_decimal(&self) -> Option<BigDecimal> {
		match self {
			Value::Short(v) => Some(BigDecimal::from(*v)),
			Value::Integer(v) => Some(BigDecimal::from(*v)),
			Value::BigInt(v) => Some(BigDecimal::from(*v)),
			Value::Float(v) => BigDecimal::from_f32(*v),
			Value::Double(v) | Value::Monetary(v) => BigDecimal::from_f64(*v),
			Value::Numeric(v) => Some(v.clone()),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Float(v) => Some(*v as f64),
			Value::Double(v) | Value::Monetary(v) => Some(*v),
			other => other.as_decimal().and_then(|d| d.to_f64()),
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(s) | Value::Clob(s) | Value::Enum(s) => Some(s.as_str()),
			_ => None,
		}
	}

	/// Naive timestamp view of any date-carrying value.
	pub fn as_datetime(&self) -> Option<NaiveDateTime> {
		match self {
			Value::Date(d) => d.and_hms_opt(0, 0, 0),
			Value::Timestamp(dt) | Value::DateTime(dt) => Some(*dt),
			Value::TimestampTz(dt) | Value::DateTimeTz(dt) => Some(dt.naive_utc()),
			_ => None,
		}
	}

	/// Unquoted textual form, used when a value is converted into a string.
	pub fn to_plain_string(&self) -> String {
		match self {
			Value::Null => String::new(),
			Value::String(s) | Value::Clob(s) | Value::Enum(s) | Value::Bit(s) => s.clone(),
			Value::Date(d) => d.format("%Y-%m-%d").to_string(),
			Value::Time(t) => t.format("%H:%M:%S").to_string(),
			Value::Timestamp(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
			Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
			Value::TimestampTz(dt) => dt.format("%Y-%m-%d %H:%M:%S %:z").to_string(),
			Value::DateTimeTz(dt) => dt.format("%Y-%m-%d %H:%M:%S%.3f %:z").to_string(),
			other => other.to_string(),
		}
	}
}

impl PartialOrd for Value {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		if self.is_numeric() && other.is_numeric() {
			return self.as_decimal()?.partial_cmp(&other.as_decimal()?);
		}

		match (self, other) {
			(Value::Null, Value::Null) => Some(Ordering::Equal),
			(Value::Bit(a), Value::Bit(b)) => a.partial_cmp(b),
			(Value::Time(a), Value::Time(b)) => a.partial_cmp(b),
			(Value::Blob(a), Value::Blob(b)) => a.partial_cmp(b),
			(Value::Object(a), Value::Object(b)) => a.partial_cmp(b),
			(a, b) => {
				if let (Some(a), Some(b)) = (a.as_str(), b.as_str()) {
					return a.partial_cmp(b);
				}
				if let (Some(a), Some(b)) = (a.as_datetime(), b.as_datetime()) {
					return a.partial_cmp(&b);
				}
				None
			}
		}
	}
}

fn quote(s: &str) -> String {
	format!("'{}'", s.replace('\'', "''"))
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Null => f.write_str("NULL"),
			Value::Short(v) => write!(f, "{}", v),
			Value::Integer(v) => write!(f, "{}", v),
			Value::BigInt(v) => write!(f, "{}", v),
			Value::Float(v) => write!(f, "{}", v),
			Value::Double(v) => write!(f, "{}", v),
			Value::Monetary(v) => write!(f, "${:.2}", v),
			Value::Numeric(v) => write!(f, "{}", v),
			Value::String(s) | Value::Clob(s) | Value::Enum(s) => f.write_str(&quote(s)),
			Value::Bit(bits) => write!(f, "B'{}'", bits),
			Value::Date(_) => write!(f, "DATE'{}'", self.to_plain_string()),
			Value::Time(_) => write!(f, "TIME'{}'", self.to_plain_string()),
			Value::Timestamp(_) => write!(f, "TIMESTAMP'{}'", self.to_plain_string()),
			Value::TimestampTz(_) => write!(f, "TIMESTAMPTZ'{}'", self.to_plain_string()),
			Value::DateTime(_) => write!(f, "DATETIME'{}'", self.to_plain_string()),
			Value::DateTimeTz(_) => write!(f, "DATETIMETZ'{}'", self.to_plain_string()),
			Value::Blob(bytes) => {
				f.write_str("X'")?;
				for b in bytes {
					write!(f, "{:02x}", b)?;
				}
				f.write_str("'")
			}
			Value::Collection(items) => {
				let items: Vec<String> = items.iter().map(ToString::to_string).collect();
				write!(f, "{{{}}}", items.join(", "))
			}
			Value::Object(oid) => write!(f, "OID({})", oid),
		}
	}
}
