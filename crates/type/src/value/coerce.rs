// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use num_traits::{ToPrimitive, Zero};

use crate::{
	Result, error,
	error::{Error, diagnostic::coerce},
	value::{Value, domain::Domain, r#type::Type},
};

fn invalid(value: &Value, domain: &Domain) -> Error {
	error!(coerce::invalid_conversion(&value.to_string(), &domain.to_string()))
}

fn out_of_range(value: &Value, domain: &Domain) -> Error {
	error!(coerce::value_out_of_range(&value.to_string(), &domain.to_string()))
}

fn too_long(value: &Value, domain: &Domain, length: usize) -> Error {
	error!(coerce::value_too_long(&value.to_string(), &domain.to_string(), length))
}

/// Converts `value` into the representation `domain` stores, failing when the
/// value cannot be represented without loss the domain forbids.
pub fn coerce(value: &Value, domain: &Domain) -> Result<Value> {
	if value.is_null() {
		return Ok(Value::Null);
	}

	match domain.ty {
		Type::Short => to_integral(value, domain, i16::MIN as i64, i16::MAX as i64).map(|v| Value::Short(v as i16)),
		Type::Integer => {
			to_integral(value, domain, i32::MIN as i64, i32::MAX as i64).map(|v| Value::Integer(v as i32))
		}
		Type::BigInt => to_integral(value, domain, i64::MIN, i64::MAX).map(Value::BigInt),
		Type::Float => {
			let v = to_f64(value, domain)?;
			if v.abs() > f32::MAX as f64 {
				return Err(out_of_range(value, domain));
			}
			Ok(Value::Float(v as f32))
		}
		Type::Double => to_f64(value, domain).map(Value::Double),
		Type::Monetary => to_f64(value, domain).map(Value::Monetary),
		Type::Numeric => to_numeric(value, domain),
		Type::Char | Type::VarChar | Type::NChar | Type::VarNChar => to_character(value, domain),
		Type::Bit | Type::VarBit => to_bit(value, domain),
		Type::Date => to_date(value, domain).map(Value::Date),
		Type::Time => to_time(value, domain).map(Value::Time),
		Type::Timestamp => {
			let dt = to_naive_datetime(value, domain)?;
			let dt = dt.with_nanosecond(0).unwrap_or(dt);
			if !timestamp_in_range(&dt) {
				return Err(out_of_range(value, domain));
			}
			Ok(Value::Timestamp(dt))
		}
		Type::DateTime => {
			let dt = to_naive_datetime(value, domain)?;
			Ok(Value::DateTime(truncate_millis(dt)))
		}
		Type::TimestampTz => {
			let dt = to_zoned(value, domain)?;
			if !timestamp_in_range(&dt.naive_utc()) {
				return Err(out_of_range(value, domain));
			}
			Ok(Value::TimestampTz(dt.with_nanosecond(0).unwrap_or(dt)))
		}
		Type::DateTimeTz => {
			let dt = to_zoned(value, domain)?;
			let truncated = dt.with_nanosecond(dt.nanosecond() / 1_000_000 * 1_000_000).unwrap_or(dt);
			Ok(Value::DateTimeTz(truncated))
		}
		Type::Blob => match value {
			Value::Blob(bytes) => Ok(Value::Blob(bytes.clone())),
			Value::Bit(bits) => Ok(Value::Blob(pack_bits(bits))),
			_ => Err(invalid(value, domain)),
		},
		Type::Clob => match value {
			Value::String(s) | Value::Clob(s) | Value::Enum(s) => Ok(Value::Clob(s.clone())),
			v if v.is_numeric() || v.as_datetime().is_some() => Ok(Value::Clob(v.to_plain_string())),
			_ => Err(invalid(value, domain)),
		},
		Type::Enumeration => to_enumeration(value, domain),
		Type::Set | Type::Multiset | Type::Sequence => to_collection(value, domain),
		Type::Object => match value {
			Value::Object(oid) => Ok(Value::Object(*oid)),
			_ => Err(invalid(value, domain)),
		},
	}
}

/// Value a NOT NULL attribute takes for existing NULL rows when nothing
/// better is known. Types without a sensible zero value have none.
pub fn hard_default(domain: &Domain) -> Option<Value> {
	let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?.and_hms_opt(0, 0, 0)?;
	let utc = FixedOffset::east_opt(0)?;

	let value = match domain.ty {
		Type::Short => Value::Short(0),
		Type::Integer => Value::Integer(0),
		Type::BigInt => Value::BigInt(0),
		Type::Float => Value::Float(0.0),
		Type::Double => Value::Double(0.0),
		Type::Monetary => Value::Monetary(0.0),
		Type::Numeric => Value::Numeric(BigDecimal::zero().with_scale(domain.scale as i64)),
		Type::Char | Type::NChar => Value::String(" ".repeat(domain.precision as usize)),
		Type::VarChar | Type::VarNChar => Value::String(String::new()),
		Type::Bit => Value::Bit("0".repeat(domain.precision as usize)),
		Type::VarBit => Value::Bit(String::new()),
		Type::Date => Value::Date(epoch.date()),
		Type::Time => Value::Time(NaiveTime::from_hms_opt(0, 0, 0)?),
		Type::Timestamp => Value::Timestamp(epoch),
		Type::DateTime => Value::DateTime(epoch),
		Type::TimestampTz => Value::TimestampTz(utc.from_utc_datetime(&epoch)),
		Type::DateTimeTz => Value::DateTimeTz(utc.from_utc_datetime(&epoch)),
		Type::Enumeration => Value::Enum(domain.enumeration.first()?.clone()),
		Type::Set | Type::Multiset | Type::Sequence => Value::Collection(vec![]),
		Type::Blob | Type::Clob | Type::Object => return None,
	};
	Some(value)
}

fn parse_decimal(s: &str) -> Option<BigDecimal> {
	BigDecimal::from_str(s.trim()).ok()
}

fn to_decimal(value: &Value, domain: &Domain) -> Result<BigDecimal> {
	match value {
		Value::String(s) | Value::Clob(s) => parse_decimal(s).ok_or_else(|| invalid(value, domain)),
		v => v.as_decimal().ok_or_else(|| invalid(value, domain)),
	}
}

fn to_integral(value: &Value, domain: &Domain, min: i64, max: i64) -> Result<i64> {
	if let Value::Float(f) = value {
		if !f.is_finite() {
			return Err(out_of_range(value, domain));
		}
	}
	if let Value::Double(f) | Value::Monetary(f) = value {
		if !f.is_finite() {
			return Err(out_of_range(value, domain));
		}
	}

	let rounded = to_decimal(value, domain)?.with_scale_round(0, RoundingMode::HalfUp);
	let n = rounded.to_i64().ok_or_else(|| out_of_range(value, domain))?;
	if n < min || n > max {
		return Err(out_of_range(value, domain));
	}
	Ok(n)
}

fn to_f64(value: &Value, domain: &Domain) -> Result<f64> {
	let v = match value {
		Value::String(s) | Value::Clob(s) => s.trim().parse::<f64>().map_err(|_| invalid(value, domain))?,
		v => v.as_f64().ok_or_else(|| invalid(value, domain))?,
	};
	if !v.is_finite() {
		return Err(out_of_range(value, domain));
	}
	Ok(v)
}

fn to_numeric(value: &Value, domain: &Domain) -> Result<Value> {
	let rounded = to_decimal(value, domain)?.with_scale_round(domain.scale as i64, RoundingMode::HalfUp);
	let limit = BigDecimal::from_str(&format!("1e{}", domain.integer_digits()))
		.map_err(|_| out_of_range(value, domain))?;
	if rounded.abs() >= limit {
		return Err(out_of_range(value, domain));
	}
	Ok(Value::Numeric(rounded))
}

fn to_character(value: &Value, domain: &Domain) -> Result<Value> {
	let text = match value {
		Value::String(s) | Value::Clob(s) | Value::Enum(s) => s.clone(),
		v if v.is_numeric() || v.as_datetime().is_some() || matches!(v, Value::Time(_)) => v.to_plain_string(),
		_ => return Err(invalid(value, domain)),
	};

	let max = domain.precision as usize;
	let length = text.chars().count();
	let text = if length > max {
		let trimmed = text.trim_end_matches(' ');
		if trimmed.chars().count() > max {
			return Err(too_long(value, domain, length));
		}
		trimmed.to_string()
	} else {
		text
	};

	if domain.ty.is_fixed_length() {
		let pad = max - text.chars().count();
		return Ok(Value::String(format!("{}{}", text, " ".repeat(pad))));
	}
	Ok(Value::String(text))
}

fn to_bit(value: &Value, domain: &Domain) -> Result<Value> {
	let bits = match value {
		Value::Bit(bits) => bits.clone(),
		Value::Blob(bytes) => bytes.iter().map(|b| format!("{:08b}", b)).collect(),
		_ => return Err(invalid(value, domain)),
	};

	let max = domain.precision as usize;
	if bits.len() > max {
		return Err(too_long(value, domain, bits.len()));
	}
	if domain.ty.is_fixed_length() {
		return Ok(Value::Bit(format!("{}{}", bits, "0".repeat(max - bits.len()))));
	}
	Ok(Value::Bit(bits))
}

fn pack_bits(bits: &str) -> Vec<u8> {
	bits.as_bytes()
		.chunks(8)
		.map(|chunk| {
			chunk.iter().enumerate().fold(0u8, |acc, (i, b)| if *b == b'1' { acc | (0x80 >> i) } else { acc })
		})
		.collect()
}

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

fn parse_naive_datetime(s: &str) -> Option<NaiveDateTime> {
	let s = s.trim();
	DATETIME_FORMATS
		.iter()
		.find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
		.or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)))
}

fn to_date(value: &Value, domain: &Domain) -> Result<NaiveDate> {
	match value {
		Value::Date(d) => Ok(*d),
		Value::TimestampTz(dt) | Value::DateTimeTz(dt) => Ok(dt.naive_local().date()),
		Value::String(s) | Value::Clob(s) => parse_naive_datetime(s).map(|dt| dt.date()).ok_or_else(|| invalid(value, domain)),
		v => v.as_datetime().map(|dt| dt.date()).ok_or_else(|| invalid(value, domain)),
	}
}

fn to_time(value: &Value, domain: &Domain) -> Result<NaiveTime> {
	let time = match value {
		Value::Time(t) => *t,
		Value::Date(_) => return Err(invalid(value, domain)),
		Value::TimestampTz(dt) | Value::DateTimeTz(dt) => dt.naive_local().time(),
		Value::String(s) | Value::Clob(s) => NaiveTime::parse_from_str(s.trim(), "%H:%M:%S")
			.ok()
			.or_else(|| parse_naive_datetime(s).map(|dt| dt.time()))
			.ok_or_else(|| invalid(value, domain))?,
		v => v.as_datetime().map(|dt| dt.time()).ok_or_else(|| invalid(value, domain))?,
	};
	Ok(time.with_nanosecond(0).unwrap_or(time))
}

fn to_naive_datetime(value: &Value, domain: &Domain) -> Result<NaiveDateTime> {
	match value {
		Value::TimestampTz(dt) | Value::DateTimeTz(dt) => Ok(dt.naive_local()),
		Value::String(s) | Value::Clob(s) => parse_naive_datetime(s).ok_or_else(|| invalid(value, domain)),
		v => v.as_datetime().ok_or_else(|| invalid(value, domain)),
	}
}

fn to_zoned(value: &Value, domain: &Domain) -> Result<DateTime<FixedOffset>> {
	if let Value::TimestampTz(dt) | Value::DateTimeTz(dt) = value {
		return Ok(*dt);
	}
	if let Value::String(s) | Value::Clob(s) = value {
		if let Ok(dt) = DateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S%.f %:z") {
			return Ok(dt);
		}
	}

	let naive = to_naive_datetime(value, domain)?;
	let utc = FixedOffset::east_opt(0).ok_or_else(|| invalid(value, domain))?;
	Ok(utc.from_utc_datetime(&naive))
}

fn truncate_millis(dt: NaiveDateTime) -> NaiveDateTime {
	dt.with_nanosecond(dt.nanosecond() / 1_000_000 * 1_000_000).unwrap_or(dt)
}

fn timestamp_in_range(dt: &NaiveDateTime) -> bool {
	let seconds = dt.and_utc().timestamp();
	(0..=i32::MAX as i64).contains(&seconds)
}

fn to_enumeration(value: &Value, domain: &Domain) -> Result<Value> {
	match value {
		Value::Enum(label) | Value::String(label) => {
			let label = label.trim_end_matches(' ');
			if domain.enumeration.iter().any(|l| l == label) {
				Ok(Value::Enum(label.to_string()))
			} else {
				Err(invalid(value, domain))
			}
		}
		v if v.is_numeric() => {
			let index = to_integral(v, domain, 1, domain.enumeration.len() as i64)
				.map_err(|_| out_of_range(value, domain))?;
			Ok(Value::Enum(domain.enumeration[(index - 1) as usize].clone()))
		}
		_ => Err(invalid(value, domain)),
	}
}

fn to_collection(value: &Value, domain: &Domain) -> Result<Value> {
	let Value::Collection(items) = value else {
		return Err(invalid(value, domain));
	};

	let mut out: Vec<Value> = Vec::with_capacity(items.len());
	for item in items {
		let coerced = if domain.elements.is_empty() || item.is_null() {
			item.clone()
		} else {
			domain.elements.iter().find_map(|element| coerce(item, element).ok()).ok_or_else(|| invalid(value, domain))?
		};

		if domain.ty == Type::Set && out.contains(&coerced) {
			continue;
		}
		out.push(coerced);
	}
	Ok(Value::Collection(out))
}
