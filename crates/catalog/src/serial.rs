// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use altera_type::{Result, error::diagnostic::coerce, return_error};
use serde::{Deserialize, Serialize};

use crate::id::{ClassId, SerialId};

/// Name of the serial backing an AUTO_INCREMENT attribute.
pub fn auto_increment_serial_name(class: &str, attribute: &str) -> String {
	format!("{}_ai_{}", class, attribute)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialDef {
	pub id: SerialId,
	pub name: String,
	pub owner_class: Option<ClassId>,
	pub owner_attribute: Option<String>,
	pub start: i64,
	pub increment: i64,
	/// Next value handed out.
	pub current: i64,
	pub max: i64,
}

impl SerialDef {
	pub fn new(id: SerialId, name: impl Into<String>, start: i64, increment: i64) -> Self {
		Self {
			id,
			name: name.into(),
			owner_class: None,
			owner_attribute: None,
			start,
			increment,
			current: start,
			max: i64::MAX,
		}
	}

	pub fn next_value(&mut self) -> Result<i64> {
		let value = self.current;
		if value > self.max {
			return_error!(coerce::value_out_of_range(&value.to_string(), &self.name));
		}
		self.current = value.saturating_add(self.increment);
		Ok(value)
	}
}
