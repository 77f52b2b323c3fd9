// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashSet;

use altera_catalog::{AttributeDef, ClassDef};
use altera_type::{
	Error, Result, Value, coerce,
	error::diagnostic::{catalog, coerce as coerce_diag},
	return_error,
};
use tracing::{debug, instrument};

use crate::{
	bulk::BulkStatement,
	memory::{MemoryTransaction, Row},
	service::QueryService,
};

fn attribute<'a>(class: &'a ClassDef, name: &str) -> Result<&'a AttributeDef> {
	match class.find_attribute(name) {
		Some(attr) => Ok(attr),
		None => return_error!(catalog::attribute_not_found(&class.name, name)),
	}
}

fn coerce_row_value(class: &ClassDef, attr: &AttributeDef, value: &Value) -> Result<Value> {
	coerce(value, &attr.domain)
		.map_err(|err| Error::new(coerce_diag::row_coercion_failed(&class.name, &attr.name, err.diagnostic())))
}

impl QueryService for MemoryTransaction {
	#[instrument(name = "transaction::run", level = "debug", skip(self, statement), fields(sql = %statement))]
	fn run(&mut self, statement: &BulkStatement) -> Result<u64> {
		self.ensure_active()?;

		let affected = match statement {
			BulkStatement::DomainUpgrade {
				class,
				attribute: name,
			} => {
				let class = self.state.class_by_name(class)?;
				let attr = attribute(&class, name)?;
				let mut count = 0;
				for row in self.state.rows_mut(class.id).iter_mut() {
					if let Some(value) = row.get_mut(&attr.id) {
						*value = coerce_row_value(&class, attr, value)?;
						count += 1;
					}
				}
				count
			}
			BulkStatement::Fill {
				class,
				attribute: name,
				value,
				only_nulls,
			} => {
				let class = self.state.class_by_name(class)?;
				let attr = attribute(&class, name)?;
				let value = coerce_row_value(&class, attr, value)?;
				let mut count = 0;
				for row in self.state.rows_mut(class.id).iter_mut() {
					let is_null = row.get(&attr.id).is_none_or(Value::is_null);
					if *only_nulls && !is_null {
						continue;
					}
					row.insert(attr.id, value.clone());
					count += 1;
				}
				count
			}
			BulkStatement::FillSerial {
				class,
				attribute: name,
				serial,
			} => {
				let class = self.state.class_by_name(class)?;
				let attr = attribute(&class, name)?;
				let Some(mut def) = self.state.catalog.find_serial_by_name(serial) else {
					return_error!(catalog::serial_not_found(serial));
				};
				let mut count = 0;
				for row in self.state.rows_mut(class.id).iter_mut() {
					if row.get(&attr.id).is_none_or(Value::is_null) {
						let next = Value::BigInt(def.next_value()?);
						row.insert(attr.id, coerce_row_value(&class, attr, &next)?);
						count += 1;
					}
				}
				self.state.touch_serial(def.id);
				self.state.catalog.set_serial(def.id, Some(def));
				count
			}
			BulkStatement::CountNulls {
				class,
				attribute: name,
			} => {
				let class = self.state.class_by_name(class)?;
				let attr = attribute(&class, name)?;
				self.state
					.rows
					.get(&class.id)
					.map(|rows| rows.iter().filter(|row| row.get(&attr.id).is_none_or(Value::is_null)).count())
					.unwrap_or(0) as u64
			}
			BulkStatement::CountDuplicates {
				class,
				attributes,
			} => {
				let class = self.state.class_by_name(class)?;
				let ids = attributes.iter().map(|name| attribute(&class, name).map(|a| a.id)).collect::<Result<Vec<_>>>()?;
				let mut seen = HashSet::new();
				let mut count = 0;
				for row in self.state.rows.get(&class.id).into_iter().flatten() {
					let key: Option<Vec<String>> = ids
						.iter()
						.map(|id| row.get(id).filter(|v| !v.is_null()).map(Value::to_plain_string))
						.collect();
					if let Some(key) = key {
						if !seen.insert(key) {
							count += 1;
						}
					}
				}
				count
			}
			BulkStatement::Redistribute {
				class,
				key,
			} => {
				let class = self.state.class_by_name(class)?;
				attribute(&class, key)?;
				let mut rows: Vec<Row> = std::mem::take(self.state.rows_mut(class.id));
				if let Some(info) = &class.partition {
					for id in info.classes() {
						rows.append(self.state.rows_mut(id));
					}
				}
				let count = rows.len() as u64;
				for row in rows {
					self.place(&class, row)?;
				}
				count
			}
			BulkStatement::InsertSelect {
				target,
				source,
			} => {
				let target = self.state.class_by_name(target)?;
				let source = self.state.class_by_name(source)?;
				let rows = self.state.scan(&source);
				let count = rows.len() as u64;
				for row in rows {
					let mut copy = Row::new();
					for attr in target.instance_attributes() {
						let value = source
							.find_attribute(&attr.name)
							.and_then(|src| row.get(&src.id))
							.cloned()
							.unwrap_or(Value::Null);
						copy.insert(attr.id, coerce_row_value(&target, attr, &value)?);
					}
					self.place(&target, copy)?;
				}
				count
			}
		};

		debug!(class = statement.class(), affected, "bulk statement done");
		Ok(affected)
	}
}
