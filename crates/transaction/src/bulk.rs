// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use altera_type::Value;

/// Statements the DDL engine hands to the query service. Each one stands for
/// a single SQL statement executed server side; [`BulkStatement::sql`] gives
/// its text.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkStatement {
	/// Re-encodes every value of the attribute into its current domain.
	DomainUpgrade {
		class: String,
		attribute: String,
	},
	/// Sets the attribute to `value`, on every row or only on NULL rows.
	Fill {
		class: String,
		attribute: String,
		value: Value,
		only_nulls: bool,
	},
	/// Assigns the next serial value to every NULL of the attribute.
	FillSerial {
		class: String,
		attribute: String,
		serial: String,
	},
	CountNulls {
		class: String,
		attribute: String,
	},
	/// Rows whose key repeats an earlier row's key; keys holding NULL never
	/// count.
	CountDuplicates {
		class: String,
		attributes: Vec<String>,
	},
	/// No-op rewrite of the key which re-routes every row through the
	/// partition descriptor.
	Redistribute {
		class: String,
		key: String,
	},
	InsertSelect {
		target: String,
		source: String,
	},
}

impl BulkStatement {
	pub fn class(&self) -> &str {
		match self {
			BulkStatement::DomainUpgrade {
				class,
				..
			}
			| BulkStatement::Fill {
				class,
				..
			}
			| BulkStatement::FillSerial {
				class,
				..
			}
			| BulkStatement::CountNulls {
				class,
				..
			}
			| BulkStatement::CountDuplicates {
				class,
				..
			}
			| BulkStatement::Redistribute {
				class,
				..
			} => class,
			BulkStatement::InsertSelect {
				target,
				..
			} => target,
		}
	}

	pub fn sql(&self) -> String {
		match self {
			BulkStatement::DomainUpgrade {
				class,
				attribute,
			} => format!("UPDATE ONLY [{}] SET [{}] = [{}]", class, attribute, attribute),
			BulkStatement::Fill {
				class,
				attribute,
				value,
				only_nulls,
			} => {
				let mut sql = format!("UPDATE ONLY [{}] SET [{}] = {}", class, attribute, value);
				if *only_nulls {
					sql.push_str(&format!(" WHERE [{}] IS NULL", attribute));
				}
				sql
			}
			BulkStatement::FillSerial {
				class,
				attribute,
				serial,
			} => format!(
				"UPDATE ONLY [{}] SET [{}] = [{}].NEXT_VALUE WHERE [{}] IS NULL",
				class, attribute, serial, attribute
			),
			BulkStatement::CountNulls {
				class,
				attribute,
			} => format!("SELECT COUNT(*) FROM ONLY [{}] WHERE [{}] IS NULL", class, attribute),
			BulkStatement::CountDuplicates {
				class,
				attributes,
			} => {
				let keys: Vec<String> = attributes.iter().map(|a| format!("[{}]", a)).collect();
				let keys = keys.join(", ");
				format!(
					"SELECT SUM(c - 1) FROM (SELECT COUNT(*) c FROM ONLY [{}] GROUP BY {} HAVING COUNT(*) > 1)",
					class, keys
				)
			}
			BulkStatement::Redistribute {
				class,
				key,
			} => format!("UPDATE [{}] SET [{}] = [{}]", class, key, key),
			BulkStatement::InsertSelect {
				target,
				source,
			} => format!("INSERT INTO [{}] SELECT * FROM [{}]", target, source),
		}
	}
}

impl Display for BulkStatement {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.sql())
	}
}
