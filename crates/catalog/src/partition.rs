// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	cmp::Ordering,
	fmt::{Display, Formatter},
};

use altera_type::Value;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::{id::ClassId, name::names_equal};

/// Separates the root class name from the partition name in the name of a
/// partition sub-class.
pub const PARTITION_SEPARATOR: &str = "__p__";

pub fn partition_class_name(root: &str, partition: &str) -> String {
	format!("{}{}{}", root, PARTITION_SEPARATOR, partition)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartitionKind {
	Range,
	List,
	Hash,
}

impl Display for PartitionKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			PartitionKind::Range => "RANGE",
			PartitionKind::List => "LIST",
			PartitionKind::Hash => "HASH",
		})
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PartitionValues {
	/// `min <= key < max`. A missing `min` is negative infinity, a missing
	/// `max` is MAXVALUE.
	Range {
		min: Option<Value>,
		max: Option<Value>,
	},
	List(Vec<Value>),
	Hash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionDef {
	pub name: String,
	pub class: ClassId,
	pub values: PartitionValues,
	pub comment: Option<String>,
}

impl PartitionDef {
	pub fn upper_bound(&self) -> Option<&Value> {
		match &self.values {
			PartitionValues::Range {
				max,
				..
			} => max.as_ref(),
			_ => None,
		}
	}

	fn accepts(&self, key: &Value) -> bool {
		match &self.values {
			PartitionValues::Range {
				min,
				max,
			} => {
				let above_min = match min {
					None => true,
					Some(_) if key.is_null() => false,
					Some(min) => matches!(key.partial_cmp(min), Some(Ordering::Greater | Ordering::Equal)),
				};
				let below_max = match max {
					None => true,
					Some(_) if key.is_null() => true,
					Some(max) => matches!(key.partial_cmp(max), Some(Ordering::Less)),
				};
				above_min && below_max
			}
			PartitionValues::List(values) => values.iter().any(|v| {
				if key.is_null() {
					v.is_null()
				} else {
					matches!(key.partial_cmp(v), Some(Ordering::Equal))
				}
			}),
			PartitionValues::Hash => false,
		}
	}
}

/// Partition descriptor owned by the root class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionInfo {
	pub kind: PartitionKind,
	/// Name of the key attribute.
	pub key: String,
	/// Key expression text, when the key is an expression over `key`.
	pub expression: Option<String>,
	pub partitions: Vec<PartitionDef>,
}

impl PartitionInfo {
	pub fn size(&self) -> usize {
		self.partitions.len()
	}

	pub fn find(&self, name: &str) -> Option<&PartitionDef> {
		self.partitions.iter().find(|p| names_equal(&p.name, name))
	}

	pub fn by_class(&self, class: ClassId) -> Option<&PartitionDef> {
		self.partitions.iter().find(|p| p.class == class)
	}

	pub fn classes(&self) -> impl Iterator<Item = ClassId> + '_ {
		self.partitions.iter().map(|p| p.class)
	}

	pub fn is_key(&self, attribute: &str) -> bool {
		names_equal(&self.key, attribute)
	}

	/// Partition a row with the given key value belongs to.
	pub fn route(&self, key: &Value) -> Option<&PartitionDef> {
		match self.kind {
			PartitionKind::Hash => {
				if self.partitions.is_empty() {
					return None;
				}
				let index = hash_partition_index(key, self.partitions.len());
				self.partitions.get(index)
			}
			PartitionKind::Range | PartitionKind::List => self.partitions.iter().find(|p| p.accepts(key)),
		}
	}
}

pub fn hash_partition_index(key: &Value, size: usize) -> usize {
	(xxh3_64(key.to_plain_string().as_bytes()) % size as u64) as usize
}

/// Back reference from a partition sub-class to its root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionOf {
	pub root: ClassId,
	pub name: String,
}
