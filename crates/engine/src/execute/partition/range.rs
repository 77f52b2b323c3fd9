// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{cmp::Ordering, collections::HashSet};

use altera_catalog::{PartitionDef, PartitionKind, PartitionValues, name::name_key};
use altera_type::{
	Domain, Result, Value, coerce,
	error::diagnostic::{partition, partition::invalid_range},
	return_error,
};

use crate::statement::{PartitionBound, PartitionDefinition};

/// Upper bounds ordered with MAXVALUE last.
pub(crate) fn compare_bounds(a: Option<&Value>, b: Option<&Value>) -> Ordering {
	match (a, b) {
		(None, None) => Ordering::Equal,
		(None, Some(_)) => Ordering::Greater,
		(Some(_), None) => Ordering::Less,
		(Some(a), Some(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
	}
}

/// Sorts RANGE partitions by upper bound and chains every lower bound to the
/// previous partition's upper bound; the first one starts at negative
/// infinity.
pub(crate) fn adjust_partition_range(partitions: &mut [PartitionDef]) {
	partitions.sort_by(|a, b| compare_bounds(a.upper_bound(), b.upper_bound()));

	let mut previous: Option<Value> = None;
	for def in partitions.iter_mut() {
		if let PartitionValues::Range {
			min,
			max,
		} = &mut def.values
		{
			*min = previous.take();
			previous = max.clone();
		}
	}
}

/// Checks a complete, sorted RANGE partition list: bounds strictly
/// increase and only the last partition may hold MAXVALUE.
pub(crate) fn validate_ranges(class: &str, partitions: &[PartitionDef]) -> Result<()> {
	for pair in partitions.windows(2) {
		match (pair[0].upper_bound(), pair[1].upper_bound()) {
			(None, _) => {
				return_error!(invalid_range(class, &pair[0].name, "only the last partition may hold MAXVALUE"));
			}
			(Some(low), Some(high)) if low.partial_cmp(high) != Some(Ordering::Less) => {
				return_error!(invalid_range(class, &pair[1].name, "bounds must be strictly increasing"));
			}
			_ => {}
		}
	}
	Ok(())
}

/// Every LIST value belongs to one partition only.
pub(crate) fn validate_lists(class: &str, partitions: &[PartitionDef]) -> Result<()> {
	let mut seen = HashSet::new();
	for def in partitions {
		if let PartitionValues::List(values) = &def.values {
			for value in values {
				if !seen.insert(value.to_plain_string()) {
					return_error!(partition::duplicate_list_value(class, &value.to_string()));
				}
			}
		}
	}
	Ok(())
}

/// Partition names are unique within the class, case-insensitively.
pub(crate) fn validate_names<'a>(class: &str, names: impl IntoIterator<Item = &'a str>) -> Result<()> {
	let mut seen = HashSet::new();
	for name in names {
		if !seen.insert(name_key(name)) {
			return_error!(partition::duplicate_partition_name(class, name));
		}
	}
	Ok(())
}

/// Values a requested partition accepts, coerced into the key domain.
pub(crate) fn partition_values(
	class: &str,
	kind: PartitionKind,
	key: &Domain,
	definition: &PartitionDefinition,
) -> Result<PartitionValues> {
	match (kind, &definition.bound) {
		(PartitionKind::Range, PartitionBound::LessThan(bound)) => Ok(PartitionValues::Range {
			min: None,
			max: bound.as_ref().map(|value| coerce(value, key)).transpose()?,
		}),
		(PartitionKind::List, PartitionBound::In(values)) => {
			let values = values.iter().map(|value| coerce(value, key)).collect::<Result<Vec<_>>>()?;
			Ok(PartitionValues::List(values))
		}
		(PartitionKind::Hash, _) => Ok(PartitionValues::Hash),
		_ => return_error!(invalid_range(class, &definition.name, "bound does not match the partition kind")),
	}
}

pub(crate) fn hash_partition_name(index: usize) -> String {
	format!("p{}", index)
}
