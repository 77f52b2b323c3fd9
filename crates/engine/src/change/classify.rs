// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashMap;

use altera_type::{Codeset, Domain, Type as T};
use once_cell::sync::Lazy;

/// Cost of moving stored values from one domain to another, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeChange {
	Unchanged,
	/// Same type, larger length. Schema only.
	PrecisionIncrease,
	/// Object reference widened to a superclass, or a collection whose
	/// elements all stay compatible.
	SetOrClassCompatible,
	/// Every value converts; rows must still be rewritten.
	Upgrade,
	/// Values convert one by one and any of them may fail.
	NeedRowCheck,
	/// Conversion always succeeds but drops information.
	PseudoUpgrade,
	NotSupported,
	/// Not supported under the current configuration only.
	NotSupportedWithConfig,
}

impl TypeChange {
	pub fn is_supported(&self) -> bool {
		*self < TypeChange::NotSupported
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollationChange {
	Unchanged,
	PseudoUpgrade {
		/// A prefix index on the attribute cannot be kept under the new
		/// collation.
		index_incompatible: bool,
	},
	NotSupported,
}

/// Superclass relation between classes, consulted for OBJECT domains.
pub trait ClassHierarchy {
	fn is_superclass(&self, class: &str, superclass: &str) -> bool;

	fn contains(&self, _class: &str) -> bool {
		true
	}
}

/// Hierarchy with no inheritance at all.
pub struct FlatHierarchy;

impl ClassHierarchy for FlatHierarchy {
	fn is_superclass(&self, _class: &str, _superclass: &str) -> bool {
		false
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
	Same,
	Upgrade,
	RowCheck,
	Pseudo,
	/// Decided by the declared length.
	Length,
	/// Decided by the digits left of the decimal point.
	Digits,
	/// Decided by whether the printed form fits the target string.
	Width,
	Enumeration,
	Collection,
	Object,
}

const NUMERIC: [T; 7] = [T::Short, T::Integer, T::BigInt, T::Float, T::Double, T::Monetary, T::Numeric];
const TEMPORAL: [T; 6] = [T::Date, T::Time, T::Timestamp, T::TimestampTz, T::DateTime, T::DateTimeTz];
const CHARACTER: [T; 4] = [T::Char, T::VarChar, T::NChar, T::VarNChar];

#[rustfmt::skip]
const RULES: &[(T, T, Rule)] = &[
	(T::Short, T::Integer, Rule::Upgrade),
	(T::Short, T::BigInt, Rule::Upgrade),
	(T::Short, T::Float, Rule::Upgrade),
	(T::Short, T::Double, Rule::Upgrade),
	(T::Short, T::Monetary, Rule::Upgrade),
	(T::Short, T::Numeric, Rule::Digits),
	(T::Integer, T::Short, Rule::RowCheck),
	(T::Integer, T::BigInt, Rule::Upgrade),
	(T::Integer, T::Float, Rule::RowCheck),
	(T::Integer, T::Double, Rule::Upgrade),
	(T::Integer, T::Monetary, Rule::Upgrade),
	(T::Integer, T::Numeric, Rule::Digits),
	(T::BigInt, T::Short, Rule::RowCheck),
	(T::BigInt, T::Integer, Rule::RowCheck),
	(T::BigInt, T::Float, Rule::RowCheck),
	(T::BigInt, T::Double, Rule::RowCheck),
	(T::BigInt, T::Monetary, Rule::RowCheck),
	(T::BigInt, T::Numeric, Rule::Digits),
	(T::Float, T::Short, Rule::RowCheck),
	(T::Float, T::Integer, Rule::RowCheck),
	(T::Float, T::BigInt, Rule::RowCheck),
	(T::Float, T::Double, Rule::Upgrade),
	(T::Float, T::Monetary, Rule::Upgrade),
	(T::Float, T::Numeric, Rule::RowCheck),
	(T::Double, T::Short, Rule::RowCheck),
	(T::Double, T::Integer, Rule::RowCheck),
	(T::Double, T::BigInt, Rule::RowCheck),
	(T::Double, T::Float, Rule::RowCheck),
	(T::Double, T::Monetary, Rule::Upgrade),
	(T::Double, T::Numeric, Rule::RowCheck),
	(T::Monetary, T::Short, Rule::RowCheck),
	(T::Monetary, T::Integer, Rule::RowCheck),
	(T::Monetary, T::BigInt, Rule::RowCheck),
	(T::Monetary, T::Float, Rule::RowCheck),
	(T::Monetary, T::Double, Rule::Upgrade),
	(T::Monetary, T::Numeric, Rule::RowCheck),
	(T::Numeric, T::Short, Rule::RowCheck),
	(T::Numeric, T::Integer, Rule::RowCheck),
	(T::Numeric, T::BigInt, Rule::RowCheck),
	(T::Numeric, T::Float, Rule::RowCheck),
	(T::Numeric, T::Double, Rule::RowCheck),
	(T::Numeric, T::Monetary, Rule::RowCheck),

	(T::Char, T::VarChar, Rule::Length),
	(T::VarChar, T::Char, Rule::Length),
	(T::NChar, T::VarNChar, Rule::Length),
	(T::VarNChar, T::NChar, Rule::Length),
	(T::Char, T::NChar, Rule::RowCheck),
	(T::Char, T::VarNChar, Rule::RowCheck),
	(T::VarChar, T::NChar, Rule::RowCheck),
	(T::VarChar, T::VarNChar, Rule::RowCheck),
	(T::NChar, T::Char, Rule::RowCheck),
	(T::NChar, T::VarChar, Rule::RowCheck),
	(T::VarNChar, T::Char, Rule::RowCheck),
	(T::VarNChar, T::VarChar, Rule::RowCheck),
	(T::Char, T::Clob, Rule::Upgrade),
	(T::VarChar, T::Clob, Rule::Upgrade),
	(T::NChar, T::Clob, Rule::Upgrade),
	(T::VarNChar, T::Clob, Rule::Upgrade),
	(T::Char, T::Enumeration, Rule::RowCheck),
	(T::VarChar, T::Enumeration, Rule::RowCheck),

	(T::Bit, T::VarBit, Rule::Length),
	(T::VarBit, T::Bit, Rule::Length),
	(T::Bit, T::Blob, Rule::Upgrade),
	(T::VarBit, T::Blob, Rule::Upgrade),
	(T::Bit, T::Char, Rule::RowCheck),
	(T::Bit, T::VarChar, Rule::RowCheck),
	(T::VarBit, T::Char, Rule::RowCheck),
	(T::VarBit, T::VarChar, Rule::RowCheck),

	(T::Date, T::Timestamp, Rule::Upgrade),
	(T::Date, T::TimestampTz, Rule::Upgrade),
	(T::Date, T::DateTime, Rule::Upgrade),
	(T::Date, T::DateTimeTz, Rule::Upgrade),
	(T::Timestamp, T::Date, Rule::Pseudo),
	(T::Timestamp, T::Time, Rule::Pseudo),
	(T::Timestamp, T::TimestampTz, Rule::Upgrade),
	(T::Timestamp, T::DateTime, Rule::Upgrade),
	(T::Timestamp, T::DateTimeTz, Rule::Upgrade),
	(T::TimestampTz, T::Date, Rule::Pseudo),
	(T::TimestampTz, T::Time, Rule::Pseudo),
	(T::TimestampTz, T::Timestamp, Rule::Pseudo),
	(T::TimestampTz, T::DateTime, Rule::Pseudo),
	(T::TimestampTz, T::DateTimeTz, Rule::Upgrade),
	(T::DateTime, T::Date, Rule::Pseudo),
	(T::DateTime, T::Time, Rule::Pseudo),
	(T::DateTime, T::Timestamp, Rule::RowCheck),
	(T::DateTime, T::TimestampTz, Rule::RowCheck),
	(T::DateTime, T::DateTimeTz, Rule::Upgrade),
	(T::DateTimeTz, T::Date, Rule::Pseudo),
	(T::DateTimeTz, T::Time, Rule::Pseudo),
	(T::DateTimeTz, T::Timestamp, Rule::RowCheck),
	(T::DateTimeTz, T::TimestampTz, Rule::RowCheck),
	(T::DateTimeTz, T::DateTime, Rule::Pseudo),

	(T::Enumeration, T::Short, Rule::Upgrade),
	(T::Enumeration, T::Integer, Rule::Upgrade),
	(T::Enumeration, T::BigInt, Rule::Upgrade),

	(T::Set, T::Multiset, Rule::Collection),
	(T::Set, T::Sequence, Rule::Collection),
	(T::Multiset, T::Sequence, Rule::Collection),
	(T::Multiset, T::Set, Rule::RowCheck),
	(T::Sequence, T::Set, Rule::RowCheck),
	(T::Sequence, T::Multiset, Rule::RowCheck),
];

static TABLE: Lazy<HashMap<(T, T), Rule>> = Lazy::new(|| {
	let mut table = HashMap::new();

	for ty in T::ALL {
		let rule = match ty {
			T::Numeric => Rule::Digits,
			T::Char | T::VarChar | T::NChar | T::VarNChar | T::Bit | T::VarBit => Rule::Length,
			T::Enumeration => Rule::Enumeration,
			T::Set | T::Multiset | T::Sequence => Rule::Collection,
			T::Object => Rule::Object,
			_ => Rule::Same,
		};
		table.insert((ty, ty), rule);
	}

	for (from, to, rule) in RULES {
		table.insert((*from, *to), *rule);
	}

	for from in NUMERIC.iter().chain(TEMPORAL.iter()).chain([T::Enumeration].iter()) {
		for to in CHARACTER {
			table.insert((*from, to), Rule::Width);
		}
	}

	for from in CHARACTER {
		for to in NUMERIC.iter().chain(TEMPORAL.iter()) {
			table.insert((from, *to), Rule::RowCheck);
		}
	}

	table
});

/// Classifies moving values from `old` to `new`, collation included.
pub fn classify_type_change(old: &Domain, new: &Domain, strict: bool, hierarchy: &dyn ClassHierarchy) -> TypeChange {
	if old == new {
		return TypeChange::Unchanged;
	}

	let change = classify_values(old, new, strict, hierarchy);
	if !change.is_supported() {
		return change;
	}

	match classify_collation(old, new, false) {
		CollationChange::Unchanged => change,
		CollationChange::PseudoUpgrade {
			..
		} => change.max(TypeChange::PseudoUpgrade),
		CollationChange::NotSupported => TypeChange::NotSupported,
	}
}

/// Collation part of a change. Only string domains carry a collation.
pub fn classify_collation(old: &Domain, new: &Domain, has_prefix_index: bool) -> CollationChange {
	if !old.has_collation() || !new.has_collation() || old.collation == new.collation {
		return CollationChange::Unchanged;
	}

	let from = old.collation.collation();
	let to = new.collation.collation();
	let widening = from.codeset == Codeset::Iso88591 && to.codeset == Codeset::Utf8;
	if from.codeset != to.codeset && !widening {
		return CollationChange::NotSupported;
	}

	CollationChange::PseudoUpgrade {
		index_incompatible: has_prefix_index && !to.allows_prefix_index,
	}
}

fn classify_values(old: &Domain, new: &Domain, strict: bool, hierarchy: &dyn ClassHierarchy) -> TypeChange {
	let Some(rule) = TABLE.get(&(old.ty, new.ty)) else {
		return TypeChange::NotSupported;
	};

	match rule {
		Rule::Same => TypeChange::Unchanged,
		Rule::Upgrade => TypeChange::Upgrade,
		Rule::RowCheck => TypeChange::NeedRowCheck,
		Rule::Pseudo => TypeChange::PseudoUpgrade,
		Rule::Length => {
			if new.precision >= old.precision {
				if old.ty == new.ty && new.precision > old.precision {
					TypeChange::PrecisionIncrease
				} else if old.ty == new.ty {
					TypeChange::Unchanged
				} else {
					TypeChange::Upgrade
				}
			} else if strict {
				TypeChange::NotSupportedWithConfig
			} else {
				TypeChange::NeedRowCheck
			}
		}
		Rule::Digits => {
			let (digits, scale) = match old.ty {
				T::Numeric => (old.integer_digits(), old.scale),
				ty => (ty.default_precision(), 0),
			};
			if new.integer_digits() < digits || new.scale < scale {
				TypeChange::NeedRowCheck
			} else if old.ty == T::Numeric && new.scale != scale {
				// moving the decimal point rewrites every value
				TypeChange::Upgrade
			} else if old.ty == T::Numeric && new.precision == old.precision {
				TypeChange::Unchanged
			} else {
				TypeChange::Upgrade
			}
		}
		Rule::Width => {
			let width = match old.ty {
				T::Enumeration => old.enumeration.iter().map(|label| label.chars().count() as u32).max(),
				ty => ty.printed_width(old.precision, old.scale),
			};
			match width {
				Some(width) if width <= new.precision => TypeChange::Upgrade,
				_ => TypeChange::NeedRowCheck,
			}
		}
		Rule::Enumeration => {
			if new.enumeration.starts_with(&old.enumeration) {
				TypeChange::PrecisionIncrease
			} else if old.enumeration.iter().all(|label| new.enumeration.contains(label)) {
				TypeChange::Upgrade
			} else {
				TypeChange::NeedRowCheck
			}
		}
		Rule::Collection => classify_elements(old, new, strict, hierarchy),
		Rule::Object => match (&old.class, &new.class) {
			(_, None) => TypeChange::SetOrClassCompatible,
			(Some(from), Some(to)) if from.eq_ignore_ascii_case(to) => TypeChange::Unchanged,
			(Some(from), Some(to)) if hierarchy.is_superclass(from, to) => TypeChange::SetOrClassCompatible,
			_ => TypeChange::NotSupported,
		},
	}
}

/// Every old element type must map onto some new element type.
fn classify_elements(old: &Domain, new: &Domain, strict: bool, hierarchy: &dyn ClassHierarchy) -> TypeChange {
	if new.elements.is_empty() {
		return TypeChange::SetOrClassCompatible;
	}
	if old.elements.is_empty() {
		return TypeChange::NeedRowCheck;
	}

	let worst = old
		.elements
		.iter()
		.map(|element| {
			new.elements
				.iter()
				.map(|target| classify_type_change(element, target, strict, hierarchy))
				.min()
				.unwrap_or(TypeChange::NotSupported)
		})
		.max()
		.unwrap_or(TypeChange::Unchanged);

	match worst {
		TypeChange::Unchanged | TypeChange::PrecisionIncrease | TypeChange::SetOrClassCompatible => {
			TypeChange::SetOrClassCompatible
		}
		TypeChange::Upgrade => TypeChange::Upgrade,
		_ => TypeChange::NeedRowCheck,
	}
}
