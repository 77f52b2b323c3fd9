// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::ops::BitOr;

use altera_catalog::{
	AttributeDef, AttributeId, AttributeNamespace, ClassDef, ConstraintDef, ConstraintKind, DefaultValue, SerialDef,
	name::names_equal,
};
use altera_type::{Domain, Result, coerce, error::diagnostic::catalog, return_error};
use tracing::trace;

use crate::{
	change::classify::{ClassHierarchy, CollationChange, TypeChange, classify_collation, classify_type_change},
	statement::{AttributeDefinition, AttributeOrder, ConstraintDefinition},
};

/// Attribute properties a CHANGE can touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
	Name,
	NotNull,
	Default,
	OnUpdate,
	Check,
	Deferrable,
	Order,
	AutoIncrement,
	ForeignKey,
	PrimaryKeySingle,
	PrimaryKeyMulti,
	UniqueSingle,
	UniqueMulti,
	Index,
	PrefixIndex,
	Type,
	PartitionKey,
	Comment,
}

impl Property {
	pub const COUNT: usize = 18;

	pub const ALL: [Property; Property::COUNT] = [
		Property::Name,
		Property::NotNull,
		Property::Default,
		Property::OnUpdate,
		Property::Check,
		Property::Deferrable,
		Property::Order,
		Property::AutoIncrement,
		Property::ForeignKey,
		Property::PrimaryKeySingle,
		Property::PrimaryKeyMulti,
		Property::UniqueSingle,
		Property::UniqueMulti,
		Property::Index,
		Property::PrefixIndex,
		Property::Type,
		Property::PartitionKey,
		Property::Comment,
	];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PropertyFlags(u8);

impl PropertyFlags {
	pub const PRESENT_OLD: PropertyFlags = PropertyFlags(1);
	pub const PRESENT_NEW: PropertyFlags = PropertyFlags(1 << 1);
	pub const UNCHANGED: PropertyFlags = PropertyFlags(1 << 2);
	pub const GAINED: PropertyFlags = PropertyFlags(1 << 3);
	pub const LOST: PropertyFlags = PropertyFlags(1 << 4);
	pub const DIFF: PropertyFlags = PropertyFlags(1 << 5);

	/// Presence bits plus exactly one of UNCHANGED, GAINED, LOST or DIFF.
	pub fn derive(present_old: bool, present_new: bool, differs: bool) -> Self {
		let mut flags = PropertyFlags::default();
		if present_old {
			flags = flags | PropertyFlags::PRESENT_OLD;
		}
		if present_new {
			flags = flags | PropertyFlags::PRESENT_NEW;
		}

		let outcome = match (present_old, present_new) {
			(true, true) if differs => PropertyFlags::DIFF,
			(true, true) | (false, false) => PropertyFlags::UNCHANGED,
			(true, false) => PropertyFlags::LOST,
			(false, true) => PropertyFlags::GAINED,
		};
		flags | outcome
	}

	pub fn contains(&self, other: PropertyFlags) -> bool {
		self.0 & other.0 == other.0
	}

	pub fn is_unchanged(&self) -> bool {
		self.contains(PropertyFlags::UNCHANGED)
	}
}

impl BitOr for PropertyFlags {
	type Output = PropertyFlags;

	fn bitor(self, rhs: Self) -> Self::Output {
		PropertyFlags(self.0 | rhs.0)
	}
}

/// Difference between an attribute as stored and as requested by one CHANGE
/// or MODIFY clause. Built fresh for every clause.
#[derive(Debug, Clone)]
pub struct PropertyMap {
	flags: [PropertyFlags; Property::COUNT],
	pub class: String,
	pub attribute: AttributeId,
	pub old: AttributeDef,
	pub definition: AttributeDefinition,
	pub type_change: TypeChange,
	pub collation_change: CollationChange,
	/// Existing constraints to drop before the change and recreate after it.
	pub saved_constraints: Vec<ConstraintDef>,
	/// Requested constraints the class does not have yet, keyed by the new
	/// attribute name.
	pub new_constraints: Vec<ConstraintDefinition>,
}

impl PropertyMap {
	pub fn flags(&self, property: Property) -> PropertyFlags {
		self.flags[property as usize]
	}

	pub fn is(&self, property: Property, flag: PropertyFlags) -> bool {
		self.flags(property).contains(flag)
	}

	pub fn changed(&self, property: Property) -> bool {
		!self.flags(property).is_unchanged()
	}

	pub fn changed_properties(&self) -> impl Iterator<Item = Property> + '_ {
		Property::ALL.into_iter().filter(|p| self.changed(*p))
	}

	pub fn is_change_needed(&self) -> bool {
		self.changed_properties().next().is_some() || !self.new_constraints.is_empty()
	}

	pub fn is_rename(&self) -> bool {
		self.is(Property::Name, PropertyFlags::DIFF)
	}

	pub fn old_namespace(&self) -> AttributeNamespace {
		self.old.namespace
	}

	pub fn new_namespace(&self) -> AttributeNamespace {
		self.definition.namespace
	}
}

pub struct PropertyMapBuilder<'a> {
	class: &'a ClassDef,
	hierarchy: &'a dyn ClassHierarchy,
	strict: bool,
	serial: Option<&'a SerialDef>,
}

impl<'a> PropertyMapBuilder<'a> {
	pub fn new(class: &'a ClassDef, hierarchy: &'a dyn ClassHierarchy) -> Self {
		Self {
			class,
			hierarchy,
			strict: false,
			serial: None,
		}
	}

	pub fn strict(mut self, strict: bool) -> Self {
		self.strict = strict;
		self
	}

	/// Serial currently backing the attribute, if it is AUTO_INCREMENT.
	pub fn serial(mut self, serial: Option<&'a SerialDef>) -> Self {
		self.serial = serial;
		self
	}

	pub fn build(
		&self,
		definition: &AttributeDefinition,
		old_name: Option<&str>,
		constraints: &[ConstraintDefinition],
	) -> Result<PropertyMap> {
		let class = self.class;
		let lookup = old_name.unwrap_or(&definition.name);
		let Some(old) = class.find_attribute(lookup) else {
			return_error!(catalog::attribute_not_found(&class.name, lookup));
		};
		self.resolve_domain(&definition.domain)?;

		let renamed = !names_equal(&old.name, &definition.name);
		let mut flags = [PropertyFlags::default(); Property::COUNT];

		let type_change = classify_type_change(&old.domain, &definition.domain, self.strict, self.hierarchy);
		let has_prefix = class.constraints_on(old.id).any(|c| c.has_prefix_on(old.id));
		let collation_change = classify_collation(&old.domain, &definition.domain, has_prefix);
		flags[Property::Type as usize] = PropertyFlags::derive(true, true, type_change != TypeChange::Unchanged);
		flags[Property::Name as usize] = PropertyFlags::derive(true, true, renamed);

		let new_constraints: Vec<ConstraintDefinition> = constraints
			.iter()
			.cloned()
			.map(|mut constraint| {
				for key in &mut constraint.keys {
					if names_equal(&key.attribute, &old.name) {
						key.attribute = definition.name.clone();
					}
				}
				constraint
			})
			.filter(|constraint| !self.exists(constraint, old, &definition.name))
			.collect();

		let existing: Vec<&ConstraintDef> = class.constraints_on(old.id).collect();
		let key_properties = [
			(Property::PrimaryKeySingle, KeyShape::PrimaryKey, Some(true)),
			(Property::PrimaryKeyMulti, KeyShape::PrimaryKey, Some(false)),
			(Property::UniqueSingle, KeyShape::Unique, Some(true)),
			(Property::UniqueMulti, KeyShape::Unique, Some(false)),
			(Property::Index, KeyShape::Index, None),
			(Property::ForeignKey, KeyShape::ForeignKey, None),
		];
		for (property, shape, single) in key_properties {
			let present_old = existing.iter().any(|c| shape.matches(c.kind, c.is_single_column(), single));
			let present_new = present_old
				|| new_constraints.iter().any(|c| {
					c.covers(&definition.name) && shape.matches(c.kind, c.is_single_column(), single)
				});
			flags[property as usize] = PropertyFlags::derive(present_old, present_new, false);
		}

		let prefix_new = has_prefix
			|| new_constraints.iter().any(|c| {
				c.keys.iter().any(|k| names_equal(&k.attribute, &definition.name) && k.prefix_length.is_some())
			});
		flags[Property::PrefixIndex as usize] = PropertyFlags::derive(has_prefix, prefix_new, false);

		let implied_not_null = new_constraints.iter().any(|c| {
			c.covers(&definition.name)
				&& c.is_single_column()
				&& matches!(KeyShape::of(c.kind), Some(KeyShape::PrimaryKey | KeyShape::Unique))
		}) || existing.iter().any(|c| {
			c.kind == ConstraintKind::PrimaryKey || (c.kind.is_unique() && c.is_single_column())
		});
		flags[Property::NotNull as usize] =
			PropertyFlags::derive(old.not_null, definition.not_null || implied_not_null, false);

		flags[Property::Default as usize] = PropertyFlags::derive(
			old.default.is_some(),
			definition.default.is_some(),
			default_differs(&old.default, &definition.default, &definition.domain),
		);
		flags[Property::OnUpdate as usize] = PropertyFlags::derive(
			old.on_update.is_some(),
			definition.on_update.is_some(),
			old.on_update != definition.on_update,
		);
		flags[Property::Check as usize] = PropertyFlags::derive(false, definition.check.is_some(), false);
		flags[Property::Deferrable as usize] = PropertyFlags::derive(false, false, false);

		let ordered = definition.order.is_some();
		let moves = match &definition.order {
			Some(order) => self.order_moves(old, order)?,
			None => false,
		};
		flags[Property::Order as usize] = PropertyFlags::derive(ordered, ordered, moves);

		let auto_increment_differs = match (&definition.auto_increment, self.serial) {
			(Some(requested), _) if requested.start.is_some() => true,
			(Some(requested), Some(serial)) => requested.increment != serial.increment,
			_ => false,
		};
		flags[Property::AutoIncrement as usize] = PropertyFlags::derive(
			old.auto_increment.is_some(),
			definition.auto_increment.is_some(),
			auto_increment_differs,
		);

		let partition_key = class.is_partition_key(&old.name);
		flags[Property::PartitionKey as usize] = PropertyFlags::derive(partition_key, partition_key, false);

		flags[Property::Comment as usize] = PropertyFlags::derive(
			old.comment.is_some(),
			definition.comment.is_some(),
			old.comment != definition.comment,
		);

		let saved_constraints = match type_change {
			TypeChange::Unchanged => vec![],
			_ => existing.iter().filter(|c| c.kind != ConstraintKind::ForeignKey).map(|c| (*c).clone()).collect(),
		};

		trace!(
			class = %class.name,
			attribute = %old.name,
			type_change = ?type_change,
			saved = saved_constraints.len(),
			requested = new_constraints.len(),
			"property map built"
		);

		Ok(PropertyMap {
			flags,
			class: class.name.clone(),
			attribute: old.id,
			old: old.clone(),
			definition: definition.clone(),
			type_change,
			collation_change,
			saved_constraints,
			new_constraints,
		})
	}

	fn resolve_domain(&self, domain: &Domain) -> Result<()> {
		if let Some(class) = &domain.class {
			if !self.hierarchy.contains(class) {
				return_error!(catalog::class_not_found(class));
			}
		}
		for element in &domain.elements {
			self.resolve_domain(element)?;
		}
		Ok(())
	}

	/// Whether the class already holds a constraint of the same kind over the
	/// same keys, reading the renamed attribute under its new name.
	fn exists(&self, requested: &ConstraintDefinition, old: &AttributeDef, new_name: &str) -> bool {
		self.class.constraints.iter().any(|constraint| {
			if constraint.kind != requested.kind || constraint.keys.len() != requested.keys.len() {
				return false;
			}
			self.class.key_names(constraint).iter().zip(&requested.keys).all(|(name, key)| {
				let name = if names_equal(name, &old.name) {
					new_name
				} else {
					name.as_str()
				};
				names_equal(name, &key.attribute)
			})
		})
	}

	fn order_moves(&self, old: &AttributeDef, order: &AttributeOrder) -> Result<bool> {
		let peers: Vec<&AttributeDef> =
			self.class.attributes.iter().filter(|a| a.namespace == old.namespace).collect();
		let index = peers.iter().position(|a| a.id == old.id);

		match order {
			AttributeOrder::First => Ok(index != Some(0)),
			AttributeOrder::After(anchor) => {
				let Some(anchor) = self.class.find_attribute_in(anchor, old.namespace) else {
					return_error!(catalog::attribute_not_found(&self.class.name, anchor));
				};
				if anchor.id == old.id {
					return Ok(false);
				}
				let before = index.and_then(|i| i.checked_sub(1)).map(|i| peers[i].id);
				Ok(before != Some(anchor.id))
			}
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyShape {
	PrimaryKey,
	Unique,
	Index,
	ForeignKey,
}

impl KeyShape {
	fn of(kind: ConstraintKind) -> Option<KeyShape> {
		match kind {
			ConstraintKind::PrimaryKey => Some(KeyShape::PrimaryKey),
			ConstraintKind::Unique | ConstraintKind::ReverseUnique => Some(KeyShape::Unique),
			ConstraintKind::Index | ConstraintKind::ReverseIndex => Some(KeyShape::Index),
			ConstraintKind::ForeignKey => Some(KeyShape::ForeignKey),
		}
	}

	/// `single` restricts the match to one- or multi-column keys.
	fn matches(self, kind: ConstraintKind, single_column: bool, single: Option<bool>) -> bool {
		KeyShape::of(kind) == Some(self) && single.is_none_or(|single| single == single_column)
	}
}

fn default_differs(old: &Option<DefaultValue>, new: &Option<DefaultValue>, domain: &Domain) -> bool {
	match (old, new) {
		(Some(DefaultValue::Literal(old)), Some(DefaultValue::Literal(new))) => match coerce(new, domain) {
			Ok(new) => *old != new,
			Err(_) => true,
		},
		(Some(old), Some(new)) => old != new,
		_ => false,
	}
}
