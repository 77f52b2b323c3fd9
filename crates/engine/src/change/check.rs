// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use altera_catalog::{AttributeNamespace, ClassDef, ConstraintKind};
use altera_type::{
	Diagnostic, Error, Result,
	error::diagnostic::{alter, constraint},
	return_internal_error,
};
use tracing::{debug, trace, warn};

use crate::change::{
	classify::{CollationChange, TypeChange},
	property::{Property, PropertyFlags, PropertyMap},
};

/// How much rewriting a change may do, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeMode {
	SchemaOnly,
	WithRowUpdate,
	BestEffort,
}

impl ChangeMode {
	pub const ESCALATION: [ChangeMode; 3] = [ChangeMode::SchemaOnly, ChangeMode::WithRowUpdate, ChangeMode::BestEffort];

	pub fn rewrites_rows(&self) -> bool {
		*self >= ChangeMode::WithRowUpdate
	}
}

impl Display for ChangeMode {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			ChangeMode::SchemaOnly => "schema only",
			ChangeMode::WithRowUpdate => "with row update",
			ChangeMode::BestEffort => "best effort",
		})
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRejection {
	pub diagnostic: Diagnostic,
	/// A more permissive mode may still accept the change.
	pub retry_possible: bool,
}

impl ChangeRejection {
	fn hard(diagnostic: Diagnostic) -> Self {
		Self {
			diagnostic,
			retry_possible: false,
		}
	}

	fn retry(diagnostic: Diagnostic) -> Self {
		Self {
			diagnostic,
			retry_possible: true,
		}
	}
}

impl From<ChangeRejection> for Error {
	fn from(rejection: ChangeRejection) -> Self {
		Error::new(rejection.diagnostic)
	}
}

/// Decides whether the change described by `map` is legal under `mode`.
pub fn check_change_allowed(
	map: &PropertyMap,
	class: &ClassDef,
	mode: ChangeMode,
	log_errors: bool,
) -> std::result::Result<(), ChangeRejection> {
	let result = check_hard(map, class).and_then(|_| check_mode(map, class, mode));
	if let Err(rejection) = &result {
		if log_errors {
			warn!(
				class = %class.name,
				attribute = %map.old.name,
				mode = %mode,
				code = %rejection.diagnostic.code,
				"change rejected"
			);
		}
	}
	result
}

/// Tries every mode from the cheapest up and returns the first that accepts
/// the change. Each attempt re-runs the full check.
pub fn resolve_change_mode(map: &PropertyMap, class: &ClassDef) -> Result<ChangeMode> {
	for mode in ChangeMode::ESCALATION {
		let last = mode == ChangeMode::BestEffort;
		match check_change_allowed(map, class, mode, last) {
			Ok(()) => {
				debug!(class = %class.name, attribute = %map.old.name, mode = %mode, "change mode resolved");
				return Ok(mode);
			}
			Err(rejection) if rejection.retry_possible && !last => {
				trace!(mode = %mode, code = %rejection.diagnostic.code, "escalating change mode");
			}
			Err(rejection) => {
				if !last {
					warn!(
						class = %class.name,
						attribute = %map.old.name,
						code = %rejection.diagnostic.code,
						"change rejected"
					);
				}
				return Err(rejection.into());
			}
		}
	}
	return_internal_error!("no change mode left for attribute {}", map.old.name)
}

fn check_hard(map: &PropertyMap, class: &ClassDef) -> std::result::Result<(), ChangeRejection> {
	let attribute = map.old.name.as_str();
	let old_domain = map.old.domain.to_string();
	let new_domain = map.definition.domain.to_string();

	if map.is(Property::PartitionKey, PropertyFlags::PRESENT_OLD)
		&& map.changed_properties().any(|p| p != Property::Comment)
	{
		return Err(ChangeRejection::hard(constraint::partition_key_change(attribute)));
	}

	if map.is(Property::ForeignKey, PropertyFlags::PRESENT_OLD | PropertyFlags::PRESENT_NEW)
		&& map.changed_properties().any(|p| p != Property::Comment)
	{
		let name = class
			.constraints_on(map.attribute)
			.find(|c| c.kind == ConstraintKind::ForeignKey)
			.map(|c| c.name.as_str())
			.unwrap_or_default();
		return Err(ChangeRejection::hard(constraint::foreign_key_attribute_change(attribute, name)));
	}

	if map.old_namespace() != map.new_namespace() {
		return Err(ChangeRejection::hard(constraint::namespace_change(
			attribute,
			&map.old_namespace().to_string(),
			&map.new_namespace().to_string(),
		)));
	}

	match map.type_change {
		TypeChange::NotSupported => {
			return Err(ChangeRejection::hard(alter::type_change_not_supported(
				attribute,
				&old_domain,
				&new_domain,
			)));
		}
		TypeChange::NotSupportedWithConfig => {
			return Err(ChangeRejection::hard(alter::type_change_not_supported_with_config(
				attribute,
				&old_domain,
				&new_domain,
			)));
		}
		_ => {}
	}

	match map.collation_change {
		CollationChange::NotSupported => {
			return Err(ChangeRejection::hard(alter::collation_change_not_supported(
				attribute,
				&map.old.domain.collation.to_string(),
				&map.definition.domain.collation.to_string(),
			)));
		}
		CollationChange::PseudoUpgrade {
			index_incompatible: true,
		} => {
			let name = class
				.constraints_on(map.attribute)
				.find(|c| c.has_prefix_on(map.attribute))
				.map(|c| c.name.as_str())
				.unwrap_or_default();
			return Err(ChangeRejection::hard(constraint::prefix_index_collation(
				attribute,
				name,
				&map.definition.domain.collation.to_string(),
			)));
		}
		_ => {}
	}

	if map.is(Property::NotNull, PropertyFlags::GAINED) {
		if map.definition.domain.ty.is_lob() {
			return Err(ChangeRejection::hard(constraint::not_null_on_lob(attribute)));
		}
		if map.new_namespace() == AttributeNamespace::Class {
			return Err(ChangeRejection::hard(constraint::not_null_on_class_attribute(attribute)));
		}
	}

	let gains_primary_key = map.is(Property::PrimaryKeySingle, PropertyFlags::GAINED)
		|| map.is(Property::PrimaryKeyMulti, PropertyFlags::GAINED);
	let requested_primary_keys = map.new_constraints.iter().filter(|c| c.kind == ConstraintKind::PrimaryKey).count();
	if (gains_primary_key && class.primary_key().is_some()) || requested_primary_keys > 1 {
		return Err(ChangeRejection::hard(constraint::multiple_primary_keys(&class.name)));
	}

	if class.has_subclasses() && map.changed_properties().any(|p| p != Property::Default) {
		return Err(ChangeRejection::hard(constraint::subclass_schema_frozen(&class.name, attribute)));
	}

	if map.definition.auto_increment.is_some()
		&& (!map.definition.domain.ty.is_integral() || map.new_namespace() != AttributeNamespace::Normal)
	{
		return Err(ChangeRejection::hard(alter::auto_increment_not_supported(attribute, &new_domain)));
	}

	Ok(())
}

fn check_mode(map: &PropertyMap, class: &ClassDef, mode: ChangeMode) -> std::result::Result<(), ChangeRejection> {
	if map.new_namespace() != AttributeNamespace::Normal {
		return Ok(());
	}
	let attribute = map.old.name.as_str();
	let type_diff = map.is(Property::Type, PropertyFlags::DIFF);

	match mode {
		ChangeMode::SchemaOnly => {
			if map.type_change > TypeChange::SetOrClassCompatible {
				return Err(ChangeRejection::retry(alter::change_requires_row_update(attribute)));
			}

			let kept = [
				Property::PrimaryKeySingle,
				Property::PrimaryKeyMulti,
				Property::UniqueSingle,
				Property::UniqueMulti,
				Property::Index,
			]
			.into_iter()
			.any(|p| map.is(p, PropertyFlags::PRESENT_OLD | PropertyFlags::PRESENT_NEW));
			if type_diff && kept {
				let name = class
					.constraints_on(map.attribute)
					.find(|c| c.kind != ConstraintKind::ForeignKey)
					.map(|c| c.name.as_str())
					.unwrap_or_default();
				return Err(ChangeRejection::retry(alter::index_across_type_change(attribute, name)));
			}

			if type_diff && map.is(Property::AutoIncrement, PropertyFlags::GAINED) {
				return Err(ChangeRejection::retry(alter::auto_increment_with_type_change(attribute)));
			}
		}
		ChangeMode::WithRowUpdate => {
			if matches!(map.type_change, TypeChange::NeedRowCheck | TypeChange::PseudoUpgrade) {
				return Err(ChangeRejection::retry(alter::change_requires_row_check(
					attribute,
					&map.old.domain.to_string(),
					&map.definition.domain.to_string(),
				)));
			}
		}
		ChangeMode::BestEffort => {}
	}

	Ok(())
}
