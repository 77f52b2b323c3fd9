// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use altera_catalog::{
	AttributeDef, ClassDef, ClassId, ConstraintDef, ConstraintKind, ForeignKeyRef, IndexKey, name::names_equal,
};
use altera_transaction::{BulkStatement, DdlTransaction, QueryService, SchemaStorage};
use altera_type::{
	Result,
	error::diagnostic::{catalog, constraint, partition},
	return_error, return_internal_error,
};
use tracing::{debug, instrument};

use crate::{
	context::{CONSTRAINT_SAVEPOINT, SchemaEditContext, edit_class, lock_class, resolve_class, storage_classes},
	execute::{ClauseOutcome, Executor},
	expression::compile,
	statement::{ConstraintDefinition, ForeignKeyDefinition},
};

impl Executor {
	#[instrument(name = "ddl::add_constraints", level = "debug", skip_all, fields(class = %ctx.entity))]
	pub(crate) fn add_constraints(
		&self,
		txn: &mut dyn DdlTransaction,
		ctx: &mut SchemaEditContext,
		definitions: &[ConstraintDefinition],
	) -> Result<ClauseOutcome> {
		ctx.savepoint(txn, CONSTRAINT_SAVEPOINT, |txn, ctx| {
			let class = ctx.class(txn)?;
			self.apply_constraints(txn, class.id, definitions)?;
			Ok(ClauseOutcome::Applied {
				rows: 0,
			})
		})
	}

	#[instrument(name = "ddl::drop_constraint", level = "debug", skip(self, txn, ctx), fields(class = %ctx.entity))]
	pub(crate) fn drop_constraint(
		&self,
		txn: &mut dyn DdlTransaction,
		ctx: &mut SchemaEditContext,
		name: &str,
	) -> Result<ClauseOutcome> {
		ctx.savepoint(txn, CONSTRAINT_SAVEPOINT, |txn, ctx| {
			let class = ctx.class(txn)?;
			let class = lock_class(txn, class.id)?;

			let Some(existing) = class.find_constraint(name) else {
				return_error!(catalog::constraint_not_found(&class.name, name));
			};
			if existing.kind == ConstraintKind::PrimaryKey {
				if let Some((referencing, _)) = txn.referencing_foreign_keys(class.id)?.first() {
					let referencing = txn.get_class(*referencing)?;
					return_error!(constraint::primary_key_referenced(&class.name, &existing.name, &referencing.name));
				}
			}

			edit_class(txn, class.id, |_, template| {
				template.drop_constraint(name)?;
				Ok(())
			})?;
			self.propagate_to_partitions(txn, class.id)?;

			Ok(ClauseOutcome::Applied {
				rows: 0,
			})
		})
	}

	/// Validates the definitions against the class and its rows, then adds
	/// them in one template.
	pub(crate) fn apply_constraints(
		&self,
		txn: &mut dyn DdlTransaction,
		class: ClassId,
		definitions: &[ConstraintDefinition],
	) -> Result<()> {
		let root = lock_class(txn, class)?;

		let mut built: Vec<ConstraintDef> = Vec::new();
		built.try_reserve(definitions.len())?;
		for definition in definitions {
			let constraint = build_constraint(&*txn, &root, definition)?;
			if built.iter().any(|c| names_equal(&c.name, &constraint.name)) {
				return_error!(catalog::constraint_already_exists(&root.name, &constraint.name));
			}
			if constraint.kind == ConstraintKind::PrimaryKey
				&& (root.primary_key().is_some() || built.iter().any(|c| c.kind == ConstraintKind::PrimaryKey))
			{
				return_error!(constraint::multiple_primary_keys(&root.name));
			}

			let keys = root.key_names(&constraint);
			if constraint.kind.is_unique() {
				check_duplicates(txn, &root, &constraint.name, &keys)?;
			}
			if forces_not_null(&constraint) {
				for key in &keys {
					check_no_nulls(txn, &root, key)?;
				}
			}
			debug!(constraint = %constraint.name, kind = %constraint.kind, "constraint validated");
			built.push(constraint);
		}

		edit_class(txn, root.id, |_, template| {
			for constraint in built {
				if forces_not_null(&constraint) {
					for id in constraint.attributes().collect::<Vec<_>>() {
						template.attribute_mut(id)?.not_null = true;
					}
				}
				template.add_constraint(constraint)?;
			}
			Ok(())
		})?;
		self.propagate_to_partitions(txn, root.id)
	}
}

/// Keys of a PRIMARY KEY, and the single key of a one column UNIQUE, are
/// NOT NULL.
pub(crate) fn forces_not_null(constraint: &ConstraintDef) -> bool {
	constraint.kind == ConstraintKind::PrimaryKey || (constraint.kind.is_unique() && constraint.is_single_column())
}

pub(crate) fn default_constraint_name(kind: ConstraintKind, class: &str, attributes: &[&str]) -> String {
	format!("{}_{}_{}", kind.name_prefix(), class, attributes.join("_"))
}

fn build_constraint(
	txn: &dyn DdlTransaction,
	class: &ClassDef,
	definition: &ConstraintDefinition,
) -> Result<ConstraintDef> {
	let provisional = definition.name.as_deref().unwrap_or("<unnamed>");
	if definition.keys.is_empty() {
		return_error!(constraint::empty_constraint(provisional));
	}

	let mut attributes: Vec<&AttributeDef> = Vec::with_capacity(definition.keys.len());
	for key in &definition.keys {
		let Some(attribute) = class.find_attribute(&key.attribute) else {
			return_error!(catalog::attribute_not_found(&class.name, &key.attribute));
		};
		attributes.push(attribute);
	}

	let name = match &definition.name {
		Some(name) => name.clone(),
		None => {
			let names: Vec<&str> = attributes.iter().map(|a| a.name.as_str()).collect();
			default_constraint_name(definition.kind, &class.name, &names)
		}
	};

	if let Some(attribute) = attributes.iter().find(|a| !a.is_instance()) {
		return_error!(constraint::class_attribute_in_key(&attribute.name, &name));
	}
	if class.find_constraint(&name).is_some() {
		return_error!(catalog::constraint_already_exists(&class.name, &name));
	}
	if let Some(info) = &class.partition {
		if definition.kind.is_unique() && !attributes.iter().any(|a| info.is_key(&a.name)) {
			return_error!(partition::unique_without_key(&class.name, &name, &info.key));
		}
	}

	let keys = attributes
		.iter()
		.zip(&definition.keys)
		.map(|(attribute, key)| IndexKey {
			attribute: attribute.id,
			descending: key.descending,
			prefix_length: key.prefix_length,
		})
		.collect();

	let mut constraint = ConstraintDef::new(&name, definition.kind, keys);
	constraint.filter = definition.filter.as_deref().map(|text| compile(text, class)).transpose()?;
	constraint.function = definition.function.as_deref().map(|text| compile(text, class)).transpose()?;
	constraint.comment = definition.comment.clone();

	if definition.kind == ConstraintKind::ForeignKey {
		let Some(reference) = &definition.foreign_key else {
			return_internal_error!("foreign key {} has no referenced class", name);
		};
		constraint.foreign_key = Some(resolve_foreign_key(txn, class, &name, &attributes, reference)?);
	}
	Ok(constraint)
}

/// A foreign key references the primary key of its target, column for
/// column.
fn resolve_foreign_key(
	txn: &dyn DdlTransaction,
	class: &ClassDef,
	name: &str,
	attributes: &[&AttributeDef],
	reference: &ForeignKeyDefinition,
) -> Result<ForeignKeyRef> {
	let target = match names_equal(&reference.class, &class.name) {
		true => class.clone(),
		false => resolve_class(txn, &reference.class)?,
	};

	let Some(pk) = target.primary_key() else {
		return_error!(constraint::foreign_key_target_invalid(name, &target.name, "referenced class has no primary key"));
	};
	let pk_names = target.key_names(pk);

	if !reference.attributes.is_empty()
		&& (reference.attributes.len() != pk_names.len()
			|| reference.attributes.iter().zip(&pk_names).any(|(a, b)| !names_equal(a, b)))
	{
		return_error!(constraint::foreign_key_target_invalid(
			name,
			&target.name,
			"referenced attributes are not the primary key"
		));
	}
	if attributes.len() != pk.keys.len() {
		return_error!(constraint::foreign_key_target_invalid(name, &target.name, "key arity differs"));
	}
	for (attribute, key) in attributes.iter().zip(&pk.keys) {
		let referenced = target.attribute(key.attribute).map(|a| a.domain.ty);
		if referenced != Some(attribute.domain.ty) {
			return_error!(constraint::foreign_key_target_invalid(name, &target.name, "key types differ"));
		}
	}

	Ok(ForeignKeyRef {
		class: target.id,
		attributes: pk.attributes().collect(),
		constraint: pk.name.clone(),
		on_delete: reference.on_delete,
		on_update: reference.on_update,
	})
}

pub(crate) fn check_duplicates(
	txn: &mut dyn DdlTransaction,
	class: &ClassDef,
	constraint: &str,
	keys: &[String],
) -> Result<()> {
	let mut duplicates = 0;
	for target in storage_classes(txn, class)? {
		duplicates += txn.run(&BulkStatement::CountDuplicates {
			class: target.name,
			attributes: keys.to_vec(),
		})?;
	}
	if duplicates > 0 {
		return_error!(constraint::duplicate_values(&class.name, constraint, duplicates));
	}
	Ok(())
}

fn check_no_nulls(txn: &mut dyn DdlTransaction, class: &ClassDef, attribute: &str) -> Result<()> {
	let mut nulls = 0;
	for target in storage_classes(txn, class)? {
		nulls += txn.run(&BulkStatement::CountNulls {
			class: target.name,
			attribute: attribute.to_string(),
		})?;
	}
	if nulls > 0 {
		return_error!(constraint::null_values_present(&class.name, attribute, nulls));
	}
	Ok(())
}
