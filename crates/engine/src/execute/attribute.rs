// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashSet;

use altera_catalog::{
	AttributeDef, AttributeNamespace, AttributePosition, ClassDef, DefaultValue,
	auto_increment_serial_name,
	name::{name_key, names_equal},
};
use altera_transaction::{BulkStatement, DdlTransaction, QueryService, SchemaStorage, SerialService, SerialSpec};
use altera_type::{
	Domain, Result, coerce,
	error::diagnostic::{alter, catalog, coerce as coerce_diag, constraint},
	hard_default, return_error,
};
use tracing::{debug, instrument};

use crate::{
	change::ClassHierarchy,
	context::{
		ADD_ATTRIBUTE_SAVEPOINT, DEFAULT_SAVEPOINT, DROP_ATTRIBUTE_SAVEPOINT, RENAME_ATTRIBUTE_SAVEPOINT,
		SchemaEditContext, TransactionHierarchy, edit_class, lock_class, storage_classes,
	},
	execute::{ClauseOutcome, Executor},
	expression::{Renames, constraint_mentions, recompile_constraint},
	statement::{AttributeDefinition, AttributeOrder, AttributeRef},
};

impl Executor {
	#[instrument(name = "ddl::add_attributes", level = "debug", skip_all, fields(class = %ctx.entity))]
	pub(crate) fn add_attributes(
		&self,
		txn: &mut dyn DdlTransaction,
		ctx: &mut SchemaEditContext,
		definitions: &[AttributeDefinition],
	) -> Result<ClauseOutcome> {
		ctx.savepoint(txn, ADD_ATTRIBUTE_SAVEPOINT, |txn, ctx| {
			let class = ctx.class(txn)?;
			let class = lock_class(txn, class.id)?;

			let mut seen = HashSet::new();
			for definition in definitions {
				if class.find_attribute(&definition.name).is_some() || !seen.insert(name_key(&definition.name)) {
					return_error!(catalog::attribute_already_exists(&class.name, &definition.name));
				}
				if definition.auto_increment.is_some()
					&& (!definition.domain.ty.is_integral() || definition.namespace != AttributeNamespace::Normal)
				{
					return_error!(alter::auto_increment_not_supported(
						&definition.name,
						&definition.domain.to_string()
					));
				}
				resolve_domain(&TransactionHierarchy::new(&*txn), &definition.domain)?;
			}

			edit_class(txn, class.id, |txn, template| {
				for definition in definitions {
					let mut attribute = AttributeDef::new(&definition.name, definition.domain.clone());
					attribute.namespace = definition.namespace;
					attribute.default = coerce_default(&definition.name, definition.default.as_ref(), &definition.domain)?;
					attribute.on_update = definition.on_update;
					attribute.comment = definition.comment.clone();
					if !attribute.is_instance() {
						attribute.value = attribute.default_literal().cloned();
					}

					let position = attribute_position(template.class(), definition.order.as_ref(), definition.namespace)?;
					let id = template.add_attribute(attribute, position)?;

					if let Some(auto_increment) = &definition.auto_increment {
						let serial = txn.create_serial(SerialSpec {
							name: auto_increment_serial_name(template.name(), &definition.name),
							start: auto_increment.start.unwrap_or(1),
							increment: auto_increment.increment,
							owner_class: Some(template.id()),
							owner_attribute: Some(definition.name.clone()),
						})?;
						template.attribute_mut(id)?.auto_increment = Some(serial.id);
					}
				}
				Ok(())
			})?;
			self.propagate_to_partitions(txn, class.id)?;

			for definition in definitions.iter().filter(|d| d.check.is_some()) {
				ctx.warn(format!("CHECK constraint on {} is not enforced", definition.name));
			}

			let root = txn.get_class(class.id)?;
			let mut rows = 0;
			for definition in definitions.iter().filter(|d| d.namespace == AttributeNamespace::Normal) {
				let Some(attribute) = root.find_attribute_in(&definition.name, AttributeNamespace::Normal) else {
					return_error!(catalog::attribute_not_found(&root.name, &definition.name));
				};

				if let Some(default) = &attribute.default {
					let value = coerce(&default.evaluate(ctx.user), &attribute.domain).map_err(|err| {
						coerce_diag::default_coercion_failed(&definition.name, err.diagnostic())
					})?;
					for target in storage_classes(txn, &root)? {
						rows += txn.run(&BulkStatement::Fill {
							class: target.name,
							attribute: definition.name.clone(),
							value: value.clone(),
							only_nulls: false,
						})?;
					}
				} else if definition.auto_increment.is_some() {
					let serial = auto_increment_serial_name(&root.name, &definition.name);
					for target in storage_classes(txn, &root)? {
						rows += txn.run(&BulkStatement::FillSerial {
							class: target.name,
							attribute: definition.name.clone(),
							serial: serial.clone(),
						})?;
					}
				}

				if definition.not_null {
					rows += self.enforce_not_null(txn, ctx, &root, &definition.name)?;
				}
			}

			debug!(class = %root.name, added = definitions.len(), rows, "attributes added");
			Ok(ClauseOutcome::Applied {
				rows,
			})
		})
	}

	#[instrument(name = "ddl::drop_attributes", level = "debug", skip_all, fields(class = %ctx.entity))]
	pub(crate) fn drop_attributes(
		&self,
		txn: &mut dyn DdlTransaction,
		ctx: &mut SchemaEditContext,
		attributes: &[AttributeRef],
	) -> Result<ClauseOutcome> {
		ctx.savepoint(txn, DROP_ATTRIBUTE_SAVEPOINT, |txn, ctx| {
			let class = ctx.class(txn)?;
			let class = lock_class(txn, class.id)?;

			let mut dropped = Vec::with_capacity(attributes.len());
			for attribute in attributes {
				let Some(def) = class.find_attribute_in(&attribute.name, attribute.namespace) else {
					return_error!(catalog::attribute_not_found(&class.name, &attribute.name));
				};
				if class.is_partition_key(&def.name) {
					return_error!(constraint::partition_key_locked(&def.name, "DROP"));
				}
				if let Some(pk) = class.primary_key().filter(|pk| pk.covers(def.id)) {
					if let Some((referencing, _)) = txn.referencing_foreign_keys(class.id)?.first() {
						let referencing = txn.get_class(*referencing)?;
						return_error!(constraint::primary_key_referenced(&class.name, &pk.name, &referencing.name));
					}
				}
				dropped.push(def.clone());
			}

			edit_class(txn, class.id, |txn, template| {
				for attribute in &dropped {
					let constraints: Vec<String> = template
						.class()
						.constraints
						.iter()
						.filter(|c| c.covers(attribute.id) || constraint_mentions(c, &attribute.name))
						.map(|c| c.name.clone())
						.collect();
					for name in constraints {
						debug!(constraint = %name, attribute = %attribute.name, "dropping dependent constraint");
						template.drop_constraint(&name)?;
					}
					if let Some(serial) = attribute.auto_increment {
						txn.delete_serial(serial)?;
					}
					template.drop_attribute(attribute.id)?;
				}
				Ok(())
			})?;
			self.propagate_to_partitions(txn, class.id)?;

			Ok(ClauseOutcome::Applied {
				rows: 0,
			})
		})
	}

	#[instrument(name = "ddl::rename_attribute", level = "debug", skip(self, txn, ctx), fields(class = %ctx.entity))]
	pub(crate) fn rename_attribute(
		&self,
		txn: &mut dyn DdlTransaction,
		ctx: &mut SchemaEditContext,
		namespace: AttributeNamespace,
		from: &str,
		to: &str,
	) -> Result<ClauseOutcome> {
		ctx.savepoint(txn, RENAME_ATTRIBUTE_SAVEPOINT, |txn, ctx| {
			let class = ctx.class(txn)?;
			let class = lock_class(txn, class.id)?;

			let Some(attribute) = class.find_attribute_in(from, namespace) else {
				return_error!(catalog::attribute_not_found(&class.name, from));
			};
			if class.is_partition_key(&attribute.name) {
				return_error!(constraint::partition_key_locked(&attribute.name, "RENAME"));
			}
			if class.has_subclasses() {
				return_error!(constraint::subclass_schema_frozen(&class.name, &attribute.name));
			}

			let attribute = attribute.clone();
			edit_class(txn, class.id, |txn, template| {
				rename_in_template(txn, template, &attribute, to)
			})?;
			self.propagate_to_partitions(txn, class.id)?;

			Ok(ClauseOutcome::Applied {
				rows: 0,
			})
		})
	}

	#[instrument(name = "ddl::modify_defaults", level = "debug", skip_all, fields(class = %ctx.entity))]
	pub(crate) fn modify_defaults(
		&self,
		txn: &mut dyn DdlTransaction,
		ctx: &mut SchemaEditContext,
		defaults: &[(AttributeRef, Option<DefaultValue>)],
	) -> Result<ClauseOutcome> {
		ctx.savepoint(txn, DEFAULT_SAVEPOINT, |txn, ctx| {
			let class = ctx.class(txn)?;
			let class = lock_class(txn, class.id)?;

			edit_class(txn, class.id, |_, template| {
				for (attribute, default) in defaults {
					let Some(def) = template.class().find_attribute_in(&attribute.name, attribute.namespace) else {
						return_error!(catalog::attribute_not_found(template.name(), &attribute.name));
					};
					let id = def.id;
					let default = coerce_default(&def.name, default.as_ref(), &def.domain)?;
					template.attribute_mut(id)?.default = default;
				}
				Ok(())
			})?;
			self.propagate_to_partitions(txn, class.id)?;

			Ok(ClauseOutcome::Applied {
				rows: 0,
			})
		})
	}

	/// Makes sure no row of `class` or its partitions is NULL in the
	/// attribute, filling NULLs with the domain's hard default when allowed,
	/// then marks the attribute NOT NULL.
	pub(crate) fn enforce_not_null(
		&self,
		txn: &mut dyn DdlTransaction,
		ctx: &SchemaEditContext,
		class: &ClassDef,
		attribute: &str,
	) -> Result<u64> {
		let Some(def) = class.find_attribute(attribute) else {
			return_error!(catalog::attribute_not_found(&class.name, attribute));
		};
		let id = def.id;
		let targets = storage_classes(txn, class)?;

		let mut nulls = 0;
		for target in &targets {
			nulls += txn.run(&BulkStatement::CountNulls {
				class: target.name.clone(),
				attribute: attribute.to_string(),
			})?;
		}

		let mut rows = 0;
		if nulls > 0 {
			if ctx.hints.skip_update_null {
				debug!(attribute, nulls, "NULL values kept on request");
			} else if ctx.config.alter_table_change_type_strict || !ctx.config.add_column_update_hard_default {
				return_error!(constraint::null_values_present(&class.name, attribute, nulls));
			} else {
				let Some(value) = hard_default(&def.domain) else {
					return_error!(alter::no_hard_default(attribute, &def.domain.to_string()));
				};
				for target in &targets {
					rows += txn.run(&BulkStatement::Fill {
						class: target.name.clone(),
						attribute: attribute.to_string(),
						value: value.clone(),
						only_nulls: true,
					})?;
				}
				debug!(attribute, rows, value = %value, "NULL values replaced by hard default");
			}
		}

		edit_class(txn, class.id, |_, template| {
			template.attribute_mut(id)?.not_null = true;
			Ok(())
		})?;
		self.propagate_to_partitions(txn, class.id)?;
		Ok(rows)
	}
}

/// Renames the attribute, its backing serial, and every expression that
/// names it.
pub(crate) fn rename_in_template(
	txn: &mut dyn DdlTransaction,
	template: &mut altera_catalog::ClassTemplate,
	attribute: &AttributeDef,
	to: &str,
) -> Result<()> {
	if names_equal(&attribute.name, to) {
		return Ok(());
	}
	template.rename_attribute(attribute.id, to)?;

	if let Some(serial) = attribute.auto_increment {
		txn.rename_serial(serial, &auto_increment_serial_name(template.name(), to))?;
	}

	let renames = Renames::attribute(&attribute.name, to);
	let affected: Vec<_> =
		template.class().constraints.iter().filter(|c| constraint_mentions(c, &attribute.name)).cloned().collect();
	for constraint in affected {
		let recompiled = recompile_constraint(&constraint, template.class(), &renames)?;
		*template.constraint_mut(&constraint.name)? = recompiled;
	}
	Ok(())
}

pub(crate) fn coerce_default(
	attribute: &str,
	default: Option<&DefaultValue>,
	domain: &Domain,
) -> Result<Option<DefaultValue>> {
	match default {
		Some(DefaultValue::Literal(value)) => match coerce(value, domain) {
			Ok(value) => Ok(Some(DefaultValue::Literal(value))),
			Err(err) => return_error!(coerce_diag::default_coercion_failed(attribute, err.diagnostic())),
		},
		other => Ok(other.cloned()),
	}
}

pub(crate) fn attribute_position(
	class: &ClassDef,
	order: Option<&AttributeOrder>,
	namespace: AttributeNamespace,
) -> Result<AttributePosition> {
	Ok(match order {
		None => AttributePosition::Last,
		Some(AttributeOrder::First) => AttributePosition::First,
		Some(AttributeOrder::After(anchor)) => match class.find_attribute_in(anchor, namespace) {
			Some(anchor) => AttributePosition::After(anchor.id),
			None => return_error!(catalog::attribute_not_found(&class.name, anchor)),
		},
	})
}

/// Every class an OBJECT domain names must exist.
pub(crate) fn resolve_domain(hierarchy: &dyn ClassHierarchy, domain: &Domain) -> Result<()> {
	if let Some(class) = &domain.class {
		if !hierarchy.contains(class) {
			return_error!(catalog::class_not_found(class));
		}
	}
	for element in &domain.elements {
		resolve_domain(hierarchy, element)?;
	}
	Ok(())
}
