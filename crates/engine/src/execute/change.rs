// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use altera_catalog::{AttributeNamespace, ClassTemplate, DefaultValue, SerialDef, auto_increment_serial_name};
use altera_transaction::{BulkStatement, DdlTransaction, QueryService, SchemaStorage, SerialService, SerialSpec};
use altera_type::{Error, Result, coerce, error::diagnostic::coerce as coerce_diag};
use tracing::{debug, instrument, warn};

use crate::{
	change::{Property, PropertyFlags, PropertyMap, PropertyMapBuilder, resolve_change_mode},
	context::{
		CHANGE_ATTRIBUTE_SAVEPOINT, SchemaEditContext, TransactionHierarchy, edit_class, lock_class,
		storage_classes,
	},
	execute::{
		ClauseOutcome, Executor,
		attribute::{attribute_position, coerce_default, rename_in_template},
		constraint::{check_duplicates, forces_not_null},
	},
	expression::{Renames, recompile_constraint},
	statement::{AttributeDefinition, ConstraintDefinition},
};

impl Executor {
	/// CHANGE and MODIFY of one attribute.
	///
	/// The clause resolves and locks the class, builds the property map and
	/// settles on the cheapest change mode that accepts it. The schema edit
	/// is committed first; constraints that depend on the stored values are
	/// dropped before rows are rewritten and recreated afterwards, and newly
	/// requested constraints come last.
	#[instrument(
		name = "ddl::change_attribute",
		level = "debug",
		skip_all,
		fields(class = %ctx.entity, attribute = %definition.name)
	)]
	pub(crate) fn change_attribute(
		&self,
		txn: &mut dyn DdlTransaction,
		ctx: &mut SchemaEditContext,
		old_name: Option<&str>,
		definition: &AttributeDefinition,
		constraints: &[ConstraintDefinition],
	) -> Result<ClauseOutcome> {
		ctx.savepoint(txn, CHANGE_ATTRIBUTE_SAVEPOINT, |txn, ctx| {
			let class = ctx.class(txn)?;
			let class = lock_class(txn, class.id)?;

			let lookup = old_name.unwrap_or(&definition.name);
			let serial = match class.find_attribute(lookup).and_then(|a| a.auto_increment) {
				Some(id) => Some(txn.get_serial(id)?),
				None => None,
			};

			let map = {
				let hierarchy = TransactionHierarchy::new(&*txn);
				PropertyMapBuilder::new(&class, &hierarchy)
					.strict(ctx.config.alter_table_change_type_strict)
					.serial(serial.as_ref())
					.build(definition, old_name, constraints)?
			};

			if !map.is_change_needed() {
				warn!(class = %class.name, attribute = %map.old.name, "attribute change has no effect");
				ctx.warn(format!("{} is unchanged", map.old.name));
				return Ok(ClauseOutcome::NoChange);
			}

			let mode = resolve_change_mode(&map, &class)?;
			debug!(mode = %mode, changed = ?map.changed_properties().collect::<Vec<_>>(), "applying change");

			if map.is(Property::Check, PropertyFlags::GAINED) {
				ctx.warn(format!("CHECK constraint on {} is not enforced", definition.name));
			}

			edit_class(txn, class.id, |txn, template| apply_attribute_edit(txn, template, &map, serial.as_ref()))?;

			if !map.saved_constraints.is_empty() {
				edit_class(txn, class.id, |_, template| {
					for constraint in &map.saved_constraints {
						debug!(constraint = %constraint.name, "dropping constraint across type change");
						template.drop_constraint(&constraint.name)?;
					}
					Ok(())
				})?;
			}
			self.propagate_to_partitions(txn, class.id)?;

			let root = txn.get_class(class.id)?;
			let mut rows = 0;

			if mode.rewrites_rows()
				&& map.is(Property::Type, PropertyFlags::DIFF)
				&& map.new_namespace() == AttributeNamespace::Normal
			{
				for target in storage_classes(txn, &root)? {
					rows += txn.run(&BulkStatement::DomainUpgrade {
						class: target.name,
						attribute: definition.name.clone(),
					})?;
				}
				debug!(rows, "rows rewritten into the new domain");
			}

			if map.is(Property::NotNull, PropertyFlags::GAINED) {
				rows += self.enforce_not_null(txn, ctx, &root, &definition.name)?;
			}

			if !map.saved_constraints.is_empty() {
				let renames = match map.is_rename() {
					true => Renames::attribute(&map.old.name, &definition.name),
					false => Renames::none(),
				};
				for constraint in &map.saved_constraints {
					if constraint.kind.is_unique() {
						check_duplicates(txn, &root, &constraint.name, &root.key_names(constraint))?;
					}
				}
				edit_class(txn, class.id, |_, template| {
					for constraint in &map.saved_constraints {
						let recreated = recompile_constraint(constraint, template.class(), &renames)?;
						template.add_constraint(recreated)?;
					}
					Ok(())
				})?;
				self.propagate_to_partitions(txn, class.id)?;
			}

			if !map.new_constraints.is_empty() {
				self.apply_constraints(txn, class.id, &map.new_constraints)?;
			}

			Ok(ClauseOutcome::Changed {
				mode,
				rows,
			})
		})
	}
}

/// Schema side of a CHANGE: everything that is decided by the definition
/// alone, done inside one template.
fn apply_attribute_edit(
	txn: &mut dyn DdlTransaction,
	template: &mut ClassTemplate,
	map: &PropertyMap,
	serial: Option<&SerialDef>,
) -> Result<()> {
	let id = map.attribute;
	let definition = &map.definition;

	if map.is_rename() {
		rename_in_template(txn, template, &map.old, &definition.name)?;
	}

	let key_forces_not_null = template.class().constraints.iter().any(|c| c.covers(id) && forces_not_null(c));
	let default = coerce_default(&definition.name, definition.default.as_ref(), &definition.domain)?;
	let class_name = template.name().to_string();
	{
		let attribute = template.attribute_mut(id)?;
		attribute.domain = definition.domain.clone();
		attribute.default = default;
		attribute.on_update = definition.on_update;
		attribute.comment = definition.comment.clone();
		if !map.is(Property::NotNull, PropertyFlags::GAINED) {
			attribute.not_null = definition.not_null || key_forces_not_null;
		}

		if !attribute.is_instance() {
			let value = match (&attribute.value, &attribute.default) {
				(Some(value), _) => Some(value.clone()),
				(None, Some(DefaultValue::Literal(value))) => Some(value.clone()),
				_ => None,
			};
			attribute.value = match value {
				Some(value) => Some(coerce(&value, &attribute.domain).map_err(|err| {
					Error::new(coerce_diag::row_coercion_failed(&class_name, &attribute.name, err.diagnostic()))
				})?),
				None => None,
			};
		}
	}

	if map.is(Property::Order, PropertyFlags::DIFF) {
		let position = attribute_position(template.class(), definition.order.as_ref(), definition.namespace)?;
		template.move_attribute(id, position)?;
	}

	let auto_increment = map.flags(Property::AutoIncrement);
	let replace = auto_increment.contains(PropertyFlags::GAINED) || auto_increment.contains(PropertyFlags::DIFF);
	if auto_increment.contains(PropertyFlags::LOST) || (replace && serial.is_some()) {
		if let Some(serial) = serial {
			debug!(serial = %serial.name, "dropping auto increment serial");
			txn.delete_serial(serial.id)?;
		}
		template.attribute_mut(id)?.auto_increment = None;
	}
	if replace {
		if let Some(requested) = &definition.auto_increment {
			let start = match (requested.start, serial) {
				(Some(start), _) => start,
				(None, Some(serial)) => serial.current,
				(None, None) => 1,
			};
			let created = create_auto_increment_serial(txn, template, &definition.name, start, requested.increment)?;
			template.attribute_mut(id)?.auto_increment = Some(created.id);
		}
	}
	Ok(())
}

fn create_auto_increment_serial(
	txn: &mut dyn DdlTransaction,
	template: &ClassTemplate,
	attribute: &str,
	start: i64,
	increment: i64,
) -> Result<SerialDef> {
	txn.create_serial(SerialSpec {
		name: auto_increment_serial_name(template.name(), attribute),
		start,
		increment,
		owner_class: Some(template.id()),
		owner_attribute: Some(attribute.to_string()),
	})
}
