// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use altera_catalog::{auto_increment_serial_name, partition_class_name};
use altera_transaction::{DdlTransaction, SchemaStorage, SerialService};
use altera_type::{Result, error::diagnostic::catalog, return_error};
use tracing::{debug, instrument};

use crate::{
	context::{RENAME_CLASS_SAVEPOINT, SchemaEditContext, edit_class, lock_class},
	execute::{ClauseOutcome, Executor},
	expression::{Renames, recompile_constraint},
};

impl Executor {
	/// Renames the class together with its partition sub-classes and
	/// serials. Later clauses of the statement resolve the new name.
	#[instrument(name = "ddl::rename_class", level = "debug", skip(self, txn, ctx), fields(class = %ctx.entity))]
	pub(crate) fn rename_class(
		&self,
		txn: &mut dyn DdlTransaction,
		ctx: &mut SchemaEditContext,
		to: &str,
	) -> Result<ClauseOutcome> {
		ctx.savepoint(txn, RENAME_CLASS_SAVEPOINT, |txn, ctx| {
			let class = ctx.class(txn)?;
			let class = lock_class(txn, class.id)?;

			if let Some(existing) = txn.find_class(to)? {
				if existing.id != class.id {
					return_error!(catalog::class_already_exists(to));
				}
			}

			edit_class(txn, class.id, |txn, template| {
				template.rename(to);

				for attribute in template.class().attributes.clone() {
					if let Some(serial) = attribute.auto_increment {
						txn.rename_serial(serial, &auto_increment_serial_name(to, &attribute.name))?;
					}
				}

				let expressions: Vec<_> =
					template.class().constraints.iter().filter(|c| c.has_expression()).cloned().collect();
				for constraint in expressions {
					let recompiled = recompile_constraint(&constraint, template.class(), &Renames::none())?;
					*template.constraint_mut(&constraint.name)? = recompiled;
				}
				Ok(())
			})?;

			if let Some(info) = &class.partition {
				for partition in &info.partitions {
					let name = partition_class_name(to, &partition.name);
					debug!(partition = %partition.name, class = %name, "renaming partition class");
					edit_class(txn, partition.class, |_, template| {
						template.rename(name);
						Ok(())
					})?;
				}
			}
			self.propagate_to_partitions(txn, class.id)?;

			debug!(from = %class.name, to, "class renamed");
			ctx.entity = to.to_string();
			Ok(ClauseOutcome::Applied {
				rows: 0,
			})
		})
	}
}
