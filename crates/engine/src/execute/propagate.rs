// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use altera_catalog::{AttributeDef, ClassDef, ClassId};
use altera_transaction::{DdlTransaction, SchemaStorage};
use altera_type::Result;
use tracing::{instrument, trace};

use crate::{
	context::edit_class,
	execute::Executor,
	expression::{Renames, recompile_constraint},
};

impl Executor {
	/// Copies the root's instance attributes and constraints onto every
	/// partition sub-class, recompiling expressions against each partition.
	#[instrument(name = "ddl::propagate", level = "trace", skip(self, txn))]
	pub(crate) fn propagate_to_partitions(&self, txn: &mut dyn DdlTransaction, root: ClassId) -> Result<()> {
		let root = txn.get_class(root)?;
		let Some(info) = &root.partition else {
			return Ok(());
		};

		for partition in &info.partitions {
			edit_class(txn, partition.class, |_, template| {
				template.set_attributes(inherited_attributes(&root));

				let inherited: Vec<String> =
					template.class().constraints.iter().filter(|c| c.inherited).map(|c| c.name.clone()).collect();
				for name in inherited {
					template.drop_constraint(&name)?;
				}

				for constraint in &root.constraints {
					let mut copy = recompile_constraint(constraint, template.class(), &Renames::none())?;
					copy.inherited = true;
					template.add_constraint(copy)?;
				}
				trace!(partition = %template.name(), "partition schema refreshed");
				Ok(())
			})?;
		}
		Ok(())
	}
}

pub(crate) fn inherited_attributes(root: &ClassDef) -> Vec<AttributeDef> {
	root.instance_attributes()
		.cloned()
		.map(|mut attribute| {
			attribute.inherited_from = Some(root.id);
			attribute
		})
		.collect()
}
