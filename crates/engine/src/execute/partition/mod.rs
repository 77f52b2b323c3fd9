// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Partition clauses run in two phases. The pre phase edits schema only:
//! inside the root's template it promotes partitions that go away, creates
//! new partition classes and rewrites the descriptor. The post phase moves
//! rows: retained rows are re-routed with a no-op key update, rows of
//! promoted partitions that fold back are copied into the root before their
//! class is dropped.

mod range;

use std::cmp::Ordering;

use altera_catalog::{
	AttributeNamespace, ClassDef, ClassId, ClassTemplate, ConstraintKind, PartitionDef, PartitionInfo, PartitionKind,
	PartitionOf, PartitionValues, name::names_equal, partition_class_name,
};
use altera_transaction::{BulkStatement, DdlTransaction, QueryService, SchemaStorage};
use altera_type::{
	Result,
	error::diagnostic::{alter, catalog, partition},
	return_error,
};
use tracing::{debug, instrument};

use crate::{
	context::{PARTITION_SAVEPOINT, SchemaEditContext, edit_class, lock_class},
	execute::{ClauseOutcome, Executor, PartitionReport, propagate::inherited_attributes},
	statement::{PartitionClause, PartitionDefinition, PartitionScheme},
};
use range::{
	adjust_partition_range, compare_bounds, hash_partition_name, partition_values, validate_lists, validate_names,
	validate_ranges,
};

/// What the pre phase decided and the post phase carries out.
#[derive(Debug, Default)]
struct Redistribution {
	/// Promoted partitions whose rows go back into the root.
	fold: Vec<ClassId>,
	/// Partition classes dropped with their rows.
	drop: Vec<ClassId>,
	/// Re-route every row of the root and its retained partitions.
	redistribute: bool,
	/// Refresh statistics of these classes.
	analyze: Vec<ClassId>,
}

/// A partition to create in the pre phase.
struct NewPartition {
	name: String,
	values: PartitionValues,
	comment: Option<String>,
}

impl Executor {
	#[instrument(
		name = "ddl::partition",
		level = "debug",
		skip(self, txn, ctx),
		fields(class = %ctx.entity, operation = clause.name())
	)]
	pub(crate) fn alter_partition(
		&self,
		txn: &mut dyn DdlTransaction,
		ctx: &mut SchemaEditContext,
		clause: &PartitionClause,
	) -> Result<ClauseOutcome> {
		ctx.savepoint(txn, PARTITION_SAVEPOINT, |txn, ctx| {
			let class = ctx.class(txn)?;
			let root = lock_class(txn, class.id)?;

			let keeps_rows_in_place = matches!(clause, PartitionClause::Add(_) | PartitionClause::Analyze(_));
			if !keeps_rows_in_place && !txn.referencing_foreign_keys(root.id)?.is_empty() {
				return_error!(partition::referenced_by_foreign_key(&root.name, clause.name()));
			}

			let max_hash = ctx.config.max_hash_partitions;
			let mut report = PartitionReport::default();
			let plan = edit_class(txn, root.id, |txn, template| {
				pre_phase(txn, template, clause, max_hash, &mut report)
			})?;
			self.propagate_to_partitions(txn, root.id)?;

			report.rows_moved = self.post_phase(txn, root.id, plan)?;
			debug!(
				promoted = report.promoted.len(),
				created = report.created.len(),
				dropped = report.dropped.len(),
				rows = report.rows_moved,
				"partition clause done"
			);
			Ok(ClauseOutcome::Partition(report))
		})
	}

	fn post_phase(&self, txn: &mut dyn DdlTransaction, root: ClassId, plan: Redistribution) -> Result<u64> {
		let class = txn.get_class(root)?;
		let mut rows = 0;

		if plan.redistribute {
			if let Some(info) = &class.partition {
				rows += txn.run(&BulkStatement::Redistribute {
					class: class.name.clone(),
					key: info.key.clone(),
				})?;
			}
		}

		for id in plan.fold {
			let promoted = txn.get_class(id)?;
			rows += txn.run(&BulkStatement::InsertSelect {
				target: class.name.clone(),
				source: promoted.name.clone(),
			})?;
			debug!(class = %promoted.name, "folded promoted partition into root");
			txn.drop_class(id)?;
		}

		for id in plan.drop {
			txn.drop_class(id)?;
		}

		for id in plan.analyze {
			txn.update_statistics(id)?;
		}
		Ok(rows)
	}
}

fn pre_phase(
	txn: &mut dyn DdlTransaction,
	template: &mut ClassTemplate,
	clause: &PartitionClause,
	max_hash: u32,
	report: &mut PartitionReport,
) -> Result<Redistribution> {
	let root = template.class().clone();
	let mut plan = Redistribution::default();

	match clause {
		PartitionClause::Apply {
			key,
			scheme,
		} => {
			if root.partition.is_some() {
				return_error!(partition::already_partitioned(&root.name));
			}
			if root.partition_of.is_some() {
				return_error!(partition::operation_not_allowed(&root.name, clause.name(), "a partition of a"));
			}
			let Some(attribute) = root.find_attribute_in(key, AttributeNamespace::Normal) else {
				return_error!(catalog::attribute_not_found(&root.name, key));
			};
			if !attribute.domain.ty.is_partitionable() {
				return_error!(alter::partition_key_domain_not_supported(
					&attribute.name,
					&attribute.domain.to_string()
				));
			}
			for constraint in root.constraints.iter().filter(|c| c.kind.is_unique()) {
				if !root.key_names(constraint).iter().any(|name| names_equal(name, key)) {
					return_error!(partition::unique_without_key(&root.name, &constraint.name, &attribute.name));
				}
			}

			let (kind, requested) = match scheme {
				PartitionScheme::Range(definitions) => {
					let requested = requested_partitions(&root, PartitionKind::Range, &attribute.domain, definitions)?;
					(PartitionKind::Range, requested)
				}
				PartitionScheme::List(definitions) => {
					let requested = requested_partitions(&root, PartitionKind::List, &attribute.domain, definitions)?;
					(PartitionKind::List, requested)
				}
				PartitionScheme::Hash(size) => {
					if *size == 0 || *size > max_hash {
						return_error!(partition::invalid_hash_size(&root.name, *size, max_hash));
					}
					(PartitionKind::Hash, hash_partitions(0, *size as usize))
				}
			};

			let mut info = PartitionInfo {
				kind,
				key: attribute.name.clone(),
				expression: None,
				partitions: Vec::new(),
			};
			create_partitions(txn, template, &mut info, requested, report)?;
			validate_descriptor(&root.name, &mut info)?;
			template.set_partition(Some(info));
			plan.redistribute = true;
		}

		PartitionClause::Add(definitions) => {
			let mut info = partition_info(&root)?;
			if info.kind == PartitionKind::Hash {
				return_error!(partition::operation_not_allowed(&root.name, clause.name(), "HASH"));
			}
			let key = key_domain(&root, &info)?;
			let requested = requested_partitions(&root, info.kind, &key, definitions)?;

			if info.kind == PartitionKind::Range {
				let current_max =
					info.partitions.iter().map(|p| p.upper_bound()).max_by(|a, b| compare_bounds(*a, *b));
				for new in &requested {
					let PartitionValues::Range {
						max,
						..
					} = &new.values
					else {
						continue;
					};
					match (current_max, max) {
						(Some(None), _) => {
							return_error!(partition::invalid_range(
								&root.name,
								&new.name,
								"a partition already holds MAXVALUE"
							));
						}
						(Some(Some(current)), Some(bound))
							if compare_bounds(Some(bound), Some(current)) != Ordering::Greater =>
						{
							return_error!(partition::invalid_range(
								&root.name,
								&new.name,
								"bound must exceed the current maximum"
							));
						}
						_ => {}
					}
				}
			}

			create_partitions(txn, template, &mut info, requested, report)?;
			validate_descriptor(&root.name, &mut info)?;
			template.set_partition(Some(info));
		}

		PartitionClause::AddHash(count) => {
			let mut info = partition_info(&root)?;
			if info.kind != PartitionKind::Hash {
				return_error!(partition::operation_not_allowed(&root.name, clause.name(), &info.kind.to_string()));
			}
			let size = info.size() as u32;
			let total = size.saturating_add(*count);
			if *count == 0 || total > max_hash {
				return_error!(partition::invalid_hash_size(&root.name, total, max_hash));
			}
			let requested = hash_partitions(size as usize, total as usize);
			create_partitions(txn, template, &mut info, requested, report)?;
			template.set_partition(Some(info));
			plan.redistribute = true;
		}

		PartitionClause::Coalesce(remaining) => {
			let mut info = partition_info(&root)?;
			if info.kind != PartitionKind::Hash {
				return_error!(partition::operation_not_allowed(&root.name, clause.name(), &info.kind.to_string()));
			}
			let size = info.size() as u32;
			if *remaining == 0 {
				return_error!(partition::cannot_remove_all(&root.name, clause.name()));
			}
			if *remaining >= size {
				return_error!(partition::invalid_hash_size(&root.name, *remaining, size.saturating_sub(1)));
			}

			let removed = info.partitions.split_off(*remaining as usize);
			for def in &removed {
				promote(txn, template, &root, def, true)?;
				report.promoted.push(def.name.clone());
				report.dropped.push(def.name.clone());
				plan.fold.push(def.class);
			}
			template.set_partition(Some(info));
			plan.redistribute = true;
		}

		PartitionClause::Reorganize {
			names,
			into,
		} => {
			let mut info = partition_info(&root)?;
			if info.kind == PartitionKind::Hash {
				return_error!(partition::operation_not_allowed(&root.name, clause.name(), "HASH"));
			}
			if into.is_empty() {
				return_error!(partition::cannot_remove_all(&root.name, clause.name()));
			}
			let removed = take_partitions(&root, &mut info, names)?;
			let key = key_domain(&root, &info)?;
			let requested = requested_partitions(&root, info.kind, &key, into)?;

			for def in &removed {
				promote(txn, template, &root, def, true)?;
				report.promoted.push(def.name.clone());
				report.dropped.push(def.name.clone());
				plan.fold.push(def.class);
			}
			create_partitions(txn, template, &mut info, requested, report)?;
			validate_descriptor(&root.name, &mut info)?;
			template.set_partition(Some(info));
			// New bounds can claim rows held by retained partitions.
			plan.redistribute = true;
		}

		PartitionClause::Remove => {
			let info = partition_info(&root)?;
			for def in &info.partitions {
				promote(txn, template, &root, def, true)?;
				report.promoted.push(def.name.clone());
				report.dropped.push(def.name.clone());
				plan.fold.push(def.class);
			}
			template.set_partition(None);
		}

		PartitionClause::Drop(names) => {
			let mut info = partition_info(&root)?;
			if info.kind == PartitionKind::Hash {
				return_error!(partition::operation_not_allowed(&root.name, clause.name(), "HASH"));
			}
			let removed = take_partitions(&root, &mut info, names)?;
			if info.partitions.is_empty() {
				return_error!(partition::cannot_remove_all(&root.name, clause.name()));
			}
			for def in &removed {
				template.remove_subclass(def.class);
				report.dropped.push(def.name.clone());
				plan.drop.push(def.class);
			}
			validate_descriptor(&root.name, &mut info)?;
			template.set_partition(Some(info));
		}

		PartitionClause::Promote(names) => {
			let mut info = partition_info(&root)?;
			if info.kind == PartitionKind::Hash {
				return_error!(partition::operation_not_allowed(&root.name, clause.name(), "HASH"));
			}
			let removed = take_partitions(&root, &mut info, names)?;
			if info.partitions.is_empty() {
				return_error!(partition::cannot_remove_all(&root.name, clause.name()));
			}
			for def in &removed {
				promote(txn, template, &root, def, false)?;
				report.promoted.push(def.name.clone());
			}
			validate_descriptor(&root.name, &mut info)?;
			template.set_partition(Some(info));
		}

		PartitionClause::Analyze(names) => {
			let info = partition_info(&root)?;
			plan.analyze.push(root.id);
			if names.is_empty() {
				plan.analyze.extend(info.classes());
			} else {
				for name in names {
					let Some(def) = info.find(name) else {
						return_error!(catalog::partition_not_found(&root.name, name));
					};
					plan.analyze.push(def.class);
				}
			}
		}
	}

	Ok(plan)
}

fn partition_info(class: &ClassDef) -> Result<PartitionInfo> {
	match &class.partition {
		Some(info) => Ok(info.clone()),
		None => return_error!(partition::not_partitioned(&class.name)),
	}
}

fn key_domain(class: &ClassDef, info: &PartitionInfo) -> Result<altera_type::Domain> {
	match class.find_attribute(&info.key) {
		Some(attribute) => Ok(attribute.domain.clone()),
		None => return_error!(catalog::attribute_not_found(&class.name, &info.key)),
	}
}

fn requested_partitions(
	class: &ClassDef,
	kind: PartitionKind,
	key: &altera_type::Domain,
	definitions: &[PartitionDefinition],
) -> Result<Vec<NewPartition>> {
	let mut requested = Vec::new();
	requested.try_reserve(definitions.len())?;
	for definition in definitions {
		requested.push(NewPartition {
			name: definition.name.clone(),
			values: partition_values(&class.name, kind, key, definition)?,
			comment: definition.comment.clone(),
		});
	}
	Ok(requested)
}

fn hash_partitions(from: usize, to: usize) -> Vec<NewPartition> {
	(from..to)
		.map(|index| NewPartition {
			name: hash_partition_name(index),
			values: PartitionValues::Hash,
			comment: None,
		})
		.collect()
}

/// Removes the named partitions from the descriptor and returns them.
fn take_partitions(class: &ClassDef, info: &mut PartitionInfo, names: &[String]) -> Result<Vec<PartitionDef>> {
	let mut removed = Vec::new();
	removed.try_reserve(names.len())?;
	for name in names {
		let Some(index) = info.partitions.iter().position(|p| names_equal(&p.name, name)) else {
			return_error!(catalog::partition_not_found(&class.name, name));
		};
		removed.push(info.partitions.remove(index));
	}
	Ok(removed)
}

/// Chains RANGE bounds and checks the final partition set.
fn validate_descriptor(class: &str, info: &mut PartitionInfo) -> Result<()> {
	validate_names(class, info.partitions.iter().map(|p| p.name.as_str()))?;
	match info.kind {
		PartitionKind::Range => {
			adjust_partition_range(&mut info.partitions);
			validate_ranges(class, &info.partitions)
		}
		PartitionKind::List => validate_lists(class, &info.partitions),
		PartitionKind::Hash => Ok(()),
	}
}

/// Creates a sub-class per requested partition and appends it to the
/// descriptor.
fn create_partitions(
	txn: &mut dyn DdlTransaction,
	template: &mut ClassTemplate,
	info: &mut PartitionInfo,
	requested: Vec<NewPartition>,
	report: &mut PartitionReport,
) -> Result<()> {
	validate_names(
		template.name(),
		info.partitions.iter().map(|p| p.name.as_str()).chain(requested.iter().map(|p| p.name.as_str())),
	)?;
	info.partitions.try_reserve(requested.len())?;

	let root = template.class().clone();
	for new in requested {
		let name = partition_class_name(&root.name, &new.name);
		let mut partition = txn.create_template(&name)?;
		partition.set_attributes(inherited_attributes(&root));
		partition.add_superclass(root.id);
		partition.set_partition_of(Some(PartitionOf {
			root: root.id,
			name: new.name.clone(),
		}));
		let id = txn.commit_template(partition)?;
		debug!(partition = %new.name, class = %name, "partition class created");

		template.add_subclass(id);
		report.created.push(new.name.clone());
		info.partitions.push(PartitionDef {
			name: new.name,
			class: id,
			values: new.values,
			comment: new.comment,
		});
	}
	Ok(())
}

/// Turns a partition into a standalone class. It keeps its rows and plain
/// indexes but gives up the unique keys, foreign keys and serials that
/// belong to the root. A class that is folded back into the root also gives
/// up its name, so a new partition may reuse it.
fn promote(
	txn: &mut dyn DdlTransaction,
	template: &mut ClassTemplate,
	root: &ClassDef,
	def: &PartitionDef,
	fold: bool,
) -> Result<()> {
	template.remove_subclass(def.class);

	edit_class(txn, def.class, |_, partition| {
		partition.set_partition_of(None);
		partition.remove_superclass(root.id);

		let stripped: Vec<String> = partition
			.class()
			.constraints
			.iter()
			.filter(|c| c.inherited && (c.kind.is_unique() || c.kind == ConstraintKind::ForeignKey))
			.map(|c| c.name.clone())
			.collect();
		for name in stripped {
			partition.drop_constraint(&name)?;
		}

		let mut attributes = partition.class().attributes.clone();
		for attribute in &mut attributes {
			attribute.inherited_from = None;
			attribute.auto_increment = None;
		}
		partition.set_attributes(attributes);

		let kept: Vec<String> = partition.class().constraints.iter().map(|c| c.name.clone()).collect();
		for name in kept {
			partition.constraint_mut(&name)?.inherited = false;
		}

		if fold {
			let scratch = format!("{}__{}", partition.name(), partition.id());
			partition.rename(scratch);
		}
		debug!(partition = %def.name, class = %partition.name(), "partition promoted");
		Ok(())
	})
}
