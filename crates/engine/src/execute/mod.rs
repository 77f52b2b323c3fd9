// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use altera_catalog::AuthCache;
use altera_transaction::{DdlTransaction, SchemaStorage};
use altera_type::{Result, error::diagnostic::auth, return_error};
use tracing::{debug, instrument};

use crate::{
	change::ChangeMode,
	config::DdlConfig,
	context::{STATEMENT_SAVEPOINT, SchemaEditContext},
	statement::{AlterClause, AlterStatement},
};

mod attribute;
mod change;
mod class;
mod constraint;
mod partition;
mod propagate;

/// What one clause of an ALTER statement did.
#[derive(Debug, Clone, PartialEq)]
pub enum ClauseOutcome {
	Applied {
		rows: u64,
	},
	/// The clause asked for the schema the attribute already has.
	NoChange,
	Changed {
		mode: ChangeMode,
		rows: u64,
	},
	Partition(PartitionReport),
}

impl ClauseOutcome {
	pub fn rows(&self) -> u64 {
		match self {
			ClauseOutcome::Applied {
				rows,
			}
			| ClauseOutcome::Changed {
				rows,
				..
			} => *rows,
			ClauseOutcome::NoChange => 0,
			ClauseOutcome::Partition(report) => report.rows_moved,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionReport {
	/// Partitions turned into standalone classes, whether kept or folded back.
	pub promoted: Vec<String>,
	pub created: Vec<String>,
	/// Partition classes removed, either dropped or folded back into the
	/// root.
	pub dropped: Vec<String>,
	pub rows_moved: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterResult {
	/// Name of the class after the statement.
	pub class: String,
	pub clauses: Vec<ClauseOutcome>,
	pub warnings: Vec<String>,
}

impl AlterResult {
	pub fn rows_affected(&self) -> u64 {
		self.clauses.iter().map(ClauseOutcome::rows).sum()
	}
}

/// Runs ALTER statements against a DDL transaction.
pub struct Executor {
	config: DdlConfig,
	cache: Arc<AuthCache>,
}

impl Executor {
	pub fn new(config: DdlConfig, cache: Arc<AuthCache>) -> Self {
		Self {
			config,
			cache,
		}
	}

	pub fn config(&self) -> &DdlConfig {
		&self.config
	}

	/// Executes every clause in order inside one statement savepoint. The
	/// first failing clause rolls the whole statement back.
	#[instrument(name = "ddl::alter", level = "debug", skip_all, fields(class = %statement.entity_name, user = %user))]
	pub fn execute_alter(
		&self,
		txn: &mut dyn DdlTransaction,
		user: &str,
		statement: &AlterStatement,
	) -> Result<AlterResult> {
		if self.config.block_ddl_statement {
			return_error!(auth::ddl_blocked());
		}

		let mut ctx =
			SchemaEditContext::new(&self.config, &self.cache, user, statement.hints, &statement.entity_name);

		let clauses = ctx
			.savepoint(txn, STATEMENT_SAVEPOINT, |txn, ctx| {
				let mut outcomes = Vec::new();
				outcomes.try_reserve(statement.clauses.len())?;
				for clause in &statement.clauses {
					debug!(clause = clause.name(), class = %ctx.entity, "executing clause");
					outcomes.push(self.execute_clause(txn, ctx, clause)?);
				}
				Ok(outcomes)
			})
			.map_err(|err| err.with_statement(format!("ALTER TABLE [{}]", statement.entity_name)))?;

		if let Some(class) = txn.find_class(&ctx.entity)? {
			self.cache.invalidate_class(class.id);
		}

		Ok(AlterResult {
			class: ctx.entity.clone(),
			clauses,
			warnings: ctx.take_warnings(),
		})
	}

	fn execute_clause(
		&self,
		txn: &mut dyn DdlTransaction,
		ctx: &mut SchemaEditContext,
		clause: &AlterClause,
	) -> Result<ClauseOutcome> {
		match clause {
			AlterClause::AddAttributes(definitions) => self.add_attributes(txn, ctx, definitions),
			AlterClause::DropAttributes(attributes) => self.drop_attributes(txn, ctx, attributes),
			AlterClause::Change {
				old_name,
				definition,
				constraints,
			} => self.change_attribute(txn, ctx, old_name.as_deref(), definition, constraints),
			AlterClause::RenameAttribute {
				namespace,
				from,
				to,
			} => self.rename_attribute(txn, ctx, *namespace, from, to),
			AlterClause::ModifyDefault(defaults) => self.modify_defaults(txn, ctx, defaults),
			AlterClause::AddConstraints(constraints) => self.add_constraints(txn, ctx, constraints),
			AlterClause::DropConstraint {
				name,
			} => self.drop_constraint(txn, ctx, name),
			AlterClause::RenameClass {
				to,
			} => self.rename_class(txn, ctx, to),
			AlterClause::Partition(clause) => self.alter_partition(txn, ctx, clause),
		}
	}
}
