// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! End-to-end ALTER statements against the in-memory database.

use altera_catalog::ConstraintKind;
use altera_engine::{
	statement::{AlterClause, AttributeDefinition, ConstraintDefinition, PartitionClause, PartitionDefinition, PartitionScheme},
	test_utils::TestDatabase,
};
use altera_type::{Domain, Value};
use tracing_subscriber::EnvFilter;

mod attribute;
mod change;
mod constraint;
mod partition;
mod statement;

/// Routes engine traces to the test output. Filtered with `RUST_LOG`.
pub(crate) fn init_logging() {
	let _ = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_test_writer().try_init();
}

/// `people(id INTEGER, name VARCHAR(20), age SHORT)` with three rows.
pub(crate) fn people(db: &TestDatabase) {
	init_logging();
	db.create_class("people", &[("id", Domain::integer()), ("name", Domain::varchar(20)), ("age", Domain::short())]);
	db.insert(
		"people",
		&[
			&[("id", Value::Integer(1)), ("name", Value::String("Alice".into())), ("age", Value::Short(30))],
			&[("id", Value::Integer(2)), ("name", Value::String("Jonathan".into())), ("age", Value::Short(41))],
			&[("id", Value::Integer(3)), ("name", Value::String("Mia".into())), ("age", Value::Short(7))],
		],
	);
}

pub(crate) fn add_constraint(kind: ConstraintKind, attributes: &[&str]) -> AlterClause {
	AlterClause::AddConstraints(vec![ConstraintDefinition::new(kind, attributes)])
}

pub(crate) fn modify(definition: AttributeDefinition) -> AlterClause {
	AlterClause::Change {
		old_name: None,
		definition,
		constraints: vec![],
	}
}

pub(crate) fn change(old_name: &str, definition: AttributeDefinition) -> AlterClause {
	AlterClause::Change {
		old_name: Some(old_name.to_string()),
		definition,
		constraints: vec![],
	}
}

/// `orders(id INTEGER PRIMARY KEY, item VARCHAR(20))` partitioned by RANGE
/// on `id` into `p1 < 10`, `p2 < 20` and `p3 < MAXVALUE`, holding ids 5, 15
/// and 25.
pub(crate) fn range_orders(db: &TestDatabase) {
	init_logging();
	db.create_class("orders", &[("id", Domain::integer()), ("item", Domain::varchar(20))]);
	db.alter_one("orders", add_constraint(ConstraintKind::PrimaryKey, &["id"])).unwrap();
	db.alter_one(
		"orders",
		AlterClause::Partition(PartitionClause::Apply {
			key: "id".to_string(),
			scheme: PartitionScheme::Range(vec![
				PartitionDefinition::less_than("p1", Some(Value::Integer(10))),
				PartitionDefinition::less_than("p2", Some(Value::Integer(20))),
				PartitionDefinition::less_than("p3", None),
			]),
		}),
	)
	.unwrap();
	db.insert(
		"orders",
		&[
			&[("id", Value::Integer(5)), ("item", Value::String("lamp".into()))],
			&[("id", Value::Integer(15)), ("item", Value::String("desk".into()))],
			&[("id", Value::Integer(25)), ("item", Value::String("chair".into()))],
		],
	);
}

pub(crate) fn integers(values: &[i32]) -> Vec<Value> {
	values.iter().copied().map(Value::Integer).collect()
}
