// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use altera_catalog::{ConstraintKind, DefaultValue};
use altera_engine::{
	DdlConfig,
	statement::{AlterClause, AlterStatement, AttributeDefinition, AttributeRef, ConstraintDefinition},
	test_utils::TestDatabase,
};
use altera_transaction::{SchemaStorage, SerialService};
use altera_type::{Domain, ErrorKind, Value};

use crate::{add_constraint, people, range_orders};

fn default_age(value: i32) -> AlterClause {
	AlterClause::ModifyDefault(vec![(AttributeRef::new("age"), Some(DefaultValue::Literal(Value::Integer(value))))])
}

#[test]
fn test_blocked_ddl_fails_before_any_work() {
	let db = TestDatabase::with_config(DdlConfig::default().block_ddl_statement(true));
	people(&db);
	let before = db.class("people");

	let err = db.alter_one("people", default_age(18)).unwrap_err();

	assert_eq!(err.code(), "AUTH_001");
	assert_eq!(err.kind(), ErrorKind::Authorization);
	assert_eq!(db.class("people"), before);
}

#[test]
fn test_unknown_class_fails() {
	let db = TestDatabase::new();

	let err = db.alter_one("ghost", default_age(18)).unwrap_err();
	assert_eq!(err.code(), "CA_001");
	assert_eq!(err.statement.as_deref(), Some("ALTER TABLE [ghost]"));
}

#[test]
fn test_later_clause_failure_rolls_back_earlier_clauses() {
	let db = TestDatabase::new();
	people(&db);
	let before = db.class("people");

	let mut txn = db.db.begin("dba");
	let statement = AlterStatement::new(
		"people",
		vec![
			AlterClause::AddAttributes(vec![AttributeDefinition::new("email", Domain::varchar(60))]),
			add_constraint(ConstraintKind::PrimaryKey, &["missing"]),
		],
	);
	let err = db.executor.execute_alter(&mut txn, "dba", &statement).unwrap_err();

	assert_eq!(err.code(), "CA_002");
	assert_eq!(txn.find_class("people").unwrap().unwrap(), before);
	txn.commit().unwrap();
}

#[test]
fn test_clauses_see_rename_of_earlier_clause() {
	let db = TestDatabase::new();
	people(&db);

	let result = db
		.alter(AlterStatement::new(
			"people",
			vec![
				AlterClause::RenameClass {
					to: "persons".into(),
				},
				AlterClause::AddAttributes(vec![AttributeDefinition::new("email", Domain::varchar(60))]),
				add_constraint(ConstraintKind::Index, &["email"]),
			],
		))
		.unwrap();

	assert_eq!(result.class, "persons");
	assert_eq!(result.clauses.len(), 3);
	assert!(db.db.class("people").is_none());
	let class = db.class("persons");
	assert!(class.find_attribute("email").is_some());
	assert!(class.find_constraint("i_persons_email").is_some());
	assert_eq!(db.select("persons").len(), 3);
}

#[test]
fn test_rename_class_renames_serials_and_partitions() {
	let db = TestDatabase::new();
	range_orders(&db);
	db.alter_one(
		"orders",
		AlterClause::AddAttributes(vec![AttributeDefinition::new("line", Domain::integer()).auto_increment(None, 1)]),
	)
	.unwrap();

	db.alter_one(
		"orders",
		AlterClause::RenameClass {
			to: "purchases".into(),
		},
	)
	.unwrap();

	assert!(db.db.class("orders__p__p1").is_none());
	assert_eq!(db.class("purchases__p__p1").partition_of.as_ref().unwrap().name, "p1");
	let txn = db.db.begin("dba");
	assert!(txn.find_serial("purchases_ai_line").unwrap().is_some());
	assert!(txn.find_serial("orders_ai_line").unwrap().is_none());
	txn.rollback();
	assert_eq!(db.select("purchases").len(), 3);
}

#[test]
fn test_rename_class_to_existing_name_fails() {
	let db = TestDatabase::new();
	people(&db);
	db.create_class("pets", &[("name", Domain::varchar(10))]);

	let err = db
		.alter_one(
			"people",
			AlterClause::RenameClass {
				to: "pets".into(),
			},
		)
		.unwrap_err();
	assert_eq!(err.code(), "CA_004");
}

#[test]
fn test_rename_class_retargets_filter_expressions() {
	let db = TestDatabase::new();
	people(&db);
	db.alter_one(
		"people",
		AlterClause::AddConstraints(vec![
			ConstraintDefinition::new(ConstraintKind::Index, &["name"]).named("adults").filter("people.age >= 18"),
		]),
	)
	.unwrap();

	db.alter_one(
		"people",
		AlterClause::RenameClass {
			to: "persons".into(),
		},
	)
	.unwrap();

	let class = db.class("persons");
	let filter = class.find_constraint("adults").unwrap().filter.as_ref().unwrap();
	assert!(filter.text.contains("[persons]"));
	assert!(!filter.text.contains("[people]"));
}

#[test]
fn test_deadlock_victim_is_not_rolled_back_to_savepoint() {
	let db = TestDatabase::new();
	people(&db);

	let mut first = db.db.begin("alice");
	db.executor.execute_alter(&mut first, "alice", &AlterStatement::new("people", vec![default_age(18)])).unwrap();

	let mut second = db.db.begin("bob");
	let err =
		db.executor.execute_alter(&mut second, "bob", &AlterStatement::new("people", vec![default_age(21)])).unwrap_err();

	assert_eq!(err.code(), "TXN_002");
	assert!(err.is_transaction_aborted());
	assert!(second.is_aborted());
	assert_eq!(second.commit().unwrap_err().code(), "TXN_001");

	first.commit().unwrap();
	assert_eq!(
		db.class("people").find_attribute("age").unwrap().default,
		Some(DefaultValue::Literal(Value::Short(18)))
	);
}

#[test]
fn test_concurrent_alters_of_different_classes_both_commit() {
	let db = TestDatabase::new();
	people(&db);
	db.create_class("pets", &[("id", Domain::integer())]);

	let mut first = db.db.begin("dba");
	let mut second = db.db.begin("dba");
	let add = |name: &str| AlterClause::AddAttributes(vec![AttributeDefinition::new(name, Domain::varchar(60))]);

	db.executor.execute_alter(&mut second, "dba", &AlterStatement::new("pets", vec![add("owner")])).unwrap();
	assert_eq!(second.savepoint_depth(), 0);
	second.commit().unwrap();

	db.executor.execute_alter(&mut first, "dba", &AlterStatement::new("people", vec![add("email")])).unwrap();
	assert_eq!(first.savepoint_depth(), 0);
	first.commit().unwrap();

	assert!(db.class("pets").find_attribute("owner").is_some());
	assert!(db.class("people").find_attribute("email").is_some());
	assert_eq!(db.select("people").len(), 3);
}

#[test]
fn test_alter_of_stale_snapshot_fails_on_commit() {
	let db = TestDatabase::new();
	people(&db);

	let mut first = db.db.begin("dba");
	let mut second = db.db.begin("dba");
	db.executor.execute_alter(&mut second, "dba", &AlterStatement::new("people", vec![default_age(21)])).unwrap();
	second.commit().unwrap();

	db.executor.execute_alter(&mut first, "dba", &AlterStatement::new("people", vec![default_age(18)])).unwrap();
	let err = first.commit().unwrap_err();
	assert_eq!(err.code(), "TXN_005");
	assert_eq!(err.kind(), ErrorKind::TransactionAborted);
	assert_eq!(
		db.class("people").find_attribute("age").unwrap().default,
		Some(DefaultValue::Literal(Value::Short(21)))
	);
}
