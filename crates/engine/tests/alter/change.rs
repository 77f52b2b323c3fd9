// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use altera_catalog::ConstraintKind;
use altera_engine::{
	ClauseOutcome, DdlConfig,
	change::ChangeMode,
	statement::{AlterStatement, AttributeDefinition},
	test_utils::TestDatabase,
};
use altera_transaction::SchemaStorage;
use altera_type::{CollationId, Domain, ErrorKind, Value};

use crate::{add_constraint, change, modify, people, range_orders};

#[test]
fn test_short_to_integer_rewrites_rows() {
	let db = TestDatabase::new();
	people(&db);

	let result = db.alter_one("people", modify(AttributeDefinition::new("age", Domain::integer()))).unwrap();

	assert_eq!(
		result.clauses,
		vec![ClauseOutcome::Changed {
			mode: ChangeMode::WithRowUpdate,
			rows: 3
		}]
	);
	assert_eq!(db.class("people").find_attribute("age").unwrap().domain, Domain::integer());
	assert_eq!(db.column("people", "age"), vec![Value::Integer(7), Value::Integer(30), Value::Integer(41)]);
}

#[test]
fn test_widening_varchar_is_schema_only() {
	let db = TestDatabase::new();
	people(&db);

	let result = db.alter_one("people", modify(AttributeDefinition::new("name", Domain::varchar(40)))).unwrap();

	assert_eq!(
		result.clauses,
		vec![ClauseOutcome::Changed {
			mode: ChangeMode::SchemaOnly,
			rows: 0
		}]
	);
	assert_eq!(db.class("people").find_attribute("name").unwrap().domain, Domain::varchar(40));
}

#[test]
fn test_strict_narrowing_fails_and_keeps_class() {
	let db = TestDatabase::with_config(DdlConfig::default().alter_table_change_type_strict(true));
	people(&db);
	let before = db.class("people");

	let err = db.alter_one("people", change("name", AttributeDefinition::new("name", Domain::varchar(5)))).unwrap_err();

	assert_eq!(err.code(), "ALTER_002");
	assert_eq!(err.kind(), ErrorKind::DomainNotSupported);
	assert_eq!(db.class("people"), before);
	assert_eq!(db.column("people", "name").len(), 3);
}

#[test]
fn test_failed_row_rewrite_rolls_back_statement() {
	let db = TestDatabase::new();
	people(&db);
	let before = db.class("people");
	let rows = db.select("people");

	let mut txn = db.db.begin("dba");
	let statement = AlterStatement::new("people", vec![modify(AttributeDefinition::new("name", Domain::integer()))]);
	let err = db.executor.execute_alter(&mut txn, "dba", &statement).unwrap_err();

	assert_eq!(err.code(), "COERCE_004");
	assert_eq!(err.kind(), ErrorKind::RowCoercion);
	assert!(!txn.is_aborted());
	assert_eq!(txn.find_class("people").unwrap().unwrap(), before);
	assert_eq!(txn.select("people").unwrap(), rows);
	txn.commit().unwrap();

	assert_eq!(db.class("people"), before);
}

#[test]
fn test_restating_attribute_is_no_change() {
	let db = TestDatabase::new();
	people(&db);
	let before = db.class("people");
	let restated = AttributeDefinition::from_attribute(before.find_attribute("age").unwrap(), None);

	let result = db.alter_one("people", modify(restated)).unwrap();

	assert_eq!(result.clauses, vec![ClauseOutcome::NoChange]);
	assert_eq!(result.warnings.len(), 1);
	assert_eq!(db.class("people").attributes, before.attributes);
}

#[test]
fn test_rename_round_trip_restores_schema() {
	let db = TestDatabase::new();
	people(&db);
	db.alter_one("people", add_constraint(ConstraintKind::Unique, &["name"])).unwrap();
	let before = db.class("people");

	let original = AttributeDefinition::from_attribute(before.find_attribute("name").unwrap(), None);
	let mut renamed = original.clone();
	renamed.name = "full_name".to_string();

	db.alter(AlterStatement::new("people", vec![change("name", renamed), change("full_name", original)])).unwrap();

	let after = db.class("people");
	assert_eq!(after.attributes, before.attributes);
	assert_eq!(after.constraints, before.constraints);
	assert!(after.find_constraint("u_people_name").is_some());
}

#[test]
fn test_rename_keeps_constraint_name() {
	let db = TestDatabase::new();
	people(&db);
	db.alter_one("people", add_constraint(ConstraintKind::Unique, &["name"])).unwrap();
	let class = db.class("people");

	let mut renamed = AttributeDefinition::from_attribute(class.find_attribute("name").unwrap(), None);
	renamed.name = "full_name".to_string();
	db.alter_one("people", change("name", renamed)).unwrap();

	let class = db.class("people");
	let constraint = class.find_constraint("u_people_name").unwrap();
	assert_eq!(class.key_names(constraint), vec!["full_name".to_string()]);
	assert!(class.find_attribute("name").is_none());
}

#[test]
fn test_type_change_across_unique_recreates_constraint() {
	let db = TestDatabase::new();
	people(&db);
	db.alter_one("people", add_constraint(ConstraintKind::Unique, &["id"])).unwrap();

	let result =
		db.alter_one("people", modify(AttributeDefinition::new("id", Domain::bigint()).not_null())).unwrap();

	assert_eq!(result.rows_affected(), 3);
	let class = db.class("people");
	assert_eq!(class.find_attribute("id").unwrap().domain, Domain::bigint());
	let constraint = class.find_constraint("u_people_id").unwrap();
	assert_eq!(constraint.kind, ConstraintKind::Unique);
}

#[test]
fn test_partition_key_type_change_is_rejected() {
	let db = TestDatabase::new();
	range_orders(&db);

	let definition = AttributeDefinition::new("id", Domain::bigint()).not_null();
	let err = db.alter_one("orders", modify(definition)).unwrap_err();

	assert_eq!(err.code(), "CONSTRAINT_001");
	assert_eq!(err.kind(), ErrorKind::ConstraintConflict);
}

#[test]
fn test_gaining_not_null_with_nulls_fails_without_hard_default() {
	let db = TestDatabase::new();
	people(&db);
	db.insert("people", &[&[("id", Value::Integer(4))]]);

	let err = db.alter_one("people", modify(AttributeDefinition::new("name", Domain::varchar(20)).not_null())).unwrap_err();
	assert_eq!(err.code(), "CONSTRAINT_008");
	assert!(!db.class("people").find_attribute("name").unwrap().not_null);
}

#[test]
fn test_gaining_not_null_fills_hard_default() {
	let db = TestDatabase::with_config(DdlConfig::default().add_column_update_hard_default(true));
	people(&db);
	db.insert("people", &[&[("id", Value::Integer(4))]]);

	db.alter_one("people", modify(AttributeDefinition::new("age", Domain::short()).not_null())).unwrap();

	assert!(db.class("people").find_attribute("age").unwrap().not_null);
	assert_eq!(
		db.column("people", "age"),
		vec![Value::Short(0), Value::Short(7), Value::Short(30), Value::Short(41)]
	);
}

#[test]
fn test_gaining_auto_increment_creates_serial() {
	let db = TestDatabase::new();
	people(&db);

	db.alter_one("people", modify(AttributeDefinition::new("id", Domain::integer()).auto_increment(Some(100), 1)))
		.unwrap();

	assert!(db.class("people").find_attribute("id").unwrap().auto_increment.is_some());
	db.insert("people", &[&[("name", Value::String("Noah".into()))]]);
	assert!(db.column("people", "id").contains(&Value::Integer(100)));
}

#[test]
fn test_collation_only_change_rewrites_rows_best_effort() {
	let db = TestDatabase::new();
	people(&db);
	let collated = Domain::varchar(20).with_collation(CollationId::UTF8_EN_CI);

	let result = db.alter_one("people", modify(AttributeDefinition::new("name", collated.clone()))).unwrap();

	assert_eq!(
		result.clauses,
		vec![ClauseOutcome::Changed {
			mode: ChangeMode::BestEffort,
			rows: 3
		}]
	);
	let name = db.class("people").find_attribute("name").unwrap().clone();
	assert_eq!(name.domain, collated);
	assert_eq!(name.domain.collation, CollationId::UTF8_EN_CI);
	assert_eq!(db.column("people", "name").len(), 3);
}

#[test]
fn test_collation_change_across_codesets_fails() {
	let db = TestDatabase::new();
	people(&db);
	let before = db.class("people");

	let err = db
		.alter_one(
			"people",
			modify(AttributeDefinition::new("name", Domain::varchar(20).with_collation(CollationId::EUCKR_BIN))),
		)
		.unwrap_err();

	assert_eq!(err.code(), "ALTER_003");
	assert_eq!(db.class("people"), before);
}

#[test]
fn test_single_column_unique_keeps_not_null() {
	let db = TestDatabase::new();
	people(&db);
	db.alter_one("people", add_constraint(ConstraintKind::Unique, &["name"])).unwrap();
	assert!(db.class("people").find_attribute("name").unwrap().not_null);

	let result = db.alter_one("people", modify(AttributeDefinition::new("name", Domain::varchar(20)))).unwrap();
	assert_eq!(result.clauses, vec![ClauseOutcome::NoChange]);

	db.alter_one("people", modify(AttributeDefinition::new("name", Domain::varchar(30)))).unwrap();

	let class = db.class("people");
	let name = class.find_attribute("name").unwrap();
	assert_eq!(name.domain, Domain::varchar(30));
	assert!(name.not_null);
	assert_eq!(class.find_constraint("u_people_name").unwrap().kind, ConstraintKind::Unique);
}
