// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use altera_catalog::{AttributeNamespace, ConstraintKind, DefaultValue};
use altera_engine::{
	DdlConfig,
	statement::{AlterClause, AlterHints, AlterStatement, AttributeDefinition, AttributeOrder, AttributeRef},
	test_utils::TestDatabase,
};
use altera_transaction::SerialService;
use altera_type::{Domain, ErrorKind, Value};

use crate::{add_constraint, integers, people, range_orders};

fn add(definition: AttributeDefinition) -> AlterClause {
	AlterClause::AddAttributes(vec![definition])
}

#[test]
fn test_add_not_null_fills_hard_default() {
	let db = TestDatabase::with_config(DdlConfig::default().add_column_update_hard_default(true));
	people(&db);

	let result = db.alter_one("people", add(AttributeDefinition::new("score", Domain::integer()).not_null())).unwrap();

	assert_eq!(result.rows_affected(), 3);
	assert!(db.class("people").find_attribute("score").unwrap().not_null);
	assert_eq!(db.column("people", "score"), integers(&[0, 0, 0]));
}

#[test]
fn test_add_not_null_without_hard_default_fails() {
	let db = TestDatabase::new();
	people(&db);

	let err = db.alter_one("people", add(AttributeDefinition::new("score", Domain::integer()).not_null())).unwrap_err();

	assert_eq!(err.code(), "CONSTRAINT_008");
	assert_eq!(err.kind(), ErrorKind::ConstraintConflict);
	assert!(db.class("people").find_attribute("score").is_none());
}

#[test]
fn test_add_not_null_strict_mode_refuses_fill() {
	let config = DdlConfig::default().add_column_update_hard_default(true).alter_table_change_type_strict(true);
	let db = TestDatabase::with_config(config);
	people(&db);

	let err = db.alter_one("people", add(AttributeDefinition::new("score", Domain::integer()).not_null())).unwrap_err();
	assert_eq!(err.code(), "CONSTRAINT_008");
}

#[test]
fn test_add_not_null_skip_update_null_hint() {
	let db = TestDatabase::new();
	people(&db);

	let statement = AlterStatement::new("people", vec![add(AttributeDefinition::new("score", Domain::integer()).not_null())])
		.with_hints(AlterHints {
			skip_update_null: true,
		});
	db.alter(statement).unwrap();

	assert!(db.class("people").find_attribute("score").unwrap().not_null);
	assert_eq!(db.column("people", "score"), vec![Value::Null, Value::Null, Value::Null]);
}

#[test]
fn test_add_with_default_fills_rows() {
	let db = TestDatabase::new();
	people(&db);

	db.alter_one("people", add(AttributeDefinition::new("country", Domain::varchar(2)).default_value(Value::String("NL".into()))))
		.unwrap();

	let nl = Value::String("NL".into());
	assert_eq!(db.column("people", "country"), vec![nl.clone(), nl.clone(), nl]);
}

#[test]
fn test_add_default_that_does_not_fit_fails() {
	let db = TestDatabase::new();
	people(&db);

	let definition = AttributeDefinition::new("country", Domain::varchar(2)).default_value(Value::String("NLD".into()));
	let err = db.alter_one("people", add(definition)).unwrap_err();

	assert_eq!(err.code(), "COERCE_005");
	assert_eq!(err.kind(), ErrorKind::RowCoercion);
}

#[test]
fn test_add_auto_increment_numbers_existing_rows() {
	let db = TestDatabase::new();
	people(&db);

	db.alter_one("people", add(AttributeDefinition::new("seq", Domain::integer()).auto_increment(None, 1))).unwrap();

	assert_eq!(db.column("people", "seq"), integers(&[1, 2, 3]));
	let txn = db.db.begin("dba");
	assert!(txn.find_serial("people_ai_seq").unwrap().is_some());
	txn.rollback();
}

#[test]
fn test_add_auto_increment_on_string_is_rejected() {
	let db = TestDatabase::new();
	people(&db);

	let err = db
		.alter_one("people", add(AttributeDefinition::new("code", Domain::varchar(8)).auto_increment(None, 1)))
		.unwrap_err();
	assert_eq!(err.code(), "ALTER_004");
}

#[test]
fn test_add_existing_attribute_fails() {
	let db = TestDatabase::new();
	people(&db);

	let err = db.alter_one("people", add(AttributeDefinition::new("NAME", Domain::varchar(4)))).unwrap_err();
	assert_eq!(err.code(), "CA_003");
}

#[test]
fn test_add_first_and_after() {
	let db = TestDatabase::new();
	people(&db);

	db.alter(AlterStatement::new(
		"people",
		vec![AlterClause::AddAttributes(vec![
			AttributeDefinition::new("uuid", Domain::char(36)).order(AttributeOrder::First),
			AttributeDefinition::new("email", Domain::varchar(60)).order(AttributeOrder::After("name".into())),
		])],
	))
	.unwrap();

	let class = db.class("people");
	let names: Vec<&str> = class.instance_attributes().map(|a| a.name.as_str()).collect();
	assert_eq!(names, vec!["uuid", "id", "name", "email", "age"]);
}

#[test]
fn test_add_propagates_to_partitions() {
	let db = TestDatabase::new();
	range_orders(&db);

	db.alter_one("orders", add(AttributeDefinition::new("qty", Domain::integer()).default_value(Value::Integer(1))))
		.unwrap();

	assert!(db.class("orders__p__p2").find_attribute("qty").is_some());
	assert_eq!(db.column("orders", "qty"), integers(&[1, 1, 1]));
}

#[test]
fn test_drop_removes_covering_constraints() {
	let db = TestDatabase::new();
	people(&db);
	db.alter_one("people", add_constraint(ConstraintKind::Unique, &["name"])).unwrap();

	db.alter_one("people", AlterClause::DropAttributes(vec![AttributeRef::new("name")])).unwrap();

	let class = db.class("people");
	assert!(class.find_attribute("name").is_none());
	assert!(class.find_constraint("u_people_name").is_none());
	assert!(!db.select("people")[0].contains_key("name"));
}

#[test]
fn test_drop_partition_key_fails() {
	let db = TestDatabase::new();
	range_orders(&db);

	let err = db.alter_one("orders", AlterClause::DropAttributes(vec![AttributeRef::new("id")])).unwrap_err();
	assert_eq!(err.code(), "CONSTRAINT_013");
}

#[test]
fn test_drop_unknown_attribute_fails() {
	let db = TestDatabase::new();
	people(&db);

	let err = db.alter_one("people", AlterClause::DropAttributes(vec![AttributeRef::new("missing")])).unwrap_err();
	assert_eq!(err.code(), "CA_002");
	assert_eq!(err.kind(), ErrorKind::Resolution);
}

#[test]
fn test_rename_attribute() {
	let db = TestDatabase::new();
	people(&db);

	db.alter_one(
		"people",
		AlterClause::RenameAttribute {
			namespace: AttributeNamespace::Normal,
			from: "age".into(),
			to: "years".into(),
		},
	)
	.unwrap();

	let class = db.class("people");
	assert!(class.find_attribute("age").is_none());
	assert_eq!(class.find_attribute("years").unwrap().domain, Domain::short());
}

fn rename(from: &str, to: &str) -> AlterClause {
	AlterClause::RenameAttribute {
		namespace: AttributeNamespace::Normal,
		from: from.into(),
		to: to.into(),
	}
}

#[test]
fn test_rename_to_same_name_in_other_case_is_noop() {
	let db = TestDatabase::new();
	people(&db);
	let before = db.class("people");

	db.alter_one("people", rename("age", "AGE")).unwrap();

	let class = db.class("people");
	assert_eq!(class.find_attribute("age").unwrap().name, "age");
	assert_eq!(class.attributes, before.attributes);
}

#[test]
fn test_rename_onto_other_attribute_in_other_case_fails() {
	let db = TestDatabase::new();
	people(&db);

	let err = db.alter_one("people", rename("age", "NAME")).unwrap_err();
	assert_eq!(err.code(), "CA_003");
	assert_eq!(db.class("people").find_attribute("age").unwrap().domain, Domain::short());
}

#[test]
fn test_rename_partition_key_fails() {
	let db = TestDatabase::new();
	range_orders(&db);

	let err = db
		.alter_one(
			"orders",
			AlterClause::RenameAttribute {
				namespace: AttributeNamespace::Normal,
				from: "id".into(),
				to: "order_id".into(),
			},
		)
		.unwrap_err();
	assert_eq!(err.code(), "CONSTRAINT_013");
}

#[test]
fn test_modify_default() {
	let db = TestDatabase::new();
	people(&db);

	db.alter_one(
		"people",
		AlterClause::ModifyDefault(vec![(AttributeRef::new("age"), Some(DefaultValue::Literal(Value::Integer(18))))]),
	)
	.unwrap();

	assert_eq!(
		db.class("people").find_attribute("age").unwrap().default,
		Some(DefaultValue::Literal(Value::Short(18)))
	);
	db.insert("people", &[&[("id", Value::Integer(4))]]);
	assert!(db.column("people", "age").contains(&Value::Short(18)));
}
