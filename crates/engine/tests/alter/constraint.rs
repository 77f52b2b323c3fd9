// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use altera_catalog::{AttributeNamespace, ConstraintKind};
use altera_engine::{
	statement::{AlterClause, AttributeDefinition, ConstraintDefinition},
	test_utils::TestDatabase,
};
use altera_type::{Domain, ErrorKind, Value};

use crate::{add_constraint, change, people};

/// `parent(id PRIMARY KEY)` referenced by `child(parent_id)`.
fn parent_and_child(db: &TestDatabase) {
	db.create_class("parent", &[("id", Domain::integer())]);
	db.create_class("child", &[("id", Domain::integer()), ("parent_id", Domain::integer())]);
	db.alter_one("parent", add_constraint(ConstraintKind::PrimaryKey, &["id"])).unwrap();
	db.alter_one(
		"child",
		AlterClause::AddConstraints(vec![
			ConstraintDefinition::new(ConstraintKind::ForeignKey, &["parent_id"]).references("parent", &[]),
		]),
	)
	.unwrap();
}

#[test]
fn test_primary_key_forces_not_null() {
	let db = TestDatabase::new();
	people(&db);

	db.alter_one("people", add_constraint(ConstraintKind::PrimaryKey, &["id"])).unwrap();

	let class = db.class("people");
	assert_eq!(class.primary_key().unwrap().name, "pk_people_id");
	assert!(class.find_attribute("id").unwrap().not_null);
}

#[test]
fn test_second_primary_key_fails() {
	let db = TestDatabase::new();
	people(&db);
	db.alter_one("people", add_constraint(ConstraintKind::PrimaryKey, &["id"])).unwrap();

	let err = db.alter_one("people", add_constraint(ConstraintKind::PrimaryKey, &["name"])).unwrap_err();
	assert_eq!(err.code(), "CONSTRAINT_006");
}

#[test]
fn test_unique_on_duplicates_fails() {
	let db = TestDatabase::new();
	people(&db);
	db.insert("people", &[&[("id", Value::Integer(1)), ("name", Value::String("Alice".into()))]]);

	let err = db.alter_one("people", add_constraint(ConstraintKind::Unique, &["id"])).unwrap_err();

	assert_eq!(err.code(), "CONSTRAINT_009");
	assert!(db.class("people").constraints.is_empty());
}

#[test]
fn test_primary_key_on_nulls_fails() {
	let db = TestDatabase::new();
	people(&db);
	db.insert("people", &[&[("id", Value::Integer(4))]]);

	let err = db.alter_one("people", add_constraint(ConstraintKind::PrimaryKey, &["name"])).unwrap_err();
	assert_eq!(err.code(), "CONSTRAINT_008");
}

#[test]
fn test_multi_column_unique_allows_nulls() {
	let db = TestDatabase::new();
	people(&db);
	db.insert("people", &[&[("id", Value::Integer(4))]]);

	db.alter_one("people", add_constraint(ConstraintKind::Unique, &["name", "age"])).unwrap();

	let class = db.class("people");
	assert!(class.find_constraint("u_people_name_age").is_some());
	assert!(!class.find_attribute("name").unwrap().not_null);
}

#[test]
fn test_filtered_index_compiles() {
	let db = TestDatabase::new();
	people(&db);

	db.alter_one(
		"people",
		AlterClause::AddConstraints(vec![
			ConstraintDefinition::new(ConstraintKind::Index, &["name"]).named("adults").filter("age >= 18"),
		]),
	)
	.unwrap();

	assert!(db.class("people").find_constraint("adults").unwrap().filter.is_some());
}

fn filter_text(db: &TestDatabase, constraint: &str) -> String {
	db.class("people").find_constraint(constraint).unwrap().filter.as_ref().unwrap().text.clone()
}

fn function_text(db: &TestDatabase, constraint: &str) -> String {
	db.class("people").find_constraint(constraint).unwrap().function.as_ref().unwrap().text.clone()
}

/// Filtered index `adults` on `age >= 18` and function index `lower_name`
/// on `lower(name)`.
fn expression_indexes(db: &TestDatabase) {
	let mut lower_name = ConstraintDefinition::new(ConstraintKind::Index, &["name"]).named("lower_name");
	lower_name.function = Some("lower(name)".into());
	db.alter_one(
		"people",
		AlterClause::AddConstraints(vec![
			ConstraintDefinition::new(ConstraintKind::Index, &["name"]).named("adults").filter("age >= 18"),
			lower_name,
		]),
	)
	.unwrap();
}

#[test]
fn test_rename_attribute_recompiles_filter() {
	let db = TestDatabase::new();
	people(&db);
	expression_indexes(&db);
	assert_eq!(filter_text(&db, "adults"), "[age] >= 18");

	db.alter_one(
		"people",
		AlterClause::RenameAttribute {
			namespace: AttributeNamespace::Normal,
			from: "age".into(),
			to: "years".into(),
		},
	)
	.unwrap();

	assert_eq!(filter_text(&db, "adults"), "[years] >= 18");
	assert_eq!(function_text(&db, "lower_name"), "LOWER([name])");
}

#[test]
fn test_change_with_rename_recompiles_function_and_filter() {
	let db = TestDatabase::new();
	people(&db);
	expression_indexes(&db);

	db.alter_one("people", change("name", AttributeDefinition::new("full_name", Domain::varchar(20)))).unwrap();
	db.alter_one("people", change("age", AttributeDefinition::new("years", Domain::short()))).unwrap();

	assert_eq!(function_text(&db, "lower_name"), "LOWER([full_name])");
	assert_eq!(filter_text(&db, "adults"), "[years] >= 18");
	let class = db.class("people");
	let adults = class.find_constraint("adults").unwrap();
	assert_eq!(class.key_names(adults), vec!["full_name".to_string()]);
}

#[test]
fn test_foreign_key_needs_primary_key() {
	let db = TestDatabase::new();
	people(&db);
	db.create_class("pets", &[("owner", Domain::integer())]);

	let err = db
		.alter_one(
			"pets",
			AlterClause::AddConstraints(vec![
				ConstraintDefinition::new(ConstraintKind::ForeignKey, &["owner"]).references("people", &[]),
			]),
		)
		.unwrap_err();
	assert_eq!(err.code(), "CONSTRAINT_011");
}

#[test]
fn test_foreign_key_resolves_primary_key() {
	let db = TestDatabase::new();
	parent_and_child(&db);

	let child = db.class("child");
	let fk = child.find_constraint("fk_child_parent_id").unwrap();
	let reference = fk.foreign_key.as_ref().unwrap();
	assert_eq!(reference.class, db.class("parent").id);
	assert_eq!(reference.constraint, "pk_parent_id");
}

#[test]
fn test_drop_referenced_primary_key_fails() {
	let db = TestDatabase::new();
	parent_and_child(&db);

	let err = db
		.alter_one(
			"parent",
			AlterClause::DropConstraint {
				name: "pk_parent_id".into(),
			},
		)
		.unwrap_err();
	assert_eq!(err.code(), "CONSTRAINT_010");
	assert_eq!(err.kind(), ErrorKind::ConstraintConflict);
}

#[test]
fn test_drop_constraint() {
	let db = TestDatabase::new();
	people(&db);
	db.alter_one("people", add_constraint(ConstraintKind::Index, &["age"])).unwrap();

	db.alter_one(
		"people",
		AlterClause::DropConstraint {
			name: "i_people_age".into(),
		},
	)
	.unwrap();
	assert!(db.class("people").constraints.is_empty());

	let err = db
		.alter_one(
			"people",
			AlterClause::DropConstraint {
				name: "i_people_age".into(),
			},
		)
		.unwrap_err();
	assert_eq!(err.code(), "CA_005");
}
