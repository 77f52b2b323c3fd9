// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use altera_catalog::{ConstraintKind, PartitionKind, PartitionValues};
use altera_engine::{
	ClauseOutcome, DdlConfig, PartitionReport,
	statement::{AlterClause, AttributeDefinition, ConstraintDefinition, PartitionClause, PartitionDefinition, PartitionScheme},
	test_utils::TestDatabase,
};
use altera_type::{Domain, ErrorKind, Value};

use crate::{add_constraint, init_logging, integers, range_orders};

fn partition(db: &TestDatabase, class: &str, clause: PartitionClause) -> PartitionReport {
	let result = db.alter_one(class, AlterClause::Partition(clause)).unwrap();
	match result.clauses.into_iter().next() {
		Some(ClauseOutcome::Partition(report)) => report,
		other => panic!("unexpected outcome {:?}", other),
	}
}

fn partition_err(db: &TestDatabase, class: &str, clause: PartitionClause) -> altera_type::Error {
	db.alter_one(class, AlterClause::Partition(clause)).unwrap_err()
}

fn partition_names(db: &TestDatabase, class: &str) -> Vec<String> {
	db.class(class).partition.unwrap().partitions.into_iter().map(|p| p.name).collect()
}

/// `events(id AUTO_INCREMENT PRIMARY KEY, kind VARCHAR(10))` hashed into
/// three partitions and holding nine rows.
fn hashed_events(db: &TestDatabase) {
	init_logging();
	db.create_class("events", &[("kind", Domain::varchar(10))]);
	db.alter_one(
		"events",
		AlterClause::AddAttributes(vec![AttributeDefinition::new("id", Domain::integer()).auto_increment(None, 1)]),
	)
	.unwrap();
	db.alter_one("events", add_constraint(ConstraintKind::PrimaryKey, &["id"])).unwrap();
	partition(
		db,
		"events",
		PartitionClause::Apply {
			key: "id".into(),
			scheme: PartitionScheme::Hash(3),
		},
	);
	for _ in 0..9 {
		db.insert("events", &[&[("kind", Value::String("click".into()))]]);
	}
}

#[test]
fn test_apply_range_routes_existing_rows() {
	let db = TestDatabase::new();
	range_orders(&db);

	let info = db.class("orders").partition.unwrap();
	assert_eq!(info.kind, PartitionKind::Range);
	assert_eq!(info.key, "id");
	assert_eq!(partition_names(&db, "orders"), vec!["p1", "p2", "p3"]);
	assert_eq!(
		info.partitions[1].values,
		PartitionValues::Range {
			min: Some(Value::Integer(10)),
			max: Some(Value::Integer(20))
		}
	);

	assert_eq!(db.rows_in("orders"), 0);
	assert_eq!(db.rows_in("orders__p__p1"), 1);
	assert_eq!(db.rows_in("orders__p__p2"), 1);
	assert_eq!(db.rows_in("orders__p__p3"), 1);

	let p2 = db.class("orders__p__p2");
	assert!(p2.primary_key().unwrap().inherited);
	assert_eq!(p2.find_attribute("id").unwrap().inherited_from, Some(db.class("orders").id));
}

#[test]
fn test_apply_moves_rows_out_of_root() {
	let db = TestDatabase::new();
	db.create_class("logs", &[("day", Domain::integer())]);
	db.insert("logs", &[&[("day", Value::Integer(1))], &[("day", Value::Integer(2))], &[("day", Value::Integer(3))]]);

	let report = partition(
		&db,
		"logs",
		PartitionClause::Apply {
			key: "day".into(),
			scheme: PartitionScheme::List(vec![
				PartitionDefinition::values_in("odd", vec![Value::Integer(1), Value::Integer(3)]),
				PartitionDefinition::values_in("even", vec![Value::Integer(2)]),
			]),
		},
	);

	assert_eq!(report.created, vec!["odd", "even"]);
	assert_eq!(report.rows_moved, 3);
	assert_eq!(db.rows_in("logs"), 0);
	assert_eq!(db.rows_in("logs__p__odd"), 2);
	assert_eq!(db.rows_in("logs__p__even"), 1);
}

#[test]
fn test_apply_twice_fails() {
	let db = TestDatabase::new();
	range_orders(&db);

	let err = partition_err(
		&db,
		"orders",
		PartitionClause::Apply {
			key: "id".into(),
			scheme: PartitionScheme::Hash(2),
		},
	);
	assert_eq!(err.code(), "PARTITION_003");
}

#[test]
fn test_apply_rejects_lob_key() {
	let db = TestDatabase::new();
	db.create_class("docs", &[("body", Domain::clob())]);

	let err = partition_err(
		&db,
		"docs",
		PartitionClause::Apply {
			key: "body".into(),
			scheme: PartitionScheme::Hash(2),
		},
	);
	assert_eq!(err.code(), "ALTER_005");
}

#[test]
fn test_apply_requires_key_in_unique() {
	let db = TestDatabase::new();
	db.create_class("users", &[("id", Domain::integer()), ("region", Domain::integer())]);
	db.alter_one("users", add_constraint(ConstraintKind::PrimaryKey, &["id"])).unwrap();

	let err = partition_err(
		&db,
		"users",
		PartitionClause::Apply {
			key: "region".into(),
			scheme: PartitionScheme::Hash(4),
		},
	);
	assert_eq!(err.code(), "PARTITION_010");
	assert!(db.class("users").partition.is_none());
	assert!(db.db.class("users__p__p0").is_none());
}

#[test]
fn test_apply_validates_bounds() {
	let db = TestDatabase::new();
	db.create_class("logs", &[("day", Domain::integer())]);

	let err = partition_err(
		&db,
		"logs",
		PartitionClause::Apply {
			key: "day".into(),
			scheme: PartitionScheme::Range(vec![
				PartitionDefinition::less_than("a", Some(Value::Integer(10))),
				PartitionDefinition::less_than("b", Some(Value::Integer(10))),
			]),
		},
	);
	assert_eq!(err.code(), "PARTITION_005");

	let err = partition_err(
		&db,
		"logs",
		PartitionClause::Apply {
			key: "day".into(),
			scheme: PartitionScheme::List(vec![
				PartitionDefinition::values_in("a", vec![Value::Integer(1)]),
				PartitionDefinition::values_in("b", vec![Value::Integer(1)]),
			]),
		},
	);
	assert_eq!(err.code(), "PARTITION_006");

	let err = partition_err(
		&db,
		"logs",
		PartitionClause::Apply {
			key: "day".into(),
			scheme: PartitionScheme::Hash(0),
		},
	);
	assert_eq!(err.code(), "PARTITION_007");
}

#[test]
fn test_hash_size_limited_by_config() {
	let db = TestDatabase::with_config(DdlConfig::default().max_hash_partitions(4));
	db.create_class("logs", &[("day", Domain::integer())]);

	let err = partition_err(
		&db,
		"logs",
		PartitionClause::Apply {
			key: "day".into(),
			scheme: PartitionScheme::Hash(5),
		},
	);
	assert_eq!(err.code(), "PARTITION_007");
}

#[test]
fn test_add_range_partition() {
	let db = TestDatabase::new();
	db.create_class("logs", &[("day", Domain::integer())]);
	partition(
		&db,
		"logs",
		PartitionClause::Apply {
			key: "day".into(),
			scheme: PartitionScheme::Range(vec![PartitionDefinition::less_than("p10", Some(Value::Integer(10)))]),
		},
	);

	let report = partition(
		&db,
		"logs",
		PartitionClause::Add(vec![PartitionDefinition::less_than("p20", Some(Value::Integer(20)))]),
	);
	assert_eq!(report.created, vec!["p20"]);
	assert_eq!(partition_names(&db, "logs"), vec!["p10", "p20"]);

	let err = partition_err(
		&db,
		"logs",
		PartitionClause::Add(vec![PartitionDefinition::less_than("p5", Some(Value::Integer(5)))]),
	);
	assert_eq!(err.code(), "PARTITION_005");

	let err = partition_err(
		&db,
		"logs",
		PartitionClause::Add(vec![PartitionDefinition::less_than("P10", Some(Value::Integer(30)))]),
	);
	assert_eq!(err.code(), "PARTITION_011");
}

#[test]
fn test_add_after_maxvalue_fails() {
	let db = TestDatabase::new();
	range_orders(&db);

	let err = partition_err(
		&db,
		"orders",
		PartitionClause::Add(vec![PartitionDefinition::less_than("p4", Some(Value::Integer(100)))]),
	);
	assert_eq!(err.code(), "PARTITION_005");
}

#[test]
fn test_add_on_hash_fails() {
	let db = TestDatabase::new();
	hashed_events(&db);

	let err = partition_err(
		&db,
		"events",
		PartitionClause::Add(vec![PartitionDefinition::less_than("x", Some(Value::Integer(1)))]),
	);
	assert_eq!(err.code(), "PARTITION_004");
}

#[test]
fn test_add_hash_partitions_redistributes() {
	let db = TestDatabase::new();
	hashed_events(&db);

	let report = partition(&db, "events", PartitionClause::AddHash(2));

	assert_eq!(report.created, vec!["p3", "p4"]);
	assert_eq!(partition_names(&db, "events"), vec!["p0", "p1", "p2", "p3", "p4"]);
	assert_eq!(report.rows_moved, 9);
	assert_eq!(db.column("events", "id"), integers(&[1, 2, 3, 4, 5, 6, 7, 8, 9]));
}

#[test]
fn test_coalesce_folds_trailing_partition() {
	let db = TestDatabase::new();
	hashed_events(&db);
	let p2 = db.class("events__p__p2");
	assert!(p2.primary_key().is_some());
	assert!(p2.find_attribute("id").unwrap().auto_increment.is_some());

	let report = partition(&db, "events", PartitionClause::Coalesce(2));

	assert_eq!(report.promoted, vec!["p2"]);
	assert_eq!(report.dropped, vec!["p2"]);
	assert!(report.created.is_empty());
	assert_eq!(partition_names(&db, "events"), vec!["p0", "p1"]);
	assert_eq!(db.class("events").partition.unwrap().size(), 2);
	assert!(db.db.class("events__p__p2").is_none());
	assert!(!db.class("events").subclasses.contains(&p2.id));
	assert_eq!(db.column("events", "id"), integers(&[1, 2, 3, 4, 5, 6, 7, 8, 9]));
	assert_eq!(db.rows_in("events"), 0);
}

#[test]
fn test_coalesce_bounds() {
	let db = TestDatabase::new();
	hashed_events(&db);

	assert_eq!(partition_err(&db, "events", PartitionClause::Coalesce(3)).code(), "PARTITION_007");
	assert_eq!(partition_err(&db, "events", PartitionClause::Coalesce(0)).code(), "PARTITION_009");
}

#[test]
fn test_coalesce_on_range_fails() {
	let db = TestDatabase::new();
	range_orders(&db);

	assert_eq!(partition_err(&db, "orders", PartitionClause::Coalesce(1)).code(), "PARTITION_004");
}

#[test]
fn test_promote_strips_root_owned_constraints() {
	let db = TestDatabase::new();
	range_orders(&db);
	db.alter_one("orders", add_constraint(ConstraintKind::Index, &["item"])).unwrap();
	let root = db.class("orders");

	let report = partition(&db, "orders", PartitionClause::Promote(vec!["p1".into()]));

	assert_eq!(report.promoted, vec!["p1"]);
	assert!(report.dropped.is_empty());

	let promoted = db.class("orders__p__p1");
	assert!(promoted.partition_of.is_none());
	assert!(promoted.superclasses.is_empty());
	assert!(promoted.primary_key().is_none());
	assert!(promoted.attributes.iter().all(|a| a.inherited_from.is_none() && a.auto_increment.is_none()));
	let index = promoted.find_constraint("i_orders_item").unwrap();
	assert!(!index.inherited);
	assert_eq!(db.select("orders__p__p1").len(), 1);

	let root_after = db.class("orders");
	assert!(!root_after.subclasses.contains(&promoted.id));
	assert_eq!(partition_names(&db, "orders"), vec!["p2", "p3"]);
	assert_eq!(
		root_after.partition.unwrap().partitions[0].values,
		PartitionValues::Range {
			min: None,
			max: Some(Value::Integer(20))
		}
	);
	assert_eq!(root.partition.unwrap().size(), 3);
	assert_eq!(db.column("orders", "id"), integers(&[15, 25]));
}

#[test]
fn test_promote_last_partition_fails() {
	let db = TestDatabase::new();
	range_orders(&db);

	let err = partition_err(&db, "orders", PartitionClause::Promote(vec!["p1".into(), "p2".into(), "p3".into()]));
	assert_eq!(err.code(), "PARTITION_009");
	assert_eq!(partition_names(&db, "orders"), vec!["p1", "p2", "p3"]);
}

#[test]
fn test_drop_partition_discards_rows() {
	let db = TestDatabase::new();
	range_orders(&db);

	let report = partition(&db, "orders", PartitionClause::Drop(vec!["p2".into()]));

	assert_eq!(report.dropped, vec!["p2"]);
	assert!(db.db.class("orders__p__p2").is_none());
	assert_eq!(partition_names(&db, "orders"), vec!["p1", "p3"]);
	assert_eq!(
		db.class("orders").partition.unwrap().partitions[1].values,
		PartitionValues::Range {
			min: Some(Value::Integer(10)),
			max: None
		}
	);
	assert_eq!(db.column("orders", "id"), integers(&[5, 25]));
}

#[test]
fn test_drop_unknown_partition_fails() {
	let db = TestDatabase::new();
	range_orders(&db);

	let err = partition_err(&db, "orders", PartitionClause::Drop(vec!["p9".into()]));
	assert_eq!(err.code(), "CA_006");
	assert_eq!(err.kind(), ErrorKind::Resolution);
}

#[test]
fn test_reorganize_splits_partition() {
	let db = TestDatabase::new();
	range_orders(&db);
	db.insert("orders", &[&[("id", Value::Integer(12))], &[("id", Value::Integer(17))]]);

	let report = partition(
		&db,
		"orders",
		PartitionClause::Reorganize {
			names: vec!["p2".into()],
			into: vec![
				PartitionDefinition::less_than("q1", Some(Value::Integer(15))),
				PartitionDefinition::less_than("q2", Some(Value::Integer(20))),
			],
		},
	);

	assert_eq!(report.promoted, vec!["p2"]);
	assert_eq!(report.created, vec!["q1", "q2"]);
	assert_eq!(partition_names(&db, "orders"), vec!["p1", "q1", "q2", "p3"]);
	assert!(db.db.class("orders__p__p2").is_none());
	assert_eq!(db.rows_in("orders__p__q1"), 1);
	assert_eq!(db.rows_in("orders__p__q2"), 2);
	assert_eq!(db.column("orders", "id"), integers(&[5, 12, 15, 17, 25]));
}

#[test]
fn test_reorganize_moves_rows_claimed_from_retained_partition() {
	let db = TestDatabase::new();
	range_orders(&db);

	let report = partition(
		&db,
		"orders",
		PartitionClause::Reorganize {
			names: vec!["p1".into()],
			into: vec![PartitionDefinition::less_than("q1", Some(Value::Integer(18)))],
		},
	);

	assert_eq!(report.created, vec!["q1"]);
	assert_eq!(partition_names(&db, "orders"), vec!["q1", "p2", "p3"]);
	assert_eq!(db.rows_in("orders__p__q1"), 2);
	assert_eq!(db.rows_in("orders__p__p2"), 0);
	assert_eq!(db.rows_in("orders__p__p3"), 1);
	assert_eq!(db.rows_in("orders"), 0);

	let p2 = db.class("orders").partition.unwrap().partitions.into_iter().find(|p| p.name == "p2").unwrap();
	assert_eq!(
		p2.values,
		PartitionValues::Range {
			min: Some(Value::Integer(18)),
			max: Some(Value::Integer(20)),
		}
	);
	assert_eq!(db.column("orders", "id"), integers(&[5, 15, 25]));
}

#[test]
fn test_reorganize_may_reuse_name() {
	let db = TestDatabase::new();
	range_orders(&db);

	partition(
		&db,
		"orders",
		PartitionClause::Reorganize {
			names: vec!["p3".into()],
			into: vec![
				PartitionDefinition::less_than("p3", Some(Value::Integer(30))),
				PartitionDefinition::less_than("pmax", None),
			],
		},
	);

	assert_eq!(partition_names(&db, "orders"), vec!["p1", "p2", "p3", "pmax"]);
	assert_eq!(db.rows_in("orders__p__p3"), 1);
}

#[test]
fn test_remove_partitioning_folds_rows_into_root() {
	let db = TestDatabase::new();
	range_orders(&db);

	let report = partition(&db, "orders", PartitionClause::Remove);

	assert_eq!(report.promoted, vec!["p1", "p2", "p3"]);
	let root = db.class("orders");
	assert!(root.partition.is_none());
	assert!(root.subclasses.is_empty());
	assert!(db.db.class("orders__p__p1").is_none());
	assert_eq!(db.rows_in("orders"), 3);
	assert_eq!(db.column("orders", "id"), integers(&[5, 15, 25]));
}

#[test]
fn test_analyze_refreshes_statistics() {
	let db = TestDatabase::new();
	range_orders(&db);

	partition(&db, "orders", PartitionClause::Analyze(vec!["p2".into()]));

	let txn = db.db.begin("dba");
	assert_eq!(txn.statistics("orders").unwrap(), Some(0));
	assert_eq!(txn.statistics("orders__p__p2").unwrap(), Some(1));
	assert_eq!(txn.statistics("orders__p__p1").unwrap(), None);
	txn.rollback();
}

#[test]
fn test_referenced_root_allows_only_add_and_analyze() {
	let db = TestDatabase::new();
	range_orders(&db);
	db.create_class("lines", &[("order_id", Domain::integer())]);
	db.alter_one(
		"lines",
		AlterClause::AddConstraints(vec![
			ConstraintDefinition::new(ConstraintKind::ForeignKey, &["order_id"]).references("orders", &[]),
		]),
	)
	.unwrap();

	let err = partition_err(&db, "orders", PartitionClause::Drop(vec!["p1".into()]));
	assert_eq!(err.code(), "PARTITION_001");
	assert_eq!(err.kind(), ErrorKind::ConstraintConflict);

	partition(&db, "orders", PartitionClause::Analyze(vec![]));
}

#[test]
fn test_not_partitioned() {
	let db = TestDatabase::new();
	db.create_class("logs", &[("day", Domain::integer())]);

	assert_eq!(partition_err(&db, "logs", PartitionClause::Remove).code(), "PARTITION_002");
}

#[test]
fn test_partitions_follow_root_schema_changes() {
	let db = TestDatabase::new();
	range_orders(&db);

	db.alter_one("orders", add_constraint(ConstraintKind::Index, &["item"])).unwrap();
	assert!(db.class("orders__p__p3").find_constraint("i_orders_item").unwrap().inherited);

	db.alter_one(
		"orders",
		AlterClause::DropConstraint {
			name: "i_orders_item".into(),
		},
	)
	.unwrap();
	assert!(db.class("orders__p__p3").find_constraint("i_orders_item").is_none());
}
