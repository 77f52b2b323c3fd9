// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub use altera_type::{Error, Result};

pub mod attribute;
pub mod cache;
pub mod class;
pub mod constraint;
pub mod id;
pub mod materialized;
pub mod name;
pub mod partition;
pub mod serial;
pub mod template;

pub use attribute::{AttributeDef, AttributeNamespace, DefaultExpr, DefaultValue};
pub use cache::{AUTH_CACHE_INCREMENT, AuthCache, Privileges};
pub use class::ClassDef;
pub use constraint::{ConstraintDef, ConstraintKind, ForeignKeyAction, ForeignKeyRef, IndexKey, StoredExpression};
pub use id::{AttributeId, ClassId, SerialId};
pub use materialized::MaterializedCatalog;
pub use partition::{
	PARTITION_SEPARATOR, PartitionDef, PartitionInfo, PartitionKind, PartitionOf, PartitionValues,
	partition_class_name,
};
pub use serial::{SerialDef, auto_increment_serial_name};
pub use template::{AttributePosition, ClassTemplate};
