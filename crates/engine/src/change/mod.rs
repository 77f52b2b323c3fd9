// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Analysis of a single attribute change: how the domain moves, which
//! properties differ, and which change mode, if any, accepts it.

pub mod check;
pub mod classify;
pub mod property;

pub use check::{ChangeMode, ChangeRejection, check_change_allowed, resolve_change_mode};
pub use classify::{
	ClassHierarchy, CollationChange, FlatHierarchy, TypeChange, classify_collation, classify_type_change,
};
pub use property::{Property, PropertyFlags, PropertyMap, PropertyMapBuilder};
