// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub use altera_type::{Error, Result};

pub mod change;
pub mod config;
pub mod context;
pub mod error;
mod execute;
pub mod expression;
pub mod statement;
pub mod test_utils;

pub use config::DdlConfig;
pub use execute::{AlterResult, ClauseOutcome, Executor, PartitionReport};
