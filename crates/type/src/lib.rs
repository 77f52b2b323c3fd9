// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

pub mod error;
pub mod value;

pub use error::{Diagnostic, Error, ErrorKind, IntoDiagnostic};
pub use value::{
	Value,
	coerce::{coerce, hard_default},
	collation::{Codeset, Collation, CollationId},
	domain::Domain,
	r#type::{Type, TypeFamily},
};

pub type Result<T> = std::result::Result<T, Error>;
