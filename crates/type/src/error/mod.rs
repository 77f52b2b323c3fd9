// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	collections::TryReserveError,
	fmt::{Display, Formatter},
	ops::{Deref, DerefMut},
};

pub mod diagnostic;
mod r#macro;
mod render;

pub use diagnostic::Diagnostic;
use render::DefaultRenderer;

/// Anything that can describe itself as a [`Diagnostic`].
pub trait IntoDiagnostic {
	fn into_diagnostic(self) -> Diagnostic;
}

impl IntoDiagnostic for Diagnostic {
	fn into_diagnostic(self) -> Diagnostic {
		self
	}
}

/// Coarse classification of every diagnostic code. Callers branch on the
/// kind, never on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// Class, attribute, constraint, partition or serial does not exist.
	Resolution,
	/// Type transition or domain is not supported.
	DomainNotSupported,
	/// The change would violate a schema invariant.
	ConstraintConflict,
	/// A stored value could not be coerced to the new domain.
	RowCoercion,
	/// A working buffer could not be allocated.
	Allocation,
	/// The transaction was unilaterally aborted underneath us, or lost a
	/// write conflict at commit.
	TransactionAborted,
	/// DDL is blocked for this session.
	Authorization,
	Internal,
}

impl ErrorKind {
	pub fn from_code(code: &str) -> Self {
		match code {
			"TXN_001" | "TXN_002" | "TXN_005" => return ErrorKind::TransactionAborted,
			_ => {}
		}

		let prefix = code.split('_').next().unwrap_or_default();
		match prefix {
			"CA" => ErrorKind::Resolution,
			"ALTER" => ErrorKind::DomainNotSupported,
			"CONSTRAINT" | "PARTITION" => ErrorKind::ConstraintConflict,
			"COERCE" => ErrorKind::RowCoercion,
			"ALLOC" => ErrorKind::Allocation,
			"AUTH" => ErrorKind::Authorization,
			_ => ErrorKind::Internal,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error(pub Box<Diagnostic>);

impl Error {
	pub fn new(diagnostic: Diagnostic) -> Self {
		Self(Box::new(diagnostic))
	}

	pub fn diagnostic(self) -> Diagnostic {
		*self.0
	}

	pub fn code(&self) -> &str {
		&self.0.code
	}

	pub fn kind(&self) -> ErrorKind {
		ErrorKind::from_code(&self.0.code)
	}

	pub fn is_transaction_aborted(&self) -> bool {
		self.kind() == ErrorKind::TransactionAborted
	}

	/// Attaches the statement text unless one is already recorded.
	pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
		if self.0.statement.is_none() {
			self.0.statement = Some(statement.into());
		}
		self
	}
}

impl Deref for Error {
	type Target = Diagnostic;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for Error {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let out = DefaultRenderer::render_string(&self.0);
		f.write_str(out.as_str())
	}
}

impl std::error::Error for Error {}

impl From<Diagnostic> for Error {
	fn from(diagnostic: Diagnostic) -> Self {
		Error::new(diagnostic)
	}
}

impl From<TryReserveError> for Error {
	fn from(err: TryReserveError) -> Self {
		Error::new(diagnostic::internal::allocation_failed("working buffer", err.to_string()))
	}
}
