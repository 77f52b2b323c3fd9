// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

/// Wraps a diagnostic into an [`Error`](crate::error::Error).
#[macro_export]
macro_rules! error {
	($diagnostic:expr) => {
		$crate::error::Error::new($diagnostic)
	};
}

/// Returns early with an error built from the diagnostic.
#[macro_export]
macro_rules! return_error {
	($diagnostic:expr) => {
		return Err($crate::error::Error::new($diagnostic))
	};
}

/// Builds an `Err` from the diagnostic.
#[macro_export]
macro_rules! err {
	($diagnostic:expr) => {
		Err($crate::error::Error::new($diagnostic))
	};
}

/// Creates an internal error diagnostic capturing the source location.
#[macro_export]
macro_rules! internal_error {
	($reason:expr) => {
		$crate::error::diagnostic::internal::internal_with_context($reason, file!(), line!(), module_path!())
	};
	($fmt:expr, $($arg:tt)*) => {
		$crate::error::diagnostic::internal::internal_with_context(
			format!($fmt, $($arg)*),
			file!(),
			line!(),
			module_path!(),
		)
	};
}

#[macro_export]
macro_rules! return_internal_error {
	($reason:expr) => {
		return Err($crate::error::Error::new($crate::internal_error!($reason)))
	};
	($fmt:expr, $($arg:tt)*) => {
		return Err($crate::error::Error::new($crate::internal_error!($fmt, $($arg)*)))
	};
}

#[cfg(test)]
mod tests {
	use crate::{Result, error::diagnostic::catalog};

	#[test]
	fn test_return_error_in_function() {
		fn lookup() -> Result<()> {
			return_error!(catalog::class_not_found("missing"));
		}

		let err = lookup().unwrap_err();
		assert_eq!(err.code(), "CA_001");
	}

	#[test]
	fn test_return_internal_error_with_format() {
		fn broken(val: u32) -> Result<()> {
			return_internal_error!("invalid value: {:#04x}", val);
		}

		let err = broken(255).unwrap_err();
		assert_eq!(err.code(), "INTERNAL_ERROR");
		assert!(err.message.contains("invalid value: 0xff"));
		assert!(err.label.as_deref().unwrap_or_default().contains("macro.rs"));
	}
}
