// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

/// Identifiers are case-insensitive.
pub fn names_equal(a: &str, b: &str) -> bool {
	a.eq_ignore_ascii_case(b)
}

/// Key under which a name is indexed.
pub fn name_key(name: &str) -> String {
	name.to_ascii_lowercase()
}
