// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	collections::HashMap,
	fmt::{Display, Formatter},
};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Codeset {
	Iso88591,
	Utf8,
	EucKr,
	Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollationId(pub u16);

impl CollationId {
	pub const ISO88591_BIN: CollationId = CollationId(0);
	pub const UTF8_BIN: CollationId = CollationId(1);
	pub const ISO88591_EN_CS: CollationId = CollationId(2);
	pub const ISO88591_EN_CI: CollationId = CollationId(3);
	pub const UTF8_EN_CS: CollationId = CollationId(4);
	pub const UTF8_EN_CI: CollationId = CollationId(5);
	pub const UTF8_TR_CS: CollationId = CollationId(6);
	pub const UTF8_KO_CS: CollationId = CollationId(7);
	pub const EUCKR_BIN: CollationId = CollationId(8);
	pub const BINARY: CollationId = CollationId(9);
	pub const UTF8_DE_EXP: CollationId = CollationId(10);
	pub const UTF8_JA_EXP: CollationId = CollationId(11);

	pub fn collation(&self) -> &'static Collation {
		COLLATIONS.get(self.0 as usize).unwrap_or(&COLLATIONS[Self::UTF8_BIN.0 as usize])
	}

	pub fn by_name(name: &str) -> Option<CollationId> {
		COLLATIONS_BY_NAME.get(name.to_ascii_lowercase().as_str()).copied()
	}
}

impl Default for CollationId {
	fn default() -> Self {
		CollationId::UTF8_BIN
	}
}

impl Display for CollationId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.collation().name)
	}
}

#[derive(Debug, PartialEq, Eq)]
pub struct Collation {
	pub id: CollationId,
	pub name: &'static str,
	pub codeset: Codeset,
	/// Collations with contractions or expansions cannot back prefix indexes.
	pub allows_prefix_index: bool,
}

const fn collation(id: u16, name: &'static str, codeset: Codeset, allows_prefix_index: bool) -> Collation {
	Collation {
		id: CollationId(id),
		name,
		codeset,
		allows_prefix_index,
	}
}

static COLLATIONS: [Collation; 12] = [
	collation(0, "iso88591_bin", Codeset::Iso88591, true),
	collation(1, "utf8_bin", Codeset::Utf8, true),
	collation(2, "iso88591_en_cs", Codeset::Iso88591, true),
	collation(3, "iso88591_en_ci", Codeset::Iso88591, true),
	collation(4, "utf8_en_cs", Codeset::Utf8, true),
	collation(5, "utf8_en_ci", Codeset::Utf8, true),
	collation(6, "utf8_tr_cs", Codeset::Utf8, true),
	collation(7, "utf8_ko_cs", Codeset::Utf8, true),
	collation(8, "euckr_bin", Codeset::EucKr, true),
	collation(9, "binary", Codeset::Binary, true),
	collation(10, "utf8_de_exp", Codeset::Utf8, false),
	collation(11, "utf8_ja_exp", Codeset::Utf8, false),
];

static COLLATIONS_BY_NAME: Lazy<HashMap<&'static str, CollationId>> =
	Lazy::new(|| COLLATIONS.iter().map(|c| (c.name, c.id)).collect());

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_lookup_by_name() {
		assert_eq!(CollationId::by_name("UTF8_EN_CI"), Some(CollationId::UTF8_EN_CI));
		assert_eq!(CollationId::by_name("klingon"), None);
	}

	#[test]
	fn test_ids_match_table_positions() {
		for (idx, c) in COLLATIONS.iter().enumerate() {
			assert_eq!(c.id.0 as usize, idx);
		}
	}

	#[test]
	fn test_expansion_collations_disallow_prefix_index() {
		assert!(!CollationId::UTF8_DE_EXP.collation().allows_prefix_index);
		assert!(CollationId::UTF8_EN_CS.collation().allows_prefix_index);
	}
}
