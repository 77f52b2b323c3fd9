// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{id::SerialId, materialized::MaterializedCatalog, name::name_key, serial::SerialDef};

impl MaterializedCatalog {
	pub fn find_serial(&self, serial: SerialId) -> Option<SerialDef> {
		self.serials.get(&serial).map(|entry| entry.value().clone())
	}

	pub fn find_serial_by_name(&self, name: &str) -> Option<SerialDef> {
		self.serials_by_name.get(&name_key(name)).and_then(|entry| self.find_serial(*entry.value()))
	}

	pub fn set_serial(&self, id: SerialId, serial: Option<SerialDef>) {
		if let Some(entry) = self.serials.get(&id) {
			self.serials_by_name.remove(&name_key(&entry.value().name));
		}

		match serial {
			Some(serial) => {
				self.serials_by_name.insert(name_key(&serial.name), id);
				self.serials.insert(id, serial);
			}
			None => {
				self.serials.remove(&id);
			}
		}
	}
}
