// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use altera_catalog::{SerialDef, SerialId};
use altera_type::{Result, error::diagnostic::catalog, return_error};
use tracing::debug;

use crate::{
	memory::MemoryTransaction,
	service::{SerialService, SerialSpec},
};

impl MemoryTransaction {
	fn serial(&self, serial: SerialId) -> Result<SerialDef> {
		match self.state.catalog.find_serial(serial) {
			Some(def) => Ok(def),
			None => return_error!(catalog::serial_not_found(&serial.to_string())),
		}
	}
}

impl SerialService for MemoryTransaction {
	fn create_serial(&mut self, spec: SerialSpec) -> Result<SerialDef> {
		self.ensure_active()?;
		if self.state.catalog.find_serial_by_name(&spec.name).is_some() {
			return_error!(catalog::serial_already_exists(&spec.name));
		}

		let id = self.state.catalog.next_serial_id();
		let mut def = SerialDef::new(id, spec.name, spec.start, spec.increment);
		def.owner_class = spec.owner_class;
		def.owner_attribute = spec.owner_attribute;
		debug!(serial = %def.name, start = def.start, "create serial");
		self.state.catalog.set_serial(id, Some(def.clone()));
		self.state.touch_serial(id);
		Ok(def)
	}

	fn delete_serial(&mut self, serial: SerialId) -> Result<()> {
		self.ensure_active()?;
		let def = self.serial(serial)?;
		debug!(serial = %def.name, "delete serial");
		self.state.catalog.set_serial(serial, None);
		self.state.touch_serial(serial);
		Ok(())
	}

	fn rename_serial(&mut self, serial: SerialId, name: &str) -> Result<()> {
		self.ensure_active()?;
		let mut def = self.serial(serial)?;
		if let Some(existing) = self.state.catalog.find_serial_by_name(name) {
			if existing.id != serial {
				return_error!(catalog::serial_already_exists(name));
			}
		}
		def.name = name.to_string();
		self.state.catalog.set_serial(serial, Some(def));
		self.state.touch_serial(serial);
		Ok(())
	}

	fn find_serial(&self, name: &str) -> Result<Option<SerialDef>> {
		self.ensure_active()?;
		Ok(self.state.catalog.find_serial_by_name(name))
	}

	fn get_serial(&self, serial: SerialId) -> Result<SerialDef> {
		self.ensure_active()?;
		self.serial(serial)
	}
}
