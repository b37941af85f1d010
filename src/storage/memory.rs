// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory settings store for tests and hosts with their own persistence.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use super::{SettingsError, SettingsStore};

/// Settings held in a mutex-guarded map, never persisted.
#[derive(Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, Value>>,
}

impl MemorySettings {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get_setting(&self, name: &str) -> Result<Option<Value>, SettingsError> {
        let values = self.values.lock().expect("settings mutex poisoned");
        Ok(values.get(name).cloned())
    }

    fn save_setting(&self, name: &str, value: &Value) -> Result<(), SettingsError> {
        let mut values = self.values.lock().expect("settings mutex poisoned");
        values.insert(name.to_string(), value.clone());
        Ok(())
    }

    fn delete_setting(&self, name: &str) -> Result<(), SettingsError> {
        let mut values = self.values.lock().expect("settings mutex poisoned");
        values.remove(name);
        Ok(())
    }
}
