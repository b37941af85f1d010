// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Local Settings Storage
//!
//! The local persistent store is the single source of truth for "current
//! local state": ticket sets, syncable preferences, and the last-sync
//! cursor, one JSON value per named setting. The sync layer reads it
//! immediately before encryption and writes it immediately after merge,
//! keeping no shadow copy across sync cycles.

mod memory;
mod sqlite;

use serde_json::Value;
use thiserror::Error;

pub use memory::MemorySettings;
pub use sqlite::SqliteSettings;

/// Setting name under which the sync cursor is persisted.
pub const LAST_SYNC_TIME: &str = "last-sync-time";

/// Storage error types.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Stored value is not valid JSON: {0}")]
    Corrupted(String),
}

/// Named JSON settings, get/save/delete.
///
/// Implementations must be usable through a shared reference; the sync
/// controller holds the store for the lifetime of a session.
pub trait SettingsStore {
    /// Reads a setting, `None` if absent.
    fn get_setting(&self, name: &str) -> Result<Option<Value>, SettingsError>;

    /// Writes a setting, replacing any previous value.
    fn save_setting(&self, name: &str, value: &Value) -> Result<(), SettingsError>;

    /// Removes a setting. Absent settings are not an error.
    fn delete_setting(&self, name: &str) -> Result<(), SettingsError>;
}
