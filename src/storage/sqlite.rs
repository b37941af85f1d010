// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! SQLite-backed settings store.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use super::{SettingsError, SettingsStore};

/// Key-value settings persisted in a SQLite table.
pub struct SqliteSettings {
    conn: Connection,
}

impl SqliteSettings {
    /// Opens (or creates) a settings database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Creates an in-memory settings database (tests, ephemeral sessions).
    pub fn in_memory() -> Result<Self, SettingsError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, SettingsError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                name TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(SqliteSettings { conn })
    }
}

impl SettingsStore for SqliteSettings {
    fn get_setting(&self, name: &str) -> Result<Option<Value>, SettingsError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| SettingsError::Corrupted(e.to_string())),
            None => Ok(None),
        }
    }

    fn save_setting(&self, name: &str, value: &Value) -> Result<(), SettingsError> {
        self.conn.execute(
            "INSERT INTO settings (name, value) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET value = excluded.value",
            params![name, value.to_string()],
        )?;
        Ok(())
    }

    fn delete_setting(&self, name: &str) -> Result<(), SettingsError> {
        self.conn
            .execute("DELETE FROM settings WHERE name = ?1", params![name])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_save_get_delete_round_trip() {
        let store = SqliteSettings::in_memory().unwrap();
        assert!(store.get_setting("theme").unwrap().is_none());

        store.save_setting("theme", &json!("dark")).unwrap();
        assert_eq!(store.get_setting("theme").unwrap(), Some(json!("dark")));

        store.save_setting("theme", &json!("light")).unwrap();
        assert_eq!(store.get_setting("theme").unwrap(), Some(json!("light")));

        store.delete_setting("theme").unwrap();
        assert!(store.get_setting("theme").unwrap().is_none());
        // Deleting again is not an error
        store.delete_setting("theme").unwrap();
    }

    #[test]
    fn test_structured_values_survive() {
        let store = SqliteSettings::in_memory().unwrap();
        let tickets = json!([{ "finalized_ticket": "t1", "issued_at": 1 }]);
        store.save_setting("tickets-active", &tickets).unwrap();
        assert_eq!(store.get_setting("tickets-active").unwrap(), Some(tickets));
    }
}
