//! Database operations

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::models::*;
use crate::error::Result;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS engines (
                engine_id TEXT PRIMARY KEY NOT NULL,
                binary_location TEXT NOT NULL,
                uci_options TEXT NOT NULL DEFAULT '[]'
            );
            "#,
        )?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn get_all_settings(&self) -> Result<Vec<StoredSetting>> {
        let mut stmt = self.conn.prepare("SELECT key, value FROM settings ORDER BY key")?;

        let settings = stmt
            .query_map([], |row| {
                Ok(StoredSetting {
                    key: row.get(0)?,
                    value: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(settings)
    }

    /// Insert or replace
    pub fn update_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO settings (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = ?2
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// Insert only if the key has no value yet
    pub fn add_default_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn delete_setting(&self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Binds a local binary to an engine id; an existing binding is kept
    pub fn add_engine(&self, engine_id: &str, binary_location: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO engines (engine_id, binary_location) VALUES (?1, ?2)",
            params![engine_id, binary_location],
        )?;
        Ok(())
    }

    pub fn set_engine_options(&self, engine_id: &str, options: &[UciOption]) -> Result<()> {
        let json = serde_json::to_string(options)?;
        self.conn.execute(
            "UPDATE engines SET uci_options = ?2 WHERE engine_id = ?1",
            params![engine_id, json],
        )?;
        Ok(())
    }

    pub fn delete_engine(&self, engine_id: &str) -> Result<()> {
        self.conn.execute("DELETE FROM engines WHERE engine_id = ?1", params![engine_id])?;
        Ok(())
    }

    pub fn get_engine(&self, engine_id: &str) -> Result<Option<EngineBinary>> {
        let engine = self
            .conn
            .query_row(
                "SELECT engine_id, binary_location, uci_options FROM engines WHERE engine_id = ?1",
                params![engine_id],
                |row| {
                    Ok(EngineBinary {
                        engine_id: row.get(0)?,
                        binary_location: row.get(1)?,
                        uci_options: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(engine)
    }

    pub fn get_all_engines(&self) -> Result<Vec<EngineBinary>> {
        let mut stmt = self.conn.prepare(
            "SELECT engine_id, binary_location, uci_options FROM engines ORDER BY engine_id",
        )?;

        let engines = stmt
            .query_map([], |row| {
                Ok(EngineBinary {
                    engine_id: row.get(0)?,
                    binary_location: row.get(1)?,
                    uci_options: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(engines)
    }

    pub fn count_engines(&self) -> Result<u32> {
        let count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM engines", [], |row| row.get(0))?;
        Ok(count)
    }
}
