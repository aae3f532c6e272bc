//! Database module
//!
//! Persists per-module settings. Conversations are never stored here.

mod schema;

pub use schema::*;

use crate::modules::ModuleSettings;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Corrupt settings for module {module_id}: {source}")]
    CorruptSettings {
        module_id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_migrations(&self) -> DbResult<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Settings Operations ====================

    /// Stored settings for a module, merged over its defaults
    pub fn get_settings(
        &self,
        module_id: &str,
        default_model: &str,
    ) -> DbResult<Option<StoredSettings>> {
        let row: Option<(String, String)> = self
            .conn()
            .query_row(
                "SELECT settings_json, updated_at FROM module_settings WHERE module_id = ?1",
                params![module_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        row.map(|(json, updated_at)| {
            let settings =
                ModuleSettings::from_stored(module_id, default_model, &json).map_err(|source| {
                    DbError::CorruptSettings {
                        module_id: module_id.to_string(),
                        source,
                    }
                })?;
            Ok(StoredSettings {
                module_id: module_id.to_string(),
                settings,
                updated_at: parse_datetime(&updated_at),
            })
        })
        .transpose()
    }

    /// Settings for a module, or its defaults when none are stored
    pub fn effective_settings(
        &self,
        module_id: &str,
        default_model: &str,
    ) -> DbResult<ModuleSettings> {
        Ok(self.get_settings(module_id, default_model)?.map_or_else(
            || ModuleSettings::defaults_for(module_id, default_model),
            |s| s.settings,
        ))
    }

    /// Insert or replace a module's settings. Callers validate first.
    pub fn save_settings(
        &self,
        module_id: &str,
        settings: &ModuleSettings,
    ) -> DbResult<StoredSettings> {
        let json = serde_json::to_string(settings)?;
        let now = Utc::now();

        self.conn().execute(
            "INSERT INTO module_settings (module_id, settings_json, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(module_id) DO UPDATE SET
                settings_json = excluded.settings_json,
                updated_at = excluded.updated_at",
            params![module_id, json, now.to_rfc3339()],
        )?;

        Ok(StoredSettings {
            module_id: module_id.to_string(),
            settings: settings.clone(),
            updated_at: now,
        })
    }

    /// Drop a module's settings so it returns to defaults
    pub fn delete_settings(&self, module_id: &str) -> DbResult<bool> {
        let deleted = self.conn().execute(
            "DELETE FROM module_settings WHERE module_id = ?1",
            params![module_id],
        )?;
        Ok(deleted > 0)
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
