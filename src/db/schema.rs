//! Database schema and types

use crate::modules::ModuleSettings;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS module_settings (
    module_id TEXT PRIMARY KEY,
    settings_json TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// Settings row as read back from the database
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredSettings {
    pub module_id: String,
    pub settings: ModuleSettings,
    pub updated_at: DateTime<Utc>,
}
