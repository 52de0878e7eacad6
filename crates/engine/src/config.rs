use std::path::PathBuf;

use pantry_storage::SqliteStore;
use serde::Deserialize;

use crate::error::EngineError;

/// Where a named store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreLocation {
    #[default]
    InMemory,
    /// `{store_name}.sqlite3` inside this directory.
    Directory(PathBuf),
}

impl StoreLocation {
    pub fn open(&self, store_name: &str) -> Result<SqliteStore, EngineError> {
        match self {
            StoreLocation::InMemory => Ok(SqliteStore::open_in_memory()?),
            StoreLocation::Directory(dir) => {
                std::fs::create_dir_all(dir)?;
                Ok(SqliteStore::open(dir.join(format!("{store_name}.sqlite3")))?)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PantryConfig {
    pub store_name: String,
    pub document_id: String,
    pub location: StoreLocation,
}

impl Default for PantryConfig {
    fn default() -> Self {
        Self {
            store_name: "proto-pantry".to_string(),
            document_id: "categories".to_string(),
            location: StoreLocation::InMemory,
        }
    }
}

impl PantryConfig {
    pub fn in_directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            location: StoreLocation::Directory(dir.into()),
            ..Self::default()
        }
    }
}
