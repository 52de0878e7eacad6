use std::path::{Path, PathBuf};
use std::sync::Arc;

use pantry_core::document::{CategoryDocument, Persisted};
use pantry_core::ids::Revision;
use pantry_engine::{StoreContext, StoreHandle};
use pantry_storage::{DocumentStore, SqliteStore, StorageError};
use tempfile::TempDir;

use crate::recording::{RecordingStore, StoreProbe};

pub const STORE_NAME: &str = "proto-pantry";
pub const DOC_ID: &str = "categories";

/// A store registered in a fresh context, with a probe on it.
pub struct TestPantry {
    pub context: StoreContext,
    pub store: StoreHandle,
    pub probe: StoreProbe,
    disk: Option<(Arc<TempDir>, PathBuf)>,
}

impl TestPantry {
    pub fn new() -> Result<Self, StorageError> {
        Ok(Self::wrap(SqliteStore::open_in_memory()?, None))
    }

    /// A store backed by a database file in a temporary directory that
    /// lives as long as this fixture and any fixture reopened from it.
    pub fn on_disk() -> Result<Self, Box<dyn std::error::Error>> {
        let dir = Arc::new(tempfile::tempdir()?);
        let path = dir.path().join(format!("{STORE_NAME}.sqlite3"));
        let inner = SqliteStore::open(&path)?;
        Ok(Self::wrap(inner, Some((dir, path))))
    }

    /// Open a new connection to the same database file, with a fresh probe.
    /// Returns `None` for in-memory fixtures.
    pub fn reopen(&self) -> Result<Option<Self>, StorageError> {
        let Some((dir, path)) = &self.disk else {
            return Ok(None);
        };
        let inner = SqliteStore::open(path)?;
        Ok(Some(Self::wrap(inner, Some((dir.clone(), path.clone())))))
    }

    pub fn path(&self) -> Option<&Path> {
        self.disk.as_ref().map(|(_, path)| path.as_path())
    }

    /// A store that already holds `document` under [`DOC_ID`]. The seeding
    /// write is not recorded by the probe.
    pub fn with_document(document: &CategoryDocument) -> Result<Self, StorageError> {
        let mut inner = SqliteStore::open_in_memory()?;
        inner.put(DOC_ID, None, &document.encode()?)?;
        Ok(Self::wrap(inner, None))
    }

    fn wrap(inner: SqliteStore, disk: Option<(Arc<TempDir>, PathBuf)>) -> Self {
        let (recording, probe) = RecordingStore::new(inner);
        let mut context = StoreContext::new();
        let store = context.register(STORE_NAME, recording);
        Self {
            context,
            store,
            probe,
            disk,
        }
    }

    pub fn revision(&self) -> Result<Option<Revision>, StorageError> {
        self.store.with(|s| s.revision(DOC_ID))
    }

    /// Decode whatever the store currently holds under [`DOC_ID`].
    pub fn stored(&self) -> Result<CategoryDocument, StorageError> {
        let stored = self.store.with(|s| s.get(DOC_ID))?;
        Ok(CategoryDocument::decode(&stored.body, stored.revision)?)
    }
}
