use std::collections::BTreeMap;
use std::sync::Arc;

use pantry_storage::DocumentStore;
use parking_lot::{Mutex, MutexGuard};
use tracing::info;

use crate::config::StoreLocation;
use crate::error::EngineError;

type BoxedStore = Box<dyn DocumentStore + Send>;

/// Shared handle to one named document store.
#[derive(Clone)]
pub struct StoreHandle {
    name: Arc<str>,
    store: Arc<Mutex<BoxedStore>>,
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle").field("name", &self.name).finish()
    }
}

impl StoreHandle {
    pub fn new(name: &str, store: impl DocumentStore + Send + 'static) -> Self {
        Self {
            name: Arc::from(name),
            store: Arc::new(Mutex::new(Box::new(store))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exclusive access to the store. Blocks while another caller holds it.
    pub fn lock(&self) -> MutexGuard<'_, BoxedStore> {
        self.store.lock()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut dyn DocumentStore) -> R) -> R {
        let mut guard = self.lock();
        f(&mut **guard)
    }

    /// Run `f` against the store on the blocking thread pool.
    pub async fn run<R>(
        &self,
        f: impl FnOnce(&mut dyn DocumentStore) -> Result<R, EngineError> + Send + 'static,
    ) -> Result<R, EngineError>
    where
        R: Send + 'static,
    {
        let handle = self.clone();
        tokio::task::spawn_blocking(move || handle.with(f))
            .await
            .map_err(|e| EngineError::TaskFailed(e.to_string()))?
    }
}

/// Registry of the stores an application has opened, keyed by name.
///
/// Created once at startup and passed to whatever needs a store.
#[derive(Debug, Default)]
pub struct StoreContext {
    stores: BTreeMap<String, StoreHandle>,
}

impl StoreContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the store `name` at `location`, or return the already open one.
    pub fn open(
        &mut self,
        name: &str,
        location: &StoreLocation,
    ) -> Result<StoreHandle, EngineError> {
        if let Some(handle) = self.stores.get(name) {
            return Ok(handle.clone());
        }
        let store = location.open(name)?;
        info!(store = name, ?location, "opened store");
        Ok(self.register(name, store))
    }

    /// Register an already constructed store under `name`, replacing any
    /// previous registration.
    pub fn register(
        &mut self,
        name: &str,
        store: impl DocumentStore + Send + 'static,
    ) -> StoreHandle {
        let handle = StoreHandle::new(name, store);
        self.stores.insert(name.to_string(), handle.clone());
        handle
    }

    pub fn handle(&self, name: &str) -> Result<StoreHandle, EngineError> {
        self.stores
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownStore(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }
}
