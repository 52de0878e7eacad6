use std::sync::Arc;

use pantry_core::ids::Revision;
use pantry_storage::{DocumentStore, StorageError, StoredDocument};
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutCall {
    pub id: String,
    pub expected: Option<Revision>,
    pub body: Vec<u8>,
}

#[derive(Debug, Default)]
struct Log {
    gets: usize,
    puts: Vec<PutCall>,
    fail_gets: Option<String>,
    fail_puts: Option<String>,
}

/// Store wrapper that records every call and can be told to fail.
pub struct RecordingStore<S> {
    inner: S,
    log: Arc<Mutex<Log>>,
}

/// Inspection side of a [`RecordingStore`], usable after the store has been
/// moved into a handle.
#[derive(Clone)]
pub struct StoreProbe {
    log: Arc<Mutex<Log>>,
}

impl<S: DocumentStore> RecordingStore<S> {
    pub fn new(inner: S) -> (Self, StoreProbe) {
        let log = Arc::new(Mutex::new(Log::default()));
        let probe = StoreProbe { log: log.clone() };
        (Self { inner, log }, probe)
    }
}

impl<S: DocumentStore> DocumentStore for RecordingStore<S> {
    fn get(&self, id: &str) -> Result<StoredDocument, StorageError> {
        let mut log = self.log.lock();
        log.gets += 1;
        if let Some(reason) = &log.fail_gets {
            return Err(StorageError::Serialization(reason.clone()));
        }
        drop(log);
        self.inner.get(id)
    }

    fn put(
        &mut self,
        id: &str,
        expected: Option<&Revision>,
        body: &[u8],
    ) -> Result<Revision, StorageError> {
        let mut log = self.log.lock();
        log.puts.push(PutCall {
            id: id.to_string(),
            expected: expected.cloned(),
            body: body.to_vec(),
        });
        if let Some(reason) = &log.fail_puts {
            return Err(StorageError::Serialization(reason.clone()));
        }
        drop(log);
        self.inner.put(id, expected, body)
    }

    fn revision(&self, id: &str) -> Result<Option<Revision>, StorageError> {
        self.inner.revision(id)
    }
}

impl StoreProbe {
    pub fn get_count(&self) -> usize {
        self.log.lock().gets
    }

    pub fn puts(&self) -> Vec<PutCall> {
        self.log.lock().puts.clone()
    }

    pub fn put_count(&self) -> usize {
        self.log.lock().puts.len()
    }

    pub fn fail_gets(&self, reason: &str) {
        self.log.lock().fail_gets = Some(reason.to_string());
    }

    pub fn fail_puts(&self, reason: &str) {
        self.log.lock().fail_puts = Some(reason.to_string());
    }

    pub fn heal(&self) {
        let mut log = self.log.lock();
        log.fail_gets = None;
        log.fail_puts = None;
    }
}
