use pantry_core::CoreError;
use pantry_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no store named {0:?}")]
    UnknownStore(String),

    #[error("background task failed: {0}")]
    TaskFailed(String),
}

impl EngineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::Storage(e) if e.is_not_found())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, EngineError::Storage(e) if e.is_conflict())
    }
}
