use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("field is immutable: {0}")]
    ImmutableField(String),

    #[error("duplicate record id: {0}")]
    DuplicateId(String),

    #[error("unsupported schema version: {0}")]
    UnsupportedSchemaVersion(u32),

    #[error("invalid revision: {0}")]
    InvalidRevision(String),
}
