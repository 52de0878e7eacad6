use pantry_core::ids::Revision;

use crate::error::StorageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: String,
    pub revision: Revision,
    pub body: Vec<u8>,
}

/// Revisioned document store.
///
/// Every successful `put` assigns a new revision. A `put` must name the
/// document's current revision as `expected` (`None` when creating it);
/// anything else is rejected with [`StorageError::Conflict`].
pub trait DocumentStore {
    fn get(&self, id: &str) -> Result<StoredDocument, StorageError>;

    fn put(
        &mut self,
        id: &str,
        expected: Option<&Revision>,
        body: &[u8],
    ) -> Result<Revision, StorageError>;

    fn revision(&self, id: &str) -> Result<Option<Revision>, StorageError>;
}
