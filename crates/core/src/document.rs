use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::Revision;
use crate::record::{Record, RecordList};

pub const SCHEMA_VERSION: u32 = 1;

/// A value kept as a single document in a revisioned store.
pub trait Persisted: Clone + Send + Sync + 'static {
    fn encode(&self) -> Result<Vec<u8>, CoreError>;

    fn decode(bytes: &[u8], revision: Revision) -> Result<Self, CoreError>;

    fn revision(&self) -> Option<&Revision>;

    fn with_revision(self, revision: Revision) -> Self;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDocument {
    pub categories: RecordList,
    pub schema_version: u32,
    pub revision: Option<Revision>,
}

/// On-disk body. Bodies written before versioning carry no
/// `schema_version` and are read as version 0.
#[derive(Serialize, Deserialize)]
struct Body {
    categories: RecordList,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schema_version: Option<u32>,
}

impl CategoryDocument {
    pub fn new(categories: RecordList) -> Self {
        Self {
            categories,
            schema_version: SCHEMA_VERSION,
            revision: None,
        }
    }

    /// Content written when the store has no categories document yet.
    pub fn seed() -> Result<Self, CoreError> {
        let flour = Record::new("xxxxx".into())
            .with("name", "AP Flour")
            .with("description", "all purpose flour")
            .with("tags", crate::field_value::FieldValue::List(Vec::new()))
            .with("shelf life, weeks", 52.0)
            .with("perishable", false)
            .with("staple", true);
        Ok(Self::new(RecordList::new().with_appended(flour)?))
    }

    pub fn with_categories(self, categories: RecordList) -> Self {
        Self { categories, ..self }
    }

    fn migrate(body: Body) -> Result<Body, CoreError> {
        match body.schema_version {
            None | Some(0) => Ok(Body {
                schema_version: Some(SCHEMA_VERSION),
                ..body
            }),
            Some(SCHEMA_VERSION) => Ok(body),
            Some(other) => Err(CoreError::UnsupportedSchemaVersion(other)),
        }
    }
}

impl Persisted for CategoryDocument {
    fn encode(&self) -> Result<Vec<u8>, CoreError> {
        let body = Body {
            categories: self.categories.clone(),
            schema_version: Some(self.schema_version),
        };
        rmp_serde::to_vec_named(&body).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    fn decode(bytes: &[u8], revision: Revision) -> Result<Self, CoreError> {
        let body: Body =
            rmp_serde::from_slice(bytes).map_err(|e| CoreError::Serialization(e.to_string()))?;
        let body = Self::migrate(body)?;
        Ok(Self {
            categories: body.categories,
            schema_version: body.schema_version.unwrap_or(SCHEMA_VERSION),
            revision: Some(revision),
        })
    }

    fn revision(&self) -> Option<&Revision> {
        self.revision.as_ref()
    }

    fn with_revision(self, revision: Revision) -> Self {
        Self {
            revision: Some(revision),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_holds_flour() {
        let seed = CategoryDocument::seed().unwrap();
        assert_eq!(seed.schema_version, 1);
        assert!(seed.revision.is_none());
        assert_eq!(seed.categories.len(), 1);
        let flour = seed.categories.get(&"xxxxx".into()).unwrap();
        assert_eq!(flour.get("name").and_then(|v| v.as_text()), Some("AP Flour"));
    }

    #[test]
    fn decode_attaches_revision() {
        let doc = CategoryDocument::seed().unwrap();
        let bytes = doc.encode().unwrap();
        let rev = Revision::next(None, &bytes);
        let decoded = CategoryDocument::decode(&bytes, rev.clone()).unwrap();
        assert_eq!(decoded.categories, doc.categories);
        assert_eq!(decoded.revision, Some(rev));
    }

    #[test]
    fn unversioned_body_is_upgraded() {
        let legacy = Body {
            categories: CategoryDocument::seed().unwrap().categories,
            schema_version: None,
        };
        let bytes = rmp_serde::to_vec_named(&legacy).unwrap();
        let decoded = CategoryDocument::decode(&bytes, Revision::next(None, &bytes)).unwrap();
        assert_eq!(decoded.schema_version, SCHEMA_VERSION);
        assert_eq!(decoded.categories.len(), 1);
    }

    #[test]
    fn future_version_is_rejected() {
        let body = Body {
            categories: RecordList::new(),
            schema_version: Some(7),
        };
        let bytes = rmp_serde::to_vec_named(&body).unwrap();
        let err = CategoryDocument::decode(&bytes, Revision::next(None, &bytes)).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedSchemaVersion(7)));
    }
}
