use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoreError;

/// Identifier of a single record. Stored ids are kept verbatim, so any
/// string is accepted; fresh ids come from UUIDv7.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const DIGEST_HEX_LEN: usize = 32;

/// Store-assigned revision token, formatted `{seq}-{digest}`.
///
/// `seq` counts successful writes to a document starting at 1. `digest` is a
/// blake3 prefix of the written body. Callers should only compare revisions
/// for equality.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    /// Revision assigned to a write of `body` that follows `prev`.
    pub fn next(prev: Option<&Revision>, body: &[u8]) -> Self {
        let seq = prev.map_or(0, Revision::seq) + 1;
        let digest = blake3::hash(body).to_hex();
        Self(format!("{seq}-{}", &digest[..DIGEST_HEX_LEN]))
    }

    pub fn seq(&self) -> u64 {
        self.0
            .split_once('-')
            .and_then(|(seq, _)| seq.parse().ok())
            .unwrap_or(0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Revision {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((seq, digest))
                if !digest.is_empty() && seq.parse::<u64>().is_ok_and(|n| n > 0) =>
            {
                Ok(Self(s.to_string()))
            }
            _ => Err(CoreError::InvalidRevision(s.to_string())),
        }
    }
}

impl fmt::Debug for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Revision({})", self.0)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
