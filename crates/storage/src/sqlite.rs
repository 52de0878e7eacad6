use std::path::Path;

use pantry_core::ids::Revision;
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::error::StorageError;
use crate::traits::{DocumentStore, StoredDocument};

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn current_revision(conn: &Connection, id: &str) -> Result<Option<Revision>, StorageError> {
    let text: Option<String> = conn
        .query_row(
            "SELECT revision FROM documents WHERE doc_id = ?1",
            rusqlite::params![id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(text.map(|t| t.parse::<Revision>()).transpose()?)
}

impl DocumentStore for SqliteStore {
    fn get(&self, id: &str) -> Result<StoredDocument, StorageError> {
        let row: Option<(String, Vec<u8>)> = self
            .conn
            .query_row(
                "SELECT revision, body FROM documents WHERE doc_id = ?1",
                rusqlite::params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (revision, body) = row.ok_or_else(|| StorageError::NotFound { id: id.to_string() })?;
        Ok(StoredDocument {
            id: id.to_string(),
            revision: revision.parse()?,
            body,
        })
    }

    fn put(
        &mut self,
        id: &str,
        expected: Option<&Revision>,
        body: &[u8],
    ) -> Result<Revision, StorageError> {
        let tx = self.conn.transaction()?;
        let actual = current_revision(&tx, id)?;
        if actual.as_ref() != expected {
            return Err(StorageError::Conflict {
                id: id.to_string(),
                expected: expected.cloned(),
                actual,
            });
        }

        let next = Revision::next(actual.as_ref(), body);
        match actual {
            None => {
                tx.execute(
                    "INSERT INTO documents (doc_id, revision, body) VALUES (?1, ?2, ?3)",
                    rusqlite::params![id, next.as_str(), body],
                )?;
            }
            Some(_) => {
                tx.execute(
                    "UPDATE documents SET revision = ?1, body = ?2, updated_at = CAST(unixepoch('now','subsec') * 1000 AS INTEGER) WHERE doc_id = ?3",
                    rusqlite::params![next.as_str(), body, id],
                )?;
            }
        }
        tx.commit()?;
        debug!(doc_id = id, revision = %next, "document written");
        Ok(next)
    }

    fn revision(&self, id: &str) -> Result<Option<Revision>, StorageError> {
        current_revision(&self.conn, id)
    }
}
