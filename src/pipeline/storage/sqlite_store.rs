use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::db::{self, DatabaseError};
use crate::models::{Document, DocumentPath, DocumentUpdate};

use super::types::DocumentStore;
use super::StorageError;

/// SQLite-backed document store. Opens one connection per operation so
/// that no state is shared between pipeline invocations.
pub struct SqliteDocumentStore {
    db_path: PathBuf,
}

impl SqliteDocumentStore {
    /// Open (and migrate) the database once to validate the path.
    pub fn open(db_path: &Path) -> Result<Self, StorageError> {
        db::open_database(db_path)?;
        Ok(Self {
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connection(&self) -> Result<Connection, StorageError> {
        Ok(db::open_database(&self.db_path)?)
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StorageError> {
        let conn = self.connection()?;
        Ok(db::get_document(&conn, path)?)
    }

    fn merge_update(&self, path: &DocumentPath, update: &DocumentUpdate) -> Result<(), StorageError> {
        let conn = self.connection()?;
        db::merge_document(&conn, path, update).map_err(|e| match e {
            DatabaseError::NotFound { id, .. } => StorageError::NotFound(id),
            other => StorageError::Database(other),
        })
    }

    fn put_source(
        &self,
        path: &DocumentPath,
        transcript: Option<&str>,
        exam_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let conn = self.connection()?;
        db::upsert_document_source(&conn, path, transcript, exam_type)?;
        Ok(())
    }
}
