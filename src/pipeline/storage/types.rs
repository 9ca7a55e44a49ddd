use crate::models::{Document, DocumentPath, DocumentUpdate};

use super::StorageError;

/// External document store (allows swapping SQLite for an in-memory map).
///
/// `merge_update` must be atomic per document: fields left `None` in the
/// update keep their stored value, and a missing document is `NotFound`.
pub trait DocumentStore {
    fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StorageError>;

    fn merge_update(&self, path: &DocumentPath, update: &DocumentUpdate) -> Result<(), StorageError>;

    /// Create a document or replace its transcript and exam type, keeping
    /// any stored analysis and report.
    fn put_source(
        &self,
        path: &DocumentPath,
        transcript: Option<&str>,
        exam_type: Option<&str>,
    ) -> Result<(), StorageError>;
}
