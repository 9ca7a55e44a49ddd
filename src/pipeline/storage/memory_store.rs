use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{Document, DocumentPath, DocumentUpdate};

use super::types::DocumentStore;
use super::StorageError;

/// In-memory document store for tests and embedding.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<DocumentPath, Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a complete document, replacing any existing one.
    pub fn insert(&self, path: DocumentPath, document: Document) -> Result<(), StorageError> {
        self.documents
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?
            .insert(path, document);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.documents.lock().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StorageError> {
        let docs = self.documents.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(docs.get(path).cloned())
    }

    fn merge_update(&self, path: &DocumentPath, update: &DocumentUpdate) -> Result<(), StorageError> {
        let mut docs = self.documents.lock().map_err(|_| StorageError::LockPoisoned)?;
        let doc = docs
            .get_mut(path)
            .ok_or_else(|| StorageError::NotFound(path.to_string()))?;
        update.merge_into(doc);
        Ok(())
    }

    fn put_source(
        &self,
        path: &DocumentPath,
        transcript: Option<&str>,
        exam_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let mut docs = self.documents.lock().map_err(|_| StorageError::LockPoisoned)?;
        let doc = docs.entry(path.clone()).or_default();
        doc.transcript = transcript.map(str::to_string);
        doc.exam_type = exam_type.map(str::to_string);
        Ok(())
    }
}
