use crate::models::enums::PathKind;
use crate::models::{Document, DocumentPath, DocumentRef};

use super::types::DocumentStore;
use super::StorageError;

/// A document found by the dual-path lookup, with the path that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDocument {
    pub path: DocumentPath,
    pub kind: PathKind,
    pub document: Document,
}

/// Outcome of a dual-path lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(ResolvedDocument),
    NotFound { attempted: Vec<DocumentPath> },
}

/// Lookup order: primary path, then the scoped path when a scope is given.
/// A blank scope derives no secondary path.
pub fn candidate_paths(doc_ref: &DocumentRef) -> Vec<(PathKind, DocumentPath)> {
    let mut paths = vec![(
        PathKind::Primary,
        DocumentPath::primary(&doc_ref.patient_id, &doc_ref.exam_id),
    )];
    if let Some(scope) = doc_ref.scope_id.as_deref().filter(|s| !s.trim().is_empty()) {
        paths.push((
            PathKind::Secondary,
            DocumentPath::scoped(scope, &doc_ref.patient_id, &doc_ref.exam_id),
        ));
    }
    paths
}

/// Try each candidate path in order and return the first existing document.
pub fn resolve_document(store: &dyn DocumentStore, doc_ref: &DocumentRef) -> Result<Resolution, StorageError> {
    let mut attempted = Vec::new();
    for (kind, path) in candidate_paths(doc_ref) {
        if let Some(document) = store.get(&path)? {
            tracing::debug!(path = %path, kind = %kind, "Document resolved");
            return Ok(Resolution::Found(ResolvedDocument { path, kind, document }));
        }
        attempted.push(path);
    }
    Ok(Resolution::NotFound { attempted })
}
