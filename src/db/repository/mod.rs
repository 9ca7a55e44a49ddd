//! Repository layer: document-scoped database operations.

mod document;

pub use document::*;
