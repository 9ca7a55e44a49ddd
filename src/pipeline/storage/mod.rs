//! Document-store collaborator: the trait, two implementations, and the
//! dual-path resolver.

pub mod types;
pub mod sqlite_store;
pub mod memory_store;
pub mod resolve;

pub use types::*;
pub use sqlite_store::*;
pub use memory_store::*;
pub use resolve::*;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document store lock poisoned")]
    LockPoisoned,
}
