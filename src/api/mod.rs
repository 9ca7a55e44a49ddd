//! HTTP transport for the analysis pipeline.
//!
//! Routes are nested under `/api/`. Handlers translate path and query
//! parameters into a `DocumentRef`, run the pipeline on the blocking pool,
//! and map `PipelineError` onto structured JSON errors.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer};
pub use types::ApiContext;
