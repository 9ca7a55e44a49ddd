pub mod analysis;
pub mod document;
pub mod enums;

pub use analysis::*;
pub use document::*;
