//! Organ-level finding inference and overall case classification.
//!
//! Both are recall-oriented keyword heuristics over findings text. An
//! organ is flagged when one of its indicators appears anywhere after its
//! name. No evidence means `normal`, and negations ("bez złogów") are not
//! recognised, so the output documents the dictation rather than
//! adjudicating it.

pub mod vocabulary;
pub mod organs;
pub mod case;

pub use organs::*;
pub use case::*;
