//! Endpoint handlers.

pub mod exams;
pub mod health;
