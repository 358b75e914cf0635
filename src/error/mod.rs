//! Error handling
//!
//! Defines error types for path handling, visibility conversion and
//! adapter operations.

pub mod types;

pub use types::*;
