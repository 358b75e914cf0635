//! Path handling
//!
//! Canonicalizes caller paths and maps them into backend namespaces.

pub mod normalizer;
pub mod prefixer;

pub use normalizer::normalize_path;
pub use prefixer::{PathPrefixer, StripStrategy};
