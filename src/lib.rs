//! RAX Storage
//!
//! A backend-agnostic contract for file storage. Caller paths are
//! normalized and prefixed per mount, and an abstract public/private
//! visibility is translated to each backend's native permissions.

pub mod config;
pub mod error;
pub mod path;
pub mod storage;
pub mod visibility;

pub use error::StorageError;
pub use path::{PathPrefixer, normalize_path};
pub use storage::{StorageAdapter, StorageOperator, WriteOptions};
pub use visibility::{Visibility, VisibilityPolicy};
