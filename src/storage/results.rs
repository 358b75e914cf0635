//! Storage result types
//!
//! Caller-facing structures returned by operator operations.

use crate::storage::adapter::EntryKind;
use crate::visibility::Visibility;

/// Attributes of a file or directory, addressed by canonical path.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageAttributes {
    pub path: String,
    pub kind: EntryKind,
    pub size: Option<u64>,
    pub last_modified: Option<u64>,
    pub visibility: Option<Visibility>,
}

impl StorageAttributes {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}
