//! Backend adapter contract
//!
//! Adapters operate on backend-addressable locations that were already
//! normalized and prefixed by the operator, and speak their own native
//! permission type.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::path::PathPrefixer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Metadata as reported by a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeMetadata<N> {
    pub kind: EntryKind,
    /// Size in bytes; `None` for directories.
    pub size: Option<u64>,
    /// Last modification time (Unix epoch seconds).
    pub last_modified: Option<u64>,
    pub visibility: Option<N>,
}

/// A listing entry at a backend-addressable location.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeEntry<N> {
    pub location: String,
    pub metadata: NativeMetadata<N>,
}

/// Native permissions applied while writing, moving or copying.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeWriteOptions<N> {
    /// Permission for the file itself; `None` keeps the backend default.
    pub file: Option<N>,
    /// Permission for any parent directory the backend has to create.
    pub directory: N,
}

/// Both candidates for a visibility change; the adapter picks the one
/// matching the entry it finds at the location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeVisibility<N> {
    pub file: N,
    pub directory: N,
}

/// Operations every storage backend provides.
///
/// File locations come from [`PathPrefixer::prefix_path`]; directory
/// locations (`directory_exists`, `create_directory`, `delete_directory`,
/// `list_contents`) come from [`PathPrefixer::prefix_directory_path`].
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Backend-native permission value.
    type Native: Copy + PartialEq + Debug + Send + Sync + 'static;

    /// The prefixer bound to this adapter's root.
    fn prefixer(&self) -> &PathPrefixer;

    async fn file_exists(&self, location: &str) -> Result<bool, StorageError>;

    async fn directory_exists(&self, location: &str) -> Result<bool, StorageError>;

    async fn write(
        &self,
        location: &str,
        contents: &[u8],
        options: NativeWriteOptions<Self::Native>,
    ) -> Result<(), StorageError>;

    async fn read(&self, location: &str) -> Result<Vec<u8>, StorageError>;

    /// Deleting a missing file is not an error.
    async fn delete(&self, location: &str) -> Result<(), StorageError>;

    async fn delete_directory(&self, location: &str) -> Result<(), StorageError>;

    async fn create_directory(
        &self,
        location: &str,
        visibility: Self::Native,
    ) -> Result<(), StorageError>;

    async fn set_visibility(
        &self,
        location: &str,
        visibility: NativeVisibility<Self::Native>,
    ) -> Result<(), StorageError>;

    async fn metadata(&self, location: &str)
    -> Result<NativeMetadata<Self::Native>, StorageError>;

    async fn list_contents(
        &self,
        location: &str,
        deep: bool,
    ) -> Result<Vec<NativeEntry<Self::Native>>, StorageError>;

    async fn move_file(
        &self,
        source: &str,
        destination: &str,
        options: NativeWriteOptions<Self::Native>,
    ) -> Result<(), StorageError>;

    async fn copy_file(
        &self,
        source: &str,
        destination: &str,
        options: NativeWriteOptions<Self::Native>,
    ) -> Result<(), StorageError>;
}
