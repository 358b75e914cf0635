//! Storage operator
//!
//! Caller-facing facade over one adapter. Every path is normalized and
//! prefixed on each call, and every visibility crosses the adapter's
//! [`VisibilityPolicy`] on the way in and out.

use log::{debug, info};

use crate::error::{Operation, StorageError};
use crate::path::normalize_path;
use crate::storage::adapter::{
    EntryKind, NativeMetadata, NativeVisibility, NativeWriteOptions, StorageAdapter,
};
use crate::storage::results::StorageAttributes;
use crate::visibility::{Visibility, VisibilityPolicy};

/// Per-call options for writes, directory creation, moves and copies.
///
/// Unset fields fall back to the operator defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WriteOptions {
    pub visibility: Option<Visibility>,
    pub directory_visibility: Option<Visibility>,
    /// Copy the source's visibility onto a copy target. Defaults to true.
    pub retain_visibility: Option<bool>,
}

impl WriteOptions {
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn directory_visibility(mut self, visibility: Visibility) -> Self {
        self.directory_visibility = Some(visibility);
        self
    }

    pub fn retain_visibility(mut self, retain: bool) -> Self {
        self.retain_visibility = Some(retain);
        self
    }

    fn merged_over(&self, defaults: &WriteOptions) -> WriteOptions {
        WriteOptions {
            visibility: self.visibility.or(defaults.visibility),
            directory_visibility: self.directory_visibility.or(defaults.directory_visibility),
            retain_visibility: self.retain_visibility.or(defaults.retain_visibility),
        }
    }
}

pub struct StorageOperator<A: StorageAdapter> {
    adapter: A,
    policy: VisibilityPolicy<A::Native>,
    defaults: WriteOptions,
}

impl<A: StorageAdapter> StorageOperator<A> {
    pub fn new(adapter: A, policy: VisibilityPolicy<A::Native>) -> Self {
        Self {
            adapter,
            policy,
            defaults: WriteOptions::default(),
        }
    }

    /// Sets operator-wide defaults merged under every per-call option.
    pub fn with_defaults(mut self, defaults: WriteOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn policy(&self) -> &VisibilityPolicy<A::Native> {
        &self.policy
    }

    /// Returns `(canonical, backend location)` for a file path.
    fn file_location(&self, path: &str) -> Result<(String, String), StorageError> {
        let canonical = normalize_path(path)?;
        let location = self.adapter.prefixer().prefix_path(&canonical);
        Ok((canonical, location))
    }

    /// Returns `(canonical, backend location)` for a directory path.
    fn directory_location(&self, path: &str) -> Result<(String, String), StorageError> {
        let canonical = normalize_path(path)?;
        let location = self.adapter.prefixer().prefix_directory_path(&canonical);
        Ok((canonical, location))
    }

    fn native_options(&self, options: &WriteOptions) -> NativeWriteOptions<A::Native> {
        let merged = options.merged_over(&self.defaults);

        NativeWriteOptions {
            file: merged.visibility.map(|v| self.policy.for_file(v)),
            directory: merged
                .directory_visibility
                .map_or_else(|| self.policy.default_for_directories(), |v| {
                    self.policy.for_directory(v)
                }),
        }
    }

    /// Source-side failures keep the source path, everything else is
    /// reported against the destination.
    fn transfer_error(error: StorageError, source: &str, destination: &str) -> StorageError {
        match error {
            StorageError::FileNotFound(_) => error.at(source),
            other => other.at(destination),
        }
    }

    fn attributes(&self, path: String, native: NativeMetadata<A::Native>) -> StorageAttributes {
        let visibility = native.visibility.map(|n| match native.kind {
            EntryKind::File => self.policy.inverse_for_file(n),
            EntryKind::Directory => self.policy.inverse_for_directory(n),
        });

        StorageAttributes {
            path,
            kind: native.kind,
            size: native.size,
            last_modified: native.last_modified,
            visibility,
        }
    }

    pub async fn file_exists(&self, path: &str) -> Result<bool, StorageError> {
        let (canonical, location) = self.file_location(path)?;
        self.adapter
            .file_exists(&location)
            .await
            .map_err(|e| e.at(&canonical))
    }

    pub async fn directory_exists(&self, path: &str) -> Result<bool, StorageError> {
        let (canonical, location) = self.directory_location(path)?;
        self.adapter
            .directory_exists(&location)
            .await
            .map_err(|e| e.at(&canonical))
    }

    /// True when either a file or a directory lives at `path`.
    pub async fn has(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self.file_exists(path).await? || self.directory_exists(path).await?)
    }

    pub async fn write(
        &self,
        path: &str,
        contents: &[u8],
        options: WriteOptions,
    ) -> Result<(), StorageError> {
        let (canonical, location) = self.file_location(path)?;
        let native = self.native_options(&options);

        self.adapter
            .write(&location, contents, native)
            .await
            .map_err(|e| e.at(&canonical))?;

        info!("Wrote {} bytes to {}", contents.len(), canonical);
        Ok(())
    }

    pub async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let (canonical, location) = self.file_location(path)?;
        let contents = self
            .adapter
            .read(&location)
            .await
            .map_err(|e| e.at(&canonical))?;

        debug!("Read {} bytes from {}", contents.len(), canonical);
        Ok(contents)
    }

    pub async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let (canonical, location) = self.file_location(path)?;
        self.adapter
            .delete(&location)
            .await
            .map_err(|e| e.at(&canonical))?;

        info!("Deleted {}", canonical);
        Ok(())
    }

    /// Deletes a directory and everything below it. The root itself is
    /// refused.
    pub async fn delete_directory(&self, path: &str) -> Result<(), StorageError> {
        let (canonical, location) = self.directory_location(path)?;
        if canonical.is_empty() {
            return Err(StorageError::rejected(
                Operation::DeleteDirectory,
                canonical,
                "refusing to delete the storage root",
            ));
        }

        self.adapter
            .delete_directory(&location)
            .await
            .map_err(|e| e.at(&canonical))?;

        info!("Deleted directory {}", canonical);
        Ok(())
    }

    pub async fn create_directory(
        &self,
        path: &str,
        options: WriteOptions,
    ) -> Result<(), StorageError> {
        let (canonical, location) = self.directory_location(path)?;
        let native = self.native_options(&options);

        self.adapter
            .create_directory(&location, native.directory)
            .await
            .map_err(|e| e.at(&canonical))?;

        info!("Created directory {}", canonical);
        Ok(())
    }

    /// Lists entries below `path`, recursively when `deep` is set.
    pub async fn list_contents(
        &self,
        path: &str,
        deep: bool,
    ) -> Result<Vec<StorageAttributes>, StorageError> {
        let (canonical, location) = self.directory_location(path)?;
        let entries = self
            .adapter
            .list_contents(&location, deep)
            .await
            .map_err(|e| e.at(&canonical))?;

        let prefixer = self.adapter.prefixer();
        let listing: Vec<StorageAttributes> = entries
            .into_iter()
            .map(|entry| {
                let path = match entry.metadata.kind {
                    EntryKind::File => prefixer.strip_prefix(&entry.location),
                    EntryKind::Directory => prefixer.strip_directory_prefix(&entry.location),
                };
                self.attributes(path.to_string(), entry.metadata)
            })
            .collect();

        debug!("Listed {} entries under {:?}", listing.len(), canonical);
        Ok(listing)
    }

    /// Moves a file. Moving a path onto itself does nothing.
    pub async fn move_file(
        &self,
        source: &str,
        destination: &str,
        options: WriteOptions,
    ) -> Result<(), StorageError> {
        let (source, source_location) = self.file_location(source)?;
        let (destination, destination_location) = self.file_location(destination)?;
        if destination.is_empty() {
            return Err(StorageError::rejected(
                Operation::MoveFile,
                destination,
                "the storage root is not a file",
            ));
        }
        if source == destination {
            debug!("Skipping move of {} onto itself", source);
            return Ok(());
        }

        let native = self.native_options(&options);
        self.adapter
            .move_file(&source_location, &destination_location, native)
            .await
            .map_err(|e| Self::transfer_error(e, &source, &destination))?;

        info!("Moved {} to {}", source, destination);
        Ok(())
    }

    /// Copies a file. Without an explicit visibility the source's
    /// visibility is carried over unless `retain_visibility` is false.
    pub async fn copy_file(
        &self,
        source: &str,
        destination: &str,
        options: WriteOptions,
    ) -> Result<(), StorageError> {
        let (source, source_location) = self.file_location(source)?;
        let (destination, destination_location) = self.file_location(destination)?;
        if destination.is_empty() {
            return Err(StorageError::rejected(
                Operation::CopyFile,
                destination,
                "the storage root is not a file",
            ));
        }
        if source == destination {
            debug!("Skipping copy of {} onto itself", source);
            return Ok(());
        }

        let merged = options.merged_over(&self.defaults);
        let mut native = self.native_options(&options);
        if options.visibility.is_none() && merged.retain_visibility.unwrap_or(true) {
            let metadata = self
                .adapter
                .metadata(&source_location)
                .await
                .map_err(|e| e.at(&source))?;
            native.file = metadata.visibility.or(native.file);
        }

        self.adapter
            .copy_file(&source_location, &destination_location, native)
            .await
            .map_err(|e| Self::transfer_error(e, &source, &destination))?;

        info!("Copied {} to {}", source, destination);
        Ok(())
    }

    pub async fn set_visibility(
        &self,
        path: &str,
        visibility: Visibility,
    ) -> Result<(), StorageError> {
        let (canonical, location) = self.file_location(path)?;
        let native = NativeVisibility {
            file: self.policy.for_file(visibility),
            directory: self.policy.for_directory(visibility),
        };

        self.adapter
            .set_visibility(&location, native)
            .await
            .map_err(|e| e.at(&canonical))?;

        info!("Set visibility of {} to {}", canonical, visibility);
        Ok(())
    }

    pub async fn metadata(&self, path: &str) -> Result<StorageAttributes, StorageError> {
        let (canonical, location) = self.file_location(path)?;
        let native = self
            .adapter
            .metadata(&location)
            .await
            .map_err(|e| e.at(&canonical))?;

        Ok(self.attributes(canonical, native))
    }

    pub async fn visibility(&self, path: &str) -> Result<Visibility, StorageError> {
        let attributes = self.metadata(path).await?;
        attributes.visibility.ok_or_else(|| {
            StorageError::rejected(
                Operation::RetrieveMetadata,
                attributes.path,
                "visibility is not tracked for this entry",
            )
        })
    }

    pub async fn file_size(&self, path: &str) -> Result<u64, StorageError> {
        let attributes = self.metadata(path).await?;
        attributes.size.ok_or_else(|| {
            StorageError::rejected(
                Operation::RetrieveMetadata,
                attributes.path,
                "size is not available for a directory",
            )
        })
    }

    /// Last modification time in Unix epoch seconds.
    pub async fn last_modified(&self, path: &str) -> Result<u64, StorageError> {
        let attributes = self.metadata(path).await?;
        attributes.last_modified.ok_or_else(|| {
            StorageError::rejected(
                Operation::RetrieveMetadata,
                attributes.path,
                "last modified time is not available",
            )
        })
    }
}
