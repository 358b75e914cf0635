//! Local disk adapter
//!
//! Stores files below a root directory and expresses visibility as Unix
//! permission bits.

use std::io::ErrorKind;
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use log::{debug, error, info};
use tokio::fs;

use crate::error::{Operation, StorageError};
use crate::path::PathPrefixer;
use crate::storage::adapter::{
    EntryKind, NativeEntry, NativeMetadata, NativeVisibility, NativeWriteOptions, StorageAdapter,
};

pub struct LocalAdapter {
    root: PathBuf,
    prefixer: PathPrefixer,
}

impl LocalAdapter {
    /// Opens `root`, creating it with `root_mode` when missing.
    pub async fn new(root: impl AsRef<Path>, root_mode: u32) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        let root_str = root.to_string_lossy().to_string();

        ensure_directory(&root, root_mode).await?;
        info!("Local storage root: {}", root.display());

        Ok(Self {
            prefixer: PathPrefixer::with_separator(&root_str, MAIN_SEPARATOR_STR),
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Creates `path` and any missing ancestors, applying `mode` to each
/// directory this call creates.
async fn ensure_directory(path: &Path, mode: u32) -> Result<(), StorageError> {
    let mut missing = Vec::new();
    let mut current = Some(path);

    while let Some(dir) = current {
        if dir.as_os_str().is_empty() || fs::metadata(dir).await.is_ok() {
            break;
        }
        missing.push(dir.to_path_buf());
        current = dir.parent();
    }

    for dir in missing.into_iter().rev() {
        match fs::create_dir(&dir).await {
            Ok(()) => apply_mode(&dir, mode, Operation::CreateDirectory).await?,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => {
                error!("Failed to create directory {}: {}", dir.display(), e);
                return Err(StorageError::io(
                    Operation::CreateDirectory,
                    dir.to_string_lossy(),
                    e,
                ));
            }
        }
    }

    Ok(())
}

async fn ensure_parent(location: &str, mode: u32) -> Result<(), StorageError> {
    match Path::new(location).parent() {
        Some(parent) => ensure_directory(parent, mode).await,
        None => Ok(()),
    }
}

#[cfg(unix)]
async fn apply_mode(path: &Path, mode: u32, operation: Operation) -> Result<(), StorageError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .await
        .map_err(|e| StorageError::io(operation, path.to_string_lossy(), e))
}

#[cfg(not(unix))]
async fn apply_mode(_path: &Path, _mode: u32, _operation: Operation) -> Result<(), StorageError> {
    Ok(())
}

#[cfg(unix)]
fn read_mode(metadata: &std::fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;

    Some(metadata.permissions().mode() & crate::visibility::unix::PERMISSION_MASK)
}

#[cfg(not(unix))]
fn read_mode(_metadata: &std::fs::Metadata) -> Option<u32> {
    None
}

fn native_metadata(metadata: &std::fs::Metadata) -> NativeMetadata<u32> {
    let kind = if metadata.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    };
    let last_modified = metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|dur| dur.as_secs());

    NativeMetadata {
        kind,
        size: (kind == EntryKind::File).then(|| metadata.len()),
        last_modified,
        visibility: read_mode(metadata),
    }
}

/// A missing entry, or a path that runs through a regular file.
fn is_absent(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

fn not_found_or(
    e: std::io::Error,
    operation: Operation,
    location: &str,
    not_found: StorageError,
) -> StorageError {
    if is_absent(&e) {
        not_found
    } else {
        error!("Failed to {} at {}: {}", operation, location, e);
        StorageError::io(operation, location, e)
    }
}

#[async_trait]
impl StorageAdapter for LocalAdapter {
    type Native = u32;

    fn prefixer(&self) -> &PathPrefixer {
        &self.prefixer
    }

    async fn file_exists(&self, location: &str) -> Result<bool, StorageError> {
        match fs::metadata(location).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if is_absent(&e) => Ok(false),
            Err(e) => Err(StorageError::io(Operation::CheckExistence, location, e)),
        }
    }

    async fn directory_exists(&self, location: &str) -> Result<bool, StorageError> {
        match fs::metadata(location).await {
            Ok(metadata) => Ok(metadata.is_dir()),
            Err(e) if is_absent(&e) => Ok(false),
            Err(e) => Err(StorageError::io(Operation::CheckExistence, location, e)),
        }
    }

    async fn write(
        &self,
        location: &str,
        contents: &[u8],
        options: NativeWriteOptions<u32>,
    ) -> Result<(), StorageError> {
        ensure_parent(location, options.directory).await?;

        fs::write(location, contents).await.map_err(|e| {
            error!("Failed to write {}: {}", location, e);
            StorageError::io(Operation::WriteFile, location, e)
        })?;

        if let Some(mode) = options.file {
            apply_mode(Path::new(location), mode, Operation::WriteFile).await?;
        }

        debug!("Wrote {} ({} bytes)", location, contents.len());
        Ok(())
    }

    async fn read(&self, location: &str) -> Result<Vec<u8>, StorageError> {
        fs::read(location).await.map_err(|e| {
            not_found_or(
                e,
                Operation::ReadFile,
                location,
                StorageError::FileNotFound(location.to_string()),
            )
        })
    }

    async fn delete(&self, location: &str) -> Result<(), StorageError> {
        match fs::remove_file(location).await {
            Ok(()) => Ok(()),
            Err(e) if is_absent(&e) => Ok(()),
            Err(e) => {
                error!("Failed to delete {}: {}", location, e);
                Err(StorageError::io(Operation::DeleteFile, location, e))
            }
        }
    }

    async fn delete_directory(&self, location: &str) -> Result<(), StorageError> {
        match fs::remove_dir_all(location).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                error!("Failed to delete directory {}: {}", location, e);
                Err(StorageError::io(Operation::DeleteDirectory, location, e))
            }
        }
    }

    async fn create_directory(&self, location: &str, visibility: u32) -> Result<(), StorageError> {
        let path = Path::new(location);
        match fs::metadata(path).await {
            Ok(metadata) if metadata.is_dir() => {
                apply_mode(path, visibility, Operation::CreateDirectory).await
            }
            Ok(_) => Err(StorageError::rejected(
                Operation::CreateDirectory,
                location,
                "a file already exists at this location",
            )),
            Err(_) => ensure_directory(path, visibility).await,
        }
    }

    async fn set_visibility(
        &self,
        location: &str,
        visibility: NativeVisibility<u32>,
    ) -> Result<(), StorageError> {
        let metadata = fs::metadata(location).await.map_err(|e| {
            not_found_or(
                e,
                Operation::SetVisibility,
                location,
                StorageError::FileNotFound(location.to_string()),
            )
        })?;

        let mode = if metadata.is_dir() {
            visibility.directory
        } else {
            visibility.file
        };
        apply_mode(Path::new(location), mode, Operation::SetVisibility).await
    }

    async fn metadata(&self, location: &str) -> Result<NativeMetadata<u32>, StorageError> {
        let metadata = fs::metadata(location).await.map_err(|e| {
            not_found_or(
                e,
                Operation::RetrieveMetadata,
                location,
                StorageError::FileNotFound(location.to_string()),
            )
        })?;

        Ok(native_metadata(&metadata))
    }

    async fn list_contents(
        &self,
        location: &str,
        deep: bool,
    ) -> Result<Vec<NativeEntry<u32>>, StorageError> {
        let mut entries = Vec::new();
        let mut pending = vec![PathBuf::from(location)];

        while let Some(dir) = pending.pop() {
            let mut reader = match fs::read_dir(&dir).await {
                Ok(reader) => reader,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) if e.kind() == ErrorKind::NotADirectory => {
                    return Err(StorageError::DirectoryNotFound(location.to_string()));
                }
                Err(e) => {
                    error!("Failed to list {}: {}", dir.display(), e);
                    return Err(StorageError::io(
                        Operation::ListContents,
                        dir.to_string_lossy(),
                        e,
                    ));
                }
            };

            while let Some(entry) = reader
                .next_entry()
                .await
                .map_err(|e| StorageError::io(Operation::ListContents, location, e))?
            {
                let path = entry.path();
                let metadata = entry
                    .metadata()
                    .await
                    .map_err(|e| StorageError::io(Operation::ListContents, location, e))?;
                let native = native_metadata(&metadata);

                if deep && native.kind == EntryKind::Directory {
                    pending.push(path.clone());
                }
                entries.push(NativeEntry {
                    location: path.to_string_lossy().to_string(),
                    metadata: native,
                });
            }
        }

        entries.sort_by(|a, b| a.location.cmp(&b.location));
        Ok(entries)
    }

    async fn move_file(
        &self,
        source: &str,
        destination: &str,
        options: NativeWriteOptions<u32>,
    ) -> Result<(), StorageError> {
        if !self.file_exists(source).await? {
            return Err(StorageError::FileNotFound(source.to_string()));
        }
        ensure_parent(destination, options.directory).await?;

        fs::rename(source, destination).await.map_err(|e| {
            error!("Failed to move {} to {}: {}", source, destination, e);
            StorageError::io(Operation::MoveFile, source, e)
        })?;

        if let Some(mode) = options.file {
            apply_mode(Path::new(destination), mode, Operation::MoveFile).await?;
        }
        Ok(())
    }

    async fn copy_file(
        &self,
        source: &str,
        destination: &str,
        options: NativeWriteOptions<u32>,
    ) -> Result<(), StorageError> {
        if !self.file_exists(source).await? {
            return Err(StorageError::FileNotFound(source.to_string()));
        }
        ensure_parent(destination, options.directory).await?;

        fs::copy(source, destination).await.map_err(|e| {
            error!("Failed to copy {} to {}: {}", source, destination, e);
            StorageError::io(Operation::CopyFile, source, e)
        })?;

        if let Some(mode) = options.file {
            apply_mode(Path::new(destination), mode, Operation::CopyFile).await?;
        }
        Ok(())
    }
}
