//! In-memory object-store adapter
//!
//! Behaves like an S3-style bucket: flat keys without a leading `/`,
//! directories as `/`-terminated marker keys and canned ACLs as
//! visibility.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use log::debug;
use tokio::sync::RwLock;

use crate::error::{Operation, StorageError};
use crate::path::PathPrefixer;
use crate::storage::adapter::{
    EntryKind, NativeEntry, NativeMetadata, NativeVisibility, NativeWriteOptions, StorageAdapter,
};
use crate::visibility::ObjectAcl;

#[derive(Debug, Clone)]
struct StoredObject {
    contents: Vec<u8>,
    acl: ObjectAcl,
    last_modified: u64,
}

impl StoredObject {
    fn is_marker(key: &str) -> bool {
        key.ends_with('/')
    }

    fn native_metadata(&self, kind: EntryKind) -> NativeMetadata<ObjectAcl> {
        NativeMetadata {
            kind,
            size: (kind == EntryKind::File).then_some(self.contents.len() as u64),
            last_modified: Some(self.last_modified),
            visibility: Some(self.acl),
        }
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|dur| dur.as_secs())
        .unwrap_or(0)
}

fn implicit_directory() -> NativeMetadata<ObjectAcl> {
    NativeMetadata {
        kind: EntryKind::Directory,
        size: None,
        last_modified: None,
        visibility: None,
    }
}

pub struct MemoryAdapter {
    prefixer: PathPrefixer,
    default_acl: ObjectAcl,
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl MemoryAdapter {
    /// An empty bucket whose keys all live under `prefix`.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefixer: PathPrefixer::for_object_store(prefix),
            default_acl: ObjectAcl::Private,
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    /// ACL given to objects written without an explicit one.
    pub fn with_default_acl(mut self, acl: ObjectAcl) -> Self {
        self.default_acl = acl;
        self
    }

    /// The mount root is always present, whatever the bucket holds.
    fn is_root(&self, location: &str) -> bool {
        location.is_empty() || location == self.prefixer.prefix()
    }

    /// Every raw key currently stored, prefix included.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }
}

fn marker_key(location: &str) -> String {
    format!("{}/", location.trim_end_matches('/'))
}

fn ensure_object_key(operation: Operation, location: &str) -> Result<(), StorageError> {
    if location.is_empty() || StoredObject::is_marker(location) {
        return Err(StorageError::rejected(
            operation,
            location,
            "object keys cannot name a directory",
        ));
    }
    Ok(())
}

#[async_trait]
impl StorageAdapter for MemoryAdapter {
    type Native = ObjectAcl;

    fn prefixer(&self) -> &PathPrefixer {
        &self.prefixer
    }

    async fn file_exists(&self, location: &str) -> Result<bool, StorageError> {
        if StoredObject::is_marker(location) {
            return Ok(false);
        }
        Ok(self.objects.read().await.contains_key(location))
    }

    async fn directory_exists(&self, location: &str) -> Result<bool, StorageError> {
        if self.is_root(location) {
            return Ok(true);
        }
        let objects = self.objects.read().await;
        let found = objects
            .range(location.to_string()..)
            .next()
            .is_some_and(|(key, _)| key.starts_with(location));
        Ok(found)
    }

    async fn write(
        &self,
        location: &str,
        contents: &[u8],
        options: NativeWriteOptions<ObjectAcl>,
    ) -> Result<(), StorageError> {
        ensure_object_key(Operation::WriteFile, location)?;

        let object = StoredObject {
            contents: contents.to_vec(),
            acl: options.file.unwrap_or(self.default_acl),
            last_modified: now_secs(),
        };
        self.objects.write().await.insert(location.to_string(), object);

        debug!("Put object {} ({} bytes)", location, contents.len());
        Ok(())
    }

    async fn read(&self, location: &str) -> Result<Vec<u8>, StorageError> {
        self.objects
            .read()
            .await
            .get(location)
            .filter(|_| !StoredObject::is_marker(location))
            .map(|object| object.contents.clone())
            .ok_or_else(|| StorageError::FileNotFound(location.to_string()))
    }

    async fn delete(&self, location: &str) -> Result<(), StorageError> {
        self.objects.write().await.remove(location);
        Ok(())
    }

    async fn delete_directory(&self, location: &str) -> Result<(), StorageError> {
        let mut objects = self.objects.write().await;
        let before = objects.len();
        objects.retain(|key, _| !key.starts_with(location));

        debug!("Deleted {} objects under {}", before - objects.len(), location);
        Ok(())
    }

    async fn create_directory(
        &self,
        location: &str,
        visibility: ObjectAcl,
    ) -> Result<(), StorageError> {
        if location.is_empty() {
            return Ok(());
        }

        let marker = StoredObject {
            contents: Vec::new(),
            acl: visibility,
            last_modified: now_secs(),
        };
        self.objects
            .write()
            .await
            .insert(marker_key(location), marker);
        Ok(())
    }

    async fn set_visibility(
        &self,
        location: &str,
        visibility: NativeVisibility<ObjectAcl>,
    ) -> Result<(), StorageError> {
        let mut objects = self.objects.write().await;

        if let Some(object) = objects.get_mut(location) {
            object.acl = visibility.file;
            return Ok(());
        }
        if let Some(marker) = objects.get_mut(&marker_key(location)) {
            marker.acl = visibility.directory;
            return Ok(());
        }
        Err(StorageError::FileNotFound(location.to_string()))
    }

    async fn metadata(&self, location: &str) -> Result<NativeMetadata<ObjectAcl>, StorageError> {
        if self.is_root(location) {
            return Ok(implicit_directory());
        }
        let objects = self.objects.read().await;

        if let Some(object) = objects.get(location) {
            return Ok(object.native_metadata(EntryKind::File));
        }

        let marker = marker_key(location);
        if let Some(object) = objects.get(&marker) {
            return Ok(object.native_metadata(EntryKind::Directory));
        }
        let has_children = objects
            .range(marker.clone()..)
            .next()
            .is_some_and(|(key, _)| key.starts_with(&marker));
        if has_children {
            return Ok(implicit_directory());
        }

        Err(StorageError::FileNotFound(location.to_string()))
    }

    async fn list_contents(
        &self,
        location: &str,
        deep: bool,
    ) -> Result<Vec<NativeEntry<ObjectAcl>>, StorageError> {
        let objects = self.objects.read().await;
        let mut listing: BTreeMap<String, NativeMetadata<ObjectAcl>> = BTreeMap::new();

        for (key, object) in objects.range(location.to_string()..) {
            let Some(rest) = key.strip_prefix(location) else {
                break;
            };
            if rest.is_empty() {
                continue;
            }

            // Every directory between `location` and the key.
            let depth_limit = if deep { usize::MAX } else { 1 };
            for (boundary, _) in rest.match_indices('/').take(depth_limit) {
                let directory = &key[..location.len() + boundary + 1];
                listing
                    .entry(directory.to_string())
                    .or_insert_with(implicit_directory);
            }

            if StoredObject::is_marker(key) {
                let in_scope = deep || rest.find('/') == Some(rest.len() - 1);
                if in_scope {
                    listing.insert(key.clone(), object.native_metadata(EntryKind::Directory));
                }
            } else if deep || !rest.contains('/') {
                listing.insert(key.clone(), object.native_metadata(EntryKind::File));
            }
        }

        Ok(listing
            .into_iter()
            .map(|(location, metadata)| NativeEntry { location, metadata })
            .collect())
    }

    async fn move_file(
        &self,
        source: &str,
        destination: &str,
        options: NativeWriteOptions<ObjectAcl>,
    ) -> Result<(), StorageError> {
        if StoredObject::is_marker(source) {
            return Err(StorageError::FileNotFound(source.to_string()));
        }
        ensure_object_key(Operation::MoveFile, destination)?;
        let mut objects = self.objects.write().await;
        let mut object = objects
            .remove(source)
            .ok_or_else(|| StorageError::FileNotFound(source.to_string()))?;

        if let Some(acl) = options.file {
            object.acl = acl;
        }
        objects.insert(destination.to_string(), object);
        Ok(())
    }

    async fn copy_file(
        &self,
        source: &str,
        destination: &str,
        options: NativeWriteOptions<ObjectAcl>,
    ) -> Result<(), StorageError> {
        ensure_object_key(Operation::CopyFile, destination)?;
        let mut objects = self.objects.write().await;
        let source_object = objects
            .get(source)
            .filter(|_| !StoredObject::is_marker(source))
            .ok_or_else(|| StorageError::FileNotFound(source.to_string()))?;

        let copy = StoredObject {
            contents: source_object.contents.clone(),
            acl: options.file.unwrap_or(self.default_acl),
            last_modified: now_secs(),
        };
        objects.insert(destination.to_string(), copy);
        Ok(())
    }
}
