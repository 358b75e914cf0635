//! Portable visibility conversion
//!
//! Table-driven mapping between [`Visibility`] and a backend's native
//! permission value. Nothing here assumes numeric structure in the native
//! type: Unix modes and object-store ACL identifiers share one shape.

use std::fmt::Debug;

use crate::error::StorageError;
use crate::visibility::Visibility;

/// The four native slots of a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityTable<N> {
    pub file_public: N,
    pub file_private: N,
    pub directory_public: N,
    pub directory_private: N,
}

/// Converts between abstract visibility and one backend family's natives.
///
/// The forward mapping is total. The inverse falls back to a configurable
/// value (PUBLIC unless overridden) for natives the table does not know,
/// e.g. a `0o664` file written by another tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityPolicy<N> {
    table: VisibilityTable<N>,
    default_for_directories: Visibility,
    unrecognized_fallback: Visibility,
}

impl<N: Copy + PartialEq + Debug> VisibilityPolicy<N> {
    /// Builds a policy, rejecting tables whose public and private slots
    /// collide (the inverse could not tell them apart).
    pub fn new(
        table: VisibilityTable<N>,
        default_for_directories: Visibility,
    ) -> Result<Self, StorageError> {
        if table.file_public == table.file_private {
            return Err(StorageError::InvalidVisibilityConfig(format!(
                "file public and private values are both {:?}",
                table.file_public
            )));
        }
        if table.directory_public == table.directory_private {
            return Err(StorageError::InvalidVisibilityConfig(format!(
                "directory public and private values are both {:?}",
                table.directory_public
            )));
        }

        Ok(Self {
            table,
            default_for_directories,
            unrecognized_fallback: Visibility::Public,
        })
    }

    /// For built-in tables already known to be distinct.
    pub(crate) fn from_distinct(
        table: VisibilityTable<N>,
        default_for_directories: Visibility,
    ) -> Self {
        Self {
            table,
            default_for_directories,
            unrecognized_fallback: Visibility::Public,
        }
    }

    /// Changes what the inverse mapping returns for unknown natives.
    pub fn with_unrecognized_fallback(mut self, fallback: Visibility) -> Self {
        self.unrecognized_fallback = fallback;
        self
    }

    pub fn table(&self) -> &VisibilityTable<N> {
        &self.table
    }

    pub fn for_file(&self, visibility: Visibility) -> N {
        match visibility {
            Visibility::Public => self.table.file_public,
            Visibility::Private => self.table.file_private,
        }
    }

    pub fn for_directory(&self, visibility: Visibility) -> N {
        match visibility {
            Visibility::Public => self.table.directory_public,
            Visibility::Private => self.table.directory_private,
        }
    }

    pub fn inverse_for_file(&self, native: N) -> Visibility {
        self.try_inverse_for_file(native)
            .unwrap_or(self.unrecognized_fallback)
    }

    pub fn inverse_for_directory(&self, native: N) -> Visibility {
        self.try_inverse_for_directory(native)
            .unwrap_or(self.unrecognized_fallback)
    }

    /// Strict inverse: `None` for natives outside the file pair.
    pub fn try_inverse_for_file(&self, native: N) -> Option<Visibility> {
        if native == self.table.file_public {
            Some(Visibility::Public)
        } else if native == self.table.file_private {
            Some(Visibility::Private)
        } else {
            None
        }
    }

    pub fn try_inverse_for_directory(&self, native: N) -> Option<Visibility> {
        if native == self.table.directory_public {
            Some(Visibility::Public)
        } else if native == self.table.directory_private {
            Some(Visibility::Private)
        } else {
            None
        }
    }

    /// Native value for directories created without an explicit visibility.
    pub fn default_for_directories(&self) -> N {
        self.for_directory(self.default_for_directories)
    }
}
