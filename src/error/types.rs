//! Error types
//!
//! Defines the error taxonomy shared by the path core, the visibility
//! converters, the adapters and the operator.

use std::fmt;
use std::io;

use thiserror::Error;

/// Operation that an adapter failed to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ReadFile,
    WriteFile,
    DeleteFile,
    DeleteDirectory,
    CreateDirectory,
    MoveFile,
    CopyFile,
    SetVisibility,
    RetrieveMetadata,
    CheckExistence,
    ListContents,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::ReadFile => "read file",
            Operation::WriteFile => "write file",
            Operation::DeleteFile => "delete file",
            Operation::DeleteDirectory => "delete directory",
            Operation::CreateDirectory => "create directory",
            Operation::MoveFile => "move file",
            Operation::CopyFile => "copy file",
            Operation::SetVisibility => "set visibility",
            Operation::RetrieveMetadata => "retrieve metadata",
            Operation::CheckExistence => "check existence",
            Operation::ListContents => "list contents",
        };
        f.write_str(name)
    }
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// The path would resolve above the virtual root. Carries the raw input.
    #[error("Path traversal detected: {path}")]
    PathTraversal { path: String },

    /// A string outside the closed public/private set reached the
    /// visibility boundary.
    #[error("Invalid visibility provided: {0}")]
    InvalidVisibility(String),

    #[error("Invalid visibility configuration: {0}")]
    InvalidVisibilityConfig(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("Unable to {operation} at {location}: {source}")]
    Io {
        operation: Operation,
        location: String,
        #[source]
        source: io::Error,
    },

    #[error("Unable to {operation} at {location}: {reason}")]
    Rejected {
        operation: Operation,
        location: String,
        reason: String,
    },
}

impl StorageError {
    pub fn io(operation: Operation, location: impl Into<String>, source: io::Error) -> Self {
        StorageError::Io {
            operation,
            location: location.into(),
            source,
        }
    }

    pub fn rejected(
        operation: Operation,
        location: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        StorageError::Rejected {
            operation,
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Replaces the backend-addressable location carried by adapter errors
    /// with the caller-facing path.
    pub fn at(self, caller_path: &str) -> Self {
        match self {
            StorageError::FileNotFound(_) => StorageError::FileNotFound(caller_path.to_string()),
            StorageError::DirectoryNotFound(_) => {
                StorageError::DirectoryNotFound(caller_path.to_string())
            }
            StorageError::Io {
                operation, source, ..
            } => StorageError::Io {
                operation,
                location: caller_path.to_string(),
                source,
            },
            StorageError::Rejected {
                operation, reason, ..
            } => StorageError::Rejected {
                operation,
                location: caller_path.to_string(),
                reason,
            },
            other => other,
        }
    }

    /// The operation this error belongs to, when raised by an adapter.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            StorageError::Io { operation, .. } | StorageError::Rejected { operation, .. } => {
                Some(*operation)
            }
            _ => None,
        }
    }
}
