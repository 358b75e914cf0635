//! Configuration management for RAX Storage
//!
//! Loads the mount configuration from an optional TOML file with
//! environment overrides and turns it into typed visibility policies.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::visibility::{UnixVisibility, Visibility, VisibilityTable};

/// Highest value a Unix permission field may take.
const MAX_MODE: u32 = 0o7777;

/// Which backend the mount is served by
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    Local,
    Memory,
}

/// Complete storage configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Backend serving the mount
    /// Environment: RAX_STORAGE_ADAPTER
    #[serde(default = "default_adapter")]
    pub adapter: AdapterKind,

    /// Root directory (local) or key prefix (memory)
    /// Environment: RAX_STORAGE_ROOT
    pub root: String,

    /// Visibility applied to written files when a call sets none
    #[serde(default)]
    pub default_visibility: Option<Visibility>,

    /// Visibility of directories created without an explicit one
    #[serde(default = "default_directory_visibility")]
    pub directory_visibility: Visibility,

    /// Unix modes backing each visibility (TOML only)
    #[serde(default)]
    pub permissions: PermissionsConfig,
}

/// Unix permission bits per visibility
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PermissionsConfig {
    pub file_public: u32,
    pub file_private: u32,
    pub dir_public: u32,
    pub dir_private: u32,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        let table = VisibilityTable::<u32>::default();
        Self {
            file_public: table.file_public,
            file_private: table.file_private,
            dir_public: table.directory_public,
            dir_private: table.directory_private,
        }
    }
}

fn default_adapter() -> AdapterKind {
    AdapterKind::Local
}

fn default_directory_visibility() -> Visibility {
    Visibility::Private
}

impl StorageConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .set_default("root", "./storage_root")?
            .add_source(File::with_name("rax-storage").required(false))
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("RAX_STORAGE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: StorageConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.root.trim().is_empty() {
            return Err(config::ConfigError::Message("root cannot be empty".into()));
        }

        let permissions = &self.permissions;
        for (name, mode) in [
            ("file_public", permissions.file_public),
            ("file_private", permissions.file_private),
            ("dir_public", permissions.dir_public),
            ("dir_private", permissions.dir_private),
        ] {
            if mode > MAX_MODE {
                return Err(config::ConfigError::Message(format!(
                    "permissions.{name} is not a valid mode: {mode:o}"
                )));
            }
        }

        self.visibility_policy()
            .map(|_| ())
            .map_err(|e| config::ConfigError::Message(e.to_string()))
    }

    /// Get root as PathBuf
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }

    /// Build the Unix visibility policy described by this configuration
    pub fn visibility_policy(&self) -> Result<UnixVisibility, crate::error::StorageError> {
        UnixVisibility::new(
            VisibilityTable {
                file_public: self.permissions.file_public,
                file_private: self.permissions.file_private,
                directory_public: self.permissions.dir_public,
                directory_private: self.permissions.dir_private,
            },
            self.directory_visibility,
        )
    }
}
