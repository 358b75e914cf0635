//! Object-store ACL visibility
//!
//! Canned ACL identifiers used by S3-compatible object stores.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::visibility::{Visibility, VisibilityPolicy, VisibilityTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectAcl {
    PublicRead,
    PublicReadWrite,
    Private,
}

impl ObjectAcl {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectAcl::PublicRead => "public-read",
            ObjectAcl::PublicReadWrite => "public-read-write",
            ObjectAcl::Private => "private",
        }
    }
}

impl fmt::Display for ObjectAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectAcl {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public-read" => Ok(ObjectAcl::PublicRead),
            "public-read-write" => Ok(ObjectAcl::PublicReadWrite),
            "private" => Ok(ObjectAcl::Private),
            other => Err(StorageError::InvalidVisibility(other.to_string())),
        }
    }
}

pub type AclVisibility = VisibilityPolicy<ObjectAcl>;

impl Default for VisibilityTable<ObjectAcl> {
    fn default() -> Self {
        Self {
            file_public: ObjectAcl::PublicRead,
            file_private: ObjectAcl::Private,
            directory_public: ObjectAcl::PublicRead,
            directory_private: ObjectAcl::Private,
        }
    }
}

impl Default for VisibilityPolicy<ObjectAcl> {
    fn default() -> Self {
        Self::from_distinct(VisibilityTable::default(), Visibility::Public)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acl_strings() {
        for acl in [ObjectAcl::PublicRead, ObjectAcl::PublicReadWrite, ObjectAcl::Private] {
            assert_eq!(acl.as_str().parse::<ObjectAcl>().unwrap(), acl);
        }
        assert!(matches!(
            "authenticated-read".parse::<ObjectAcl>(),
            Err(StorageError::InvalidVisibility(_))
        ));
    }

    #[test]
    fn test_default_acl_policy() {
        let policy = AclVisibility::default();

        assert_eq!(policy.for_file(Visibility::Public), ObjectAcl::PublicRead);
        assert_eq!(policy.for_file(Visibility::Private), ObjectAcl::Private);
        assert_eq!(policy.default_for_directories(), ObjectAcl::PublicRead);
        assert_eq!(policy.inverse_for_file(ObjectAcl::Private), Visibility::Private);
        assert_eq!(policy.inverse_for_file(ObjectAcl::PublicReadWrite), Visibility::Public);
    }

    #[test]
    fn test_public_read_write_as_public_slot() {
        let policy = AclVisibility::new(
            VisibilityTable {
                file_public: ObjectAcl::PublicReadWrite,
                ..VisibilityTable::default()
            },
            Visibility::Private,
        )
        .unwrap()
        .with_unrecognized_fallback(Visibility::Private);

        assert_eq!(policy.for_file(Visibility::Public), ObjectAcl::PublicReadWrite);
        assert_eq!(policy.inverse_for_file(ObjectAcl::PublicRead), Visibility::Private);
        assert_eq!(policy.default_for_directories(), ObjectAcl::Private);
    }
}
