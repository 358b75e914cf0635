//! Unix permission visibility
//!
//! Octal mode bits for local and Unix-style remote filesystems.

use crate::visibility::{Visibility, VisibilityPolicy, VisibilityTable};

pub const FILE_PUBLIC: u32 = 0o644;
pub const FILE_PRIVATE: u32 = 0o600;
pub const DIRECTORY_PUBLIC: u32 = 0o755;
pub const DIRECTORY_PRIVATE: u32 = 0o700;

/// Only the permission bits take part in visibility.
pub const PERMISSION_MASK: u32 = 0o777;

pub type UnixVisibility = VisibilityPolicy<u32>;

impl Default for VisibilityTable<u32> {
    fn default() -> Self {
        Self {
            file_public: FILE_PUBLIC,
            file_private: FILE_PRIVATE,
            directory_public: DIRECTORY_PUBLIC,
            directory_private: DIRECTORY_PRIVATE,
        }
    }
}

impl Default for VisibilityPolicy<u32> {
    fn default() -> Self {
        Self::from_distinct(VisibilityTable::default(), Visibility::Private)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_modes() {
        let policy = UnixVisibility::default();

        assert_eq!(policy.for_file(Visibility::Public), 0o644);
        assert_eq!(policy.for_file(Visibility::Private), 0o600);
        assert_eq!(policy.for_directory(Visibility::Public), 0o755);
        assert_eq!(policy.for_directory(Visibility::Private), 0o700);
        assert_eq!(policy.default_for_directories(), 0o700);
    }

    #[test]
    fn test_inverse_of_default_modes() {
        let policy = UnixVisibility::default();

        assert_eq!(policy.inverse_for_file(0o644), Visibility::Public);
        assert_eq!(policy.inverse_for_file(0o600), Visibility::Private);
        assert_eq!(policy.inverse_for_directory(0o755), Visibility::Public);
        assert_eq!(policy.inverse_for_directory(0o700), Visibility::Private);
        assert_eq!(policy.inverse_for_file(0o664), Visibility::Public);
    }

    #[test]
    fn test_custom_modes_via_constructor() {
        let policy = UnixVisibility::new(
            VisibilityTable {
                file_public: 0o640,
                file_private: 0o604,
                directory_public: 0o740,
                directory_private: 0o7604,
            },
            Visibility::Public,
        )
        .unwrap();

        assert_eq!(policy.for_file(Visibility::Public), 0o640);
        assert_eq!(policy.for_file(Visibility::Private), 0o604);
        assert_eq!(policy.for_directory(Visibility::Private), 0o7604);
        assert_eq!(policy.default_for_directories(), 0o740);
    }
}
