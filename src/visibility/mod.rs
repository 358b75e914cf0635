//! Visibility handling
//!
//! Abstract public/private visibility and its conversion to backend-native
//! permission values.

pub mod acl;
pub mod policy;
pub mod types;
pub mod unix;

pub use acl::{AclVisibility, ObjectAcl};
pub use policy::{VisibilityPolicy, VisibilityTable};
pub use types::Visibility;
pub use unix::UnixVisibility;
