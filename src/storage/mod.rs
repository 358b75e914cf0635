//! Storage
//!
//! The backend adapter contract, the caller-facing operator and the
//! bundled adapters.

pub mod adapter;
pub mod local;
pub mod memory;
pub mod operator;
pub mod results;

pub use adapter::{
    EntryKind, NativeEntry, NativeMetadata, NativeVisibility, NativeWriteOptions, StorageAdapter,
};
pub use local::LocalAdapter;
pub use memory::MemoryAdapter;
pub use operator::{StorageOperator, WriteOptions};
pub use results::StorageAttributes;
