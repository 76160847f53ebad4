//! # storage-adapters
//!
//! Implementations of the `domains` store ports.

#[cfg(feature = "memory")]
pub mod memory;
pub mod snapshot;

#[cfg(feature = "memory")]
pub use memory::MemoryStore;
pub use snapshot::{Snapshot, SnapshotError};
