//! chirp/crates/domains/src/lib.rs
//!
//! The central entities, store ports and invariant definitions for the social core.

pub mod error;
pub mod invariants;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;
