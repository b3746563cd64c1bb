//! Mirror Core Library
//!
//! Error type and port traits for the mirror service.

// Re-export pure types from mirror-types
pub use mirror_types::*;

pub mod error;
pub mod ports;

pub use error::{MirrorError, Result};
pub use ports::{DocumentStore, SeedSource};
