//! Storage layer
//!
//! SQLite (embedded) is the default document store; the DashMap-backed
//! store keeps everything in process memory.

pub mod db;
pub mod memory;

pub use db::SqliteStore;
pub use memory::MemoryStore;
