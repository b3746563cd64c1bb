//! Port traits (interfaces) for dependency injection

pub mod seed;
pub mod store;

pub use seed::SeedSource;
pub use store::DocumentStore;
