//! Business logic services

pub mod dataset;
pub mod seed;

pub use dataset::{CreateOutcome, DatasetService};
pub use seed::HttpSeedSource;
