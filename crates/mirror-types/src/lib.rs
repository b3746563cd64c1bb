//! Mirror Types - Pure type definitions
//!
//! Loosely typed documents, the collections they live in, store filters and
//! the JSON envelopes returned by the HTTP surface. No async runtime here.

pub mod collection;
pub mod document;
pub mod filter;
pub mod message;

pub use collection::*;
pub use document::*;
pub use filter::*;
pub use message::*;
