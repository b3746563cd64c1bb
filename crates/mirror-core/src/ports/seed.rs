//! Seed source trait

use crate::Result;
use async_trait::async_trait;
use mirror_types::{Collection, Document};

/// Remote origin of the mirrored dataset
#[async_trait]
pub trait SeedSource: Send + Sync {
    /// Fetch the full upstream listing for `collection`, in upstream order
    async fn fetch(&self, collection: Collection) -> Result<Vec<Document>>;
}
