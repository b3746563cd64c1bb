//! HTTP client for the remote seed dataset

use async_trait::async_trait;
use mirror_core::{Collection, Document, MirrorError, Result, SeedSource};
use reqwest::Client as ReqwestClient;
use tracing::debug;

pub struct HttpSeedSource {
    http: ReqwestClient,
    base_url: String,
}

impl HttpSeedSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: ReqwestClient::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl SeedSource for HttpSeedSource {
    async fn fetch(&self, collection: Collection) -> Result<Vec<Document>> {
        let url = format!("{}/{}", self.base_url, collection);
        debug!("Fetching seed data from {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| MirrorError::Seed(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::Seed(format!("GET {} returned {}", url, status)));
        }

        let docs: Vec<Document> = response
            .json()
            .await
            .map_err(|e| MirrorError::Seed(format!("{} is not a JSON array of objects: {}", url, e)))?;

        debug!("Fetched {} {} from seed source", docs.len(), collection);
        Ok(docs)
    }
}
