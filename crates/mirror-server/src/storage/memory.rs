//! In-memory document store using DashMap

use async_trait::async_trait;
use dashmap::DashMap;
use mirror_core::{Collection, Document, DocumentStore, Filter, Result};
use std::sync::Arc;

/// Process-local store; contents vanish on restart
pub struct MemoryStore {
    data: Arc<DashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn delete_many(&self, collection: Collection, filter: &Filter) -> Result<u64> {
        let Some(mut docs) = self.data.get_mut(&collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|doc| !filter.matches(doc));
        Ok((before - docs.len()) as u64)
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<u64> {
        let Some(mut docs) = self.data.get_mut(&collection) else {
            return Ok(0);
        };
        match docs.iter().position(|doc| filter.matches(doc)) {
            Some(pos) => {
                docs.remove(pos);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn insert_many(&self, collection: Collection, docs: &[Document]) -> Result<u64> {
        if docs.is_empty() {
            return Ok(0);
        }
        self.data
            .entry(collection)
            .or_default()
            .extend(docs.iter().cloned());
        Ok(docs.len() as u64)
    }

    async fn insert_one(&self, collection: Collection, doc: &Document) -> Result<()> {
        self.data.entry(collection).or_default().push(doc.clone());
        Ok(())
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>> {
        Ok(self
            .data
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.matches(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>> {
        Ok(self
            .data
            .get(&collection)
            .and_then(|docs| docs.iter().find(|doc| filter.matches(doc)).cloned()))
    }

    /// The entry guard holds the shard write lock across check and push
    async fn insert_one_unless(
        &self,
        collection: Collection,
        guard: &Filter,
        doc: &Document,
    ) -> Result<bool> {
        let mut docs = self.data.entry(collection).or_default();
        if docs.iter().any(|existing| guard.matches(existing)) {
            return Ok(false);
        }
        docs.push(doc.clone());
        Ok(true)
    }
}
