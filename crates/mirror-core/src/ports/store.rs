//! Document store trait for persistence

use crate::Result;
use async_trait::async_trait;
use mirror_types::{Collection, Document, Filter};

/// Collection-scoped document store.
///
/// Documents come back in insertion order. The store enforces no uniqueness;
/// callers that need it go through [`DocumentStore::insert_one_unless`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Remove every match, returning how many were removed
    async fn delete_many(&self, collection: Collection, filter: &Filter) -> Result<u64>;

    /// Remove the earliest match, returning 0 or 1
    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<u64>;

    /// Append a batch. An empty batch is a no-op.
    async fn insert_many(&self, collection: Collection, docs: &[Document]) -> Result<u64>;

    async fn insert_one(&self, collection: Collection, doc: &Document) -> Result<()>;

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>>;

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>>;

    /// Insert `doc` only if nothing matches `guard`. Returns whether it was inserted.
    ///
    /// The default is a plain find followed by an insert and is racy under
    /// concurrent callers. Stores with a conditional write should override it.
    async fn insert_one_unless(
        &self,
        collection: Collection,
        guard: &Filter,
        doc: &Document,
    ) -> Result<bool> {
        if self.find_one(collection, guard).await?.is_some() {
            return Ok(false);
        }
        self.insert_one(collection, doc).await?;
        Ok(true)
    }

    /// Release connections. Called once at shutdown.
    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirror_types::ID;
    use serde_json::json;
    use std::sync::Mutex;

    /// Minimal store relying on the default conditional insert
    #[derive(Default)]
    struct VecStore {
        docs: Mutex<Vec<(Collection, Document)>>,
    }

    #[async_trait]
    impl DocumentStore for VecStore {
        async fn delete_many(&self, collection: Collection, filter: &Filter) -> Result<u64> {
            let mut docs = self.docs.lock().unwrap();
            let before = docs.len();
            docs.retain(|(c, d)| !(*c == collection && filter.matches(d)));
            Ok((before - docs.len()) as u64)
        }

        async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<u64> {
            let mut docs = self.docs.lock().unwrap();
            match docs
                .iter()
                .position(|(c, d)| *c == collection && filter.matches(d))
            {
                Some(pos) => {
                    docs.remove(pos);
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        async fn insert_many(&self, collection: Collection, docs: &[Document]) -> Result<u64> {
            let mut stored = self.docs.lock().unwrap();
            stored.extend(docs.iter().cloned().map(|d| (collection, d)));
            Ok(docs.len() as u64)
        }

        async fn insert_one(&self, collection: Collection, doc: &Document) -> Result<()> {
            self.docs.lock().unwrap().push((collection, doc.clone()));
            Ok(())
        }

        async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>> {
            Ok(self
                .docs
                .lock()
                .unwrap()
                .iter()
                .filter(|(c, d)| *c == collection && filter.matches(d))
                .map(|(_, d)| d.clone())
                .collect())
        }

        async fn find_one(
            &self,
            collection: Collection,
            filter: &Filter,
        ) -> Result<Option<Document>> {
            Ok(self.find(collection, filter).await?.into_iter().next())
        }
    }

    #[tokio::test]
    async fn test_default_insert_unless() {
        let store = VecStore::default();
        let user = Document::try_from(json!({"id": 1, "name": "a"})).unwrap();
        let guard = Filter::eq(ID, 1);

        let first = tokio_test::assert_ok!(
            store.insert_one_unless(Collection::Users, &guard, &user).await
        );
        let second = tokio_test::assert_ok!(
            store.insert_one_unless(Collection::Users, &guard, &user).await
        );

        assert!(first);
        assert!(!second);
        assert_eq!(store.find(Collection::Users, &Filter::All).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_guard_is_collection_scoped() {
        let store = VecStore::default();
        let post = Document::try_from(json!({"id": 1, "userId": 1})).unwrap();
        store.insert_one(Collection::Posts, &post).await.unwrap();

        let user = Document::try_from(json!({"id": 1})).unwrap();
        let inserted = store
            .insert_one_unless(Collection::Users, &Filter::eq(ID, 1), &user)
            .await
            .unwrap();
        assert!(inserted);
    }
}
