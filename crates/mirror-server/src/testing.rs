//! Test doubles shared by the unit tests

use async_trait::async_trait;
use mirror_core::{Collection, Document, DocumentStore, Filter, MirrorError, Result, SeedSource};
use serde_json::{json, Value};

pub fn doc(value: Value) -> Document {
    Document::try_from(value).expect("fixture must be a JSON object")
}

/// Seed source answering from fixed lists
#[derive(Default)]
pub struct StaticSeed {
    pub users: Vec<Document>,
    pub posts: Vec<Document>,
    pub comments: Vec<Document>,
    pub fail: bool,
}

impl StaticSeed {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl SeedSource for StaticSeed {
    async fn fetch(&self, collection: Collection) -> Result<Vec<Document>> {
        if self.fail {
            return Err(MirrorError::Seed("upstream unreachable".to_string()));
        }
        Ok(match collection {
            Collection::Users => self.users.clone(),
            Collection::Posts => self.posts.clone(),
            Collection::Comments => self.comments.clone(),
        })
    }
}

/// Twelve users with two posts each and two comments per post, shaped like
/// the public placeholder API
pub fn seed_fixture() -> StaticSeed {
    let users = (1..=12)
        .map(|id| doc(json!({"id": id, "name": format!("User {}", id), "username": format!("user{}", id)})))
        .collect();

    let posts = (1..=24)
        .map(|id| doc(json!({"id": id, "userId": (id + 1) / 2, "title": format!("Post {}", id)})))
        .collect();

    let comments = (1..=48)
        .map(|id| doc(json!({"id": id, "postId": (id + 1) / 2, "body": format!("Comment {}", id)})))
        .collect();

    StaticSeed {
        users,
        posts,
        comments,
        fail: false,
    }
}

/// Store whose every operation fails
pub struct FailingStore;

fn down<T>() -> Result<T> {
    Err(MirrorError::Database("connection refused".to_string()))
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn delete_many(&self, _collection: Collection, _filter: &Filter) -> Result<u64> {
        down()
    }

    async fn delete_one(&self, _collection: Collection, _filter: &Filter) -> Result<u64> {
        down()
    }

    async fn insert_many(&self, _collection: Collection, _docs: &[Document]) -> Result<u64> {
        down()
    }

    async fn insert_one(&self, _collection: Collection, _doc: &Document) -> Result<()> {
        down()
    }

    async fn find(&self, _collection: Collection, _filter: &Filter) -> Result<Vec<Document>> {
        down()
    }

    async fn find_one(&self, _collection: Collection, _filter: &Filter) -> Result<Option<Document>> {
        down()
    }
}
