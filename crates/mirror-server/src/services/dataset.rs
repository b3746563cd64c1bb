//! Dataset service
//!
//! Owns the consistency rules across `users`, `posts` and `comments`:
//! reloads from the seed source, cascading deletes, the nested user read and
//! the duplicate guard on create. Multi-step sequences are plain sequential
//! store calls without isolation; a failure halfway through a reload leaves
//! the collections cleared but not refilled.

use mirror_core::{
    same_value, Collection, Document, DocumentStore, Filter, Result, SeedSource, ID, POST_ID,
    USER_ID,
};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Seed subset selected for one reload
#[derive(Debug, Default, PartialEq)]
pub struct SeedSelection {
    pub users: Vec<Document>,
    pub posts: Vec<Document>,
    pub comments: Vec<Document>,
}

impl SeedSelection {
    /// Keep the first `user_limit` users, their posts, and those posts' comments
    pub fn select(
        users: Vec<Document>,
        posts: Vec<Document>,
        comments: Vec<Document>,
        user_limit: usize,
    ) -> Self {
        let users: Vec<Document> = users.into_iter().take(user_limit).collect();
        let user_ids: HashSet<i64> = users.iter().filter_map(Document::id).collect();

        let posts: Vec<Document> = posts
            .into_iter()
            .filter(|p| p.user_id().is_some_and(|id| user_ids.contains(&id)))
            .collect();
        let post_ids: HashSet<i64> = posts.iter().filter_map(Document::id).collect();

        let comments = comments
            .into_iter()
            .filter(|c| c.post_id().is_some_and(|id| post_ids.contains(&id)))
            .collect();

        Self {
            users,
            posts,
            comments,
        }
    }

    fn batches(&self) -> [(Collection, &[Document]); 3] {
        [
            (Collection::Users, self.users.as_slice()),
            (Collection::Posts, self.posts.as_slice()),
            (Collection::Comments, self.comments.as_slice()),
        ]
    }
}

/// Per-collection counts of a reload or purge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub users: u64,
    pub posts: u64,
    pub comments: u64,
}

/// Result of a conditional create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

pub struct DatasetService {
    store: Arc<dyn DocumentStore>,
    seed: Arc<dyn SeedSource>,
    user_limit: usize,
}

impl DatasetService {
    pub fn new(store: Arc<dyn DocumentStore>, seed: Arc<dyn SeedSource>, user_limit: usize) -> Self {
        Self {
            store,
            seed,
            user_limit,
        }
    }

    /// Replace all three collections with a fresh subset of the seed source
    pub async fn reload(&self) -> Result<Counts> {
        let (users, posts, comments) = futures::try_join!(
            self.seed.fetch(Collection::Users),
            self.seed.fetch(Collection::Posts),
            self.seed.fetch(Collection::Comments),
        )?;
        debug!(
            "Seed source returned {} users, {} posts, {} comments",
            users.len(),
            posts.len(),
            comments.len()
        );

        let selection = SeedSelection::select(users, posts, comments, self.user_limit);

        for collection in Collection::ALL {
            self.store.delete_many(collection, &Filter::All).await?;
        }

        for (collection, docs) in selection.batches() {
            if docs.is_empty() {
                continue;
            }
            self.store.insert_many(collection, docs).await?;
        }

        let counts = Counts {
            users: selection.users.len() as u64,
            posts: selection.posts.len() as u64,
            comments: selection.comments.len() as u64,
        };
        info!(
            "Reloaded {} users, {} posts, {} comments",
            counts.users, counts.posts, counts.comments
        );
        Ok(counts)
    }

    /// Empty every collection
    pub async fn purge(&self) -> Result<Counts> {
        let users = self.store.delete_many(Collection::Users, &Filter::All).await?;
        let posts = self.store.delete_many(Collection::Posts, &Filter::All).await?;
        let comments = self
            .store
            .delete_many(Collection::Comments, &Filter::All)
            .await?;

        info!("Purged {} users, {} posts, {} comments", users, posts, comments);
        Ok(Counts {
            users,
            posts,
            comments,
        })
    }

    /// Delete one user with their posts and the comments on those posts.
    ///
    /// Returns `None` when no user had that id, otherwise the number of posts
    /// removed.
    pub async fn remove_user(&self, user_id: i64) -> Result<Option<usize>> {
        let deleted = self
            .store
            .delete_one(Collection::Users, &Filter::eq(ID, user_id))
            .await?;
        if deleted == 0 {
            return Ok(None);
        }

        let by_owner = Filter::eq(USER_ID, user_id);
        let posts = self.store.find(Collection::Posts, &by_owner).await?;
        let post_ids = key_values(&posts, ID);

        self.store.delete_many(Collection::Posts, &by_owner).await?;
        if !post_ids.is_empty() {
            self.store
                .delete_many(Collection::Comments, &Filter::is_in(POST_ID, post_ids))
                .await?;
        }

        info!("Deleted user {} with {} posts", user_id, posts.len());
        Ok(Some(posts.len()))
    }

    /// The user with a `posts` array, each post carrying its `comments`
    pub async fn user_with_posts(&self, user_id: i64) -> Result<Option<Document>> {
        let Some(mut user) = self
            .store
            .find_one(Collection::Users, &Filter::eq(ID, user_id))
            .await?
        else {
            return Ok(None);
        };

        let posts = self
            .store
            .find(Collection::Posts, &Filter::eq(USER_ID, user_id))
            .await?;
        let post_ids = key_values(&posts, ID);

        let comments = if post_ids.is_empty() {
            Vec::new()
        } else {
            self.store
                .find(Collection::Comments, &Filter::is_in(POST_ID, post_ids))
                .await?
        };

        let posts: Vec<Value> = posts
            .into_iter()
            .map(|mut post| {
                let own: Vec<Value> = match post.get(ID) {
                    Some(post_id) => comments
                        .iter()
                        .filter(|c| c.get(POST_ID).is_some_and(|v| same_value(v, post_id)))
                        .cloned()
                        .map(Value::from)
                        .collect(),
                    None => Vec::new(),
                };
                post.insert("comments", own);
                post.into_value()
            })
            .collect();

        user.insert("posts", posts);
        Ok(Some(user))
    }

    /// Insert `user` unless a user with the same id is already stored
    pub async fn create_user(&self, user_id: i64, user: &Document) -> Result<CreateOutcome> {
        let inserted = self
            .store
            .insert_one_unless(Collection::Users, &Filter::eq(ID, user_id), user)
            .await?;

        if inserted {
            info!("Created user {}", user_id);
            Ok(CreateOutcome::Created)
        } else {
            debug!("User {} already exists", user_id);
            Ok(CreateOutcome::AlreadyExists)
        }
    }
}

/// Raw values of `field` across `docs`, skipping documents without it
fn key_values(docs: &[Document], field: &str) -> Vec<Value> {
    docs.iter().filter_map(|d| d.get(field).cloned()).collect()
}
