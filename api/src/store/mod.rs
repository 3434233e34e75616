mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use crate::models::{Post, PostChanges, User};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("mongodb: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

/// Sort applied to a post query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostOrder {
    /// Insertion order of the collection.
    #[default]
    Natural,
    /// `createdAt` descending.
    Newest,
    /// `viewsCount` descending.
    MostViewed,
}

#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub tag: Option<String>,
    pub order: PostOrder,
    pub limit: Option<usize>,
}

impl PostQuery {
    pub fn ordered(order: PostOrder) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    pub fn tagged(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Collection primitives the handlers are written against.
///
/// Every method touches a single document or a single read, so each call is
/// atomic on its own; nothing here spans two collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_posts(&self, query: PostQuery) -> Result<Vec<Post>, StoreError>;

    /// Adds one to `viewsCount` and returns the post as it is after the update.
    async fn increment_views(&self, id: &str) -> Result<Option<Post>, StoreError>;

    async fn insert_post(&self, post: Post) -> Result<Post, StoreError>;

    /// Returns `false` when no post has the given id.
    async fn update_post(&self, id: &str, changes: PostChanges) -> Result<bool, StoreError>;

    async fn delete_post(&self, id: &str) -> Result<Option<Post>, StoreError>;

    /// Fails with [`StoreError::Duplicate`] when the email is already registered.
    async fn insert_user(&self, user: User) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError>;

    async fn find_users(&self, ids: &[String]) -> Result<Vec<User>, StoreError>;
}

/// A post with its `user` reference resolved.
#[derive(Debug, Clone)]
pub struct PopulatedPost {
    pub post: Post,
    pub user: Option<User>,
}

/// Resolves the author of every post with one lookup over the distinct ids.
/// Authors that no longer exist come back as `None`.
pub async fn populate(
    store: &dyn DocumentStore,
    posts: Vec<Post>,
) -> Result<Vec<PopulatedPost>, StoreError> {
    let mut ids: Vec<String> = posts.iter().map(|post| post.user.clone()).collect();
    ids.sort();
    ids.dedup();

    let users: HashMap<String, User> = store
        .find_users(&ids)
        .await?
        .into_iter()
        .map(|user| (user.id.clone(), user))
        .collect();

    Ok(posts
        .into_iter()
        .map(|post| {
            let user = users.get(&post.user).cloned();
            PopulatedPost { post, user }
        })
        .collect())
}

pub async fn populate_one(
    store: &dyn DocumentStore,
    post: Post,
) -> Result<PopulatedPost, StoreError> {
    let user = store.find_user(&post.user).await?;
    Ok(PopulatedPost { post, user })
}
