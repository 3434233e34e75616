use super::{DocumentStore, PostOrder, PostQuery, StoreError};
use crate::models::{Post, PostChanges, User};
use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone)]
struct Stored<T> {
    seq: u64,
    doc: T,
}

/// Process-local document store.
///
/// `DashMap` shards its entries behind their own locks, so a `get_mut` on a
/// post holds that document exclusively for the duration of the update.
/// Each insert takes a sequence number that stands in for the natural order
/// of a real collection.
#[derive(Default)]
pub struct MemoryStore {
    posts: DashMap<String, Stored<Post>>,
    users: DashMap<String, User>,
    email_index: DashMap<String, String>, // Quick Lookup by Email
    next_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_posts(&self, query: PostQuery) -> Result<Vec<Post>, StoreError> {
        let mut matched: Vec<Stored<Post>> = self
            .posts
            .iter()
            .filter(|entry| {
                query
                    .tag
                    .as_ref()
                    .is_none_or(|tag| entry.doc.tags.contains(tag))
            })
            .map(|entry| entry.value().clone())
            .collect();

        match query.order {
            PostOrder::Natural => matched.sort_by_key(|stored| stored.seq),
            PostOrder::Newest => matched.sort_by(|a, b| {
                b.doc
                    .created_at
                    .cmp(&a.doc.created_at)
                    .then(b.seq.cmp(&a.seq))
            }),
            PostOrder::MostViewed => matched.sort_by(|a, b| {
                b.doc
                    .views_count
                    .cmp(&a.doc.views_count)
                    .then(a.seq.cmp(&b.seq))
            }),
        }

        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }

        Ok(matched.into_iter().map(|stored| stored.doc).collect())
    }

    async fn increment_views(&self, id: &str) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.get_mut(id).map(|mut entry| {
            entry.doc.views_count += 1;
            entry.doc.clone()
        }))
    }

    async fn insert_post(&self, post: Post) -> Result<Post, StoreError> {
        match self.posts.entry(post.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(format!("post {}", post.id))),
            Entry::Vacant(slot) => {
                slot.insert(Stored {
                    seq: self.next_seq(),
                    doc: post.clone(),
                });
                Ok(post)
            }
        }
    }

    async fn update_post(&self, id: &str, changes: PostChanges) -> Result<bool, StoreError> {
        match self.posts.get_mut(id) {
            Some(mut entry) => {
                entry.doc.apply(changes);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_post(&self, id: &str) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.remove(id).map(|(_, stored)| stored.doc))
    }

    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        match self.email_index.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(format!("email {}", user.email))),
            Entry::Vacant(slot) => {
                slot.insert(user.id.clone());
                self.users.insert(user.id.clone(), user.clone());
                Ok(user)
            }
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let Some(user_id) = self.email_index.get(email).map(|id| id.value().clone()) else {
            return Ok(None);
        };
        Ok(self.users.get(&user_id).map(|user| user.value().clone()))
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(id).map(|user| user.value().clone()))
    }

    async fn find_users(&self, ids: &[String]) -> Result<Vec<User>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|user| user.value().clone()))
            .collect())
    }
}
