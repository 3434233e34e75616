use super::{DocumentStore, PostOrder, PostQuery, StoreError};
use crate::models::{Post, PostChanges, User};
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    Client, Collection, IndexModel,
    bson::{Document, doc},
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
};
use tracing::info;

const POSTS: &str = "posts";
const USERS: &str = "users";
const DUPLICATE_KEY: i32 = 11000;

/// Document store backed by a MongoDB database.
#[derive(Clone)]
pub struct MongoStore {
    posts: Collection<Post>,
    users: Collection<User>,
}

impl MongoStore {
    /// Connects, then makes sure `users.email` carries its unique index.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);

        let store = Self {
            posts: db.collection(POSTS),
            users: db.collection(USERS),
        };

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        store.users.create_index(email_index).await?;

        info!("Connected to MongoDB database {}", database);
        Ok(store)
    }
}

/// Every sort ends on a unique key so equal timestamps or view counts
/// still come back in a stable order.
fn sort_document(order: PostOrder) -> Option<Document> {
    match order {
        PostOrder::Natural => None,
        PostOrder::Newest => Some(doc! { "createdAt": -1, "_id": -1 }),
        PostOrder::MostViewed => Some(doc! { "viewsCount": -1, "createdAt": 1, "_id": 1 }),
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find_posts(&self, query: PostQuery) -> Result<Vec<Post>, StoreError> {
        let filter = match &query.tag {
            Some(tag) => doc! { "tags": tag.as_str() },
            None => doc! {},
        };

        let mut find = self.posts.find(filter);
        if let Some(sort) = sort_document(query.order) {
            find = find.sort(sort);
        }
        if let Some(limit) = query.limit {
            find = find.limit(limit as i64);
        }

        let posts: Vec<Post> = find.await?.try_collect().await?;
        Ok(posts)
    }

    async fn increment_views(&self, id: &str) -> Result<Option<Post>, StoreError> {
        let post = self
            .posts
            .find_one_and_update(doc! { "_id": id }, doc! { "$inc": { "viewsCount": 1 } })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(post)
    }

    async fn insert_post(&self, post: Post) -> Result<Post, StoreError> {
        self.posts.insert_one(&post).await?;
        Ok(post)
    }

    async fn update_post(&self, id: &str, changes: PostChanges) -> Result<bool, StoreError> {
        let result = self
            .posts
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "title": changes.title,
                        "text": changes.text,
                        "tags": changes.tags,
                        "imageUrl": changes.image_url,
                        "user": changes.user,
                        "updatedAt": changes.updated_at,
                    }
                },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_post(&self, id: &str) -> Result<Option<Post>, StoreError> {
        let post = self.posts.find_one_and_delete(doc! { "_id": id }).await?;
        Ok(post)
    }

    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        match self.users.insert_one(&user).await {
            Ok(_) => Ok(user),
            Err(err) if is_duplicate_key(&err) => {
                Err(StoreError::Duplicate(format!("email {}", user.email)))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = self.users.find_one(doc! { "email": email }).await?;
        Ok(user)
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let user = self.users.find_one(doc! { "_id": id }).await?;
        Ok(user)
    }

    async fn find_users(&self, ids: &[String]) -> Result<Vec<User>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let users: Vec<User> = self
            .users
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await?
            .try_collect()
            .await?;
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_end_on_a_unique_key() {
        assert!(sort_document(PostOrder::Natural).is_none());
        assert_eq!(
            sort_document(PostOrder::Newest),
            Some(doc! { "createdAt": -1, "_id": -1 })
        );
        assert_eq!(
            sort_document(PostOrder::MostViewed),
            Some(doc! { "viewsCount": -1, "createdAt": 1, "_id": 1 })
        );
    }
}
