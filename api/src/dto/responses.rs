use crate::{
    models::{Post, User},
    store::PopulatedPost,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

fn timestamp(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            avatar_url: user.avatar_url,
            created_at: timestamp(user.created_at),
            updated_at: timestamp(user.updated_at),
        }
    }
}

/// The user document with the session token alongside its fields.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
}

/// `user` on the wire is either the bare author id or the populated author.
/// A populated reference whose author is gone serializes as `null`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AuthorRef {
    Id(String),
    User(Option<UserResponse>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub views_count: i64,
    pub user: AuthorRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostResponse {
    fn with_author(post: Post, user: AuthorRef) -> Self {
        Self {
            id: post.id,
            title: post.title,
            text: post.text,
            tags: post.tags,
            image_url: post.image_url,
            views_count: post.views_count,
            user,
            created_at: timestamp(post.created_at),
            updated_at: timestamp(post.updated_at),
        }
    }
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        let author = AuthorRef::Id(post.user.clone());
        Self::with_author(post, author)
    }
}

impl From<PopulatedPost> for PostResponse {
    fn from(populated: PopulatedPost) -> Self {
        let author = AuthorRef::User(populated.user.map(UserResponse::from));
        Self::with_author(populated.post, author)
    }
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}
