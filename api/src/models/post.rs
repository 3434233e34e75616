use serde::{Deserialize, Serialize};

/// Post document as it is kept in the `posts` collection.
///
/// `user` holds the author's id; it is only resolved into a full user when
/// a handler asks the store to populate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub views_count: i64,
    pub user: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Full replacement of the mutable fields of a post.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub user: String,
    pub updated_at: i64,
}

impl Post {
    pub fn apply(&mut self, changes: PostChanges) {
        self.title = changes.title;
        self.text = changes.text;
        self.tags = changes.tags;
        self.image_url = changes.image_url;
        self.user = changes.user;
        self.updated_at = changes.updated_at;
    }
}
