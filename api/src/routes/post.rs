use crate::{
    AppState,
    auth::AuthUser,
    dto::{PostRequest, PostResponse, SuccessResponse, ValidatedJson},
    errors::ApiError,
    models::{Post, PostChanges},
    store::{PostOrder, PostQuery, populate, populate_one},
};
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

/// Number of posts sampled by `GET /posts/tags`, and the cap on tags returned.
const TAG_SAMPLE: usize = 5;

/// GET /posts
pub async fn list_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let posts = state
        .store
        .find_posts(PostQuery::ordered(PostOrder::Newest))
        .await
        .map_err(|e| ApiError::internal("Failed to fetch posts", e))?;

    let posts = populate(state.store.as_ref(), posts)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch posts", e))?;

    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

/// GET /popular
pub async fn list_popular(
    State(state): State<AppState>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let posts = state
        .store
        .find_posts(PostQuery::ordered(PostOrder::MostViewed))
        .await
        .map_err(|e| ApiError::bad_request("Failed to fetch popular posts", e))?;

    let posts = populate(state.store.as_ref(), posts)
        .await
        .map_err(|e| ApiError::bad_request("Failed to fetch popular posts", e))?;

    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

/// GET /posts/tags
///
/// Flattens the tags of the first five posts in natural order and keeps the
/// first five of those. Tags are neither deduplicated nor ranked.
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let posts = state
        .store
        .find_posts(PostQuery::default().limit(TAG_SAMPLE))
        .await
        .map_err(|e| ApiError::internal("Failed to fetch tags", e))?;

    Ok(Json(
        posts
            .into_iter()
            .flat_map(|post| post.tags)
            .take(TAG_SAMPLE)
            .collect(),
    ))
}

/// GET /tags/{tag}
pub async fn list_posts_by_tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let posts = state
        .store
        .find_posts(PostQuery::tagged(tag))
        .await
        .map_err(|e| ApiError::internal("Failed to fetch posts by tag", e))?;

    if posts.is_empty() {
        return Err(ApiError::NotFound("No posts found with this tag"));
    }

    let posts = populate(state.store.as_ref(), posts)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch posts by tag", e))?;

    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

/// GET /posts/{id}
/// Counts the read: `viewsCount` goes up by one on every successful call.
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state
        .store
        .increment_views(&id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch post", e))?
        .ok_or(ApiError::NotFound("Post not found"))?;

    let post = populate_one(state.store.as_ref(), post)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch post", e))?;

    Ok(Json(post.into()))
}

/// POST /posts
/// Headers: Authorization: Bearer <token>
/// Body: { "title": "...", "text": "...", "tags": "a,b", "imageUrl": "..." }
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<PostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let now = Utc::now().timestamp_millis();
    let post = Post {
        id: Uuid::new_v4().to_string(),
        tags: payload.tag_list(),
        title: payload.title,
        text: payload.text,
        image_url: payload.image_url,
        views_count: 0,
        user: auth.user_id,
        created_at: now,
        updated_at: now,
    };

    let post = state
        .store
        .insert_post(post)
        .await
        .map_err(|e| ApiError::internal("Failed to create post", e))?;

    info!("Post created: {} by user {}", post.id, post.user);

    Ok(Json(post.into()))
}

/// PATCH /posts/{id}
/// Headers: Authorization: Bearer <token>
///
/// Any authenticated user may overwrite any post, and the post is reassigned
/// to them. An unknown id still answers `{ "success": true }`.
pub async fn update_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<PostRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let changes = PostChanges {
        tags: payload.tag_list(),
        title: payload.title,
        text: payload.text,
        image_url: payload.image_url,
        user: auth.user_id,
        updated_at: Utc::now().timestamp_millis(),
    };

    let matched = state
        .store
        .update_post(&id, changes)
        .await
        .map_err(|e| ApiError::internal("Failed to update post", e))?;

    if matched {
        info!("Post updated: {}", id);
    }

    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /posts/{id}
/// Headers: Authorization: Bearer <token>
pub async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state
        .store
        .delete_post(&id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete post", e))?
        .ok_or(ApiError::NotFound("Post not found"))?;

    info!("Post deleted: {} by user {}", id, auth.user_id);

    Ok(Json(post.into()))
}
