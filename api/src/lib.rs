//! Blog backend: posts, user accounts and image uploads over a document store.

pub mod auth;
pub mod config;
pub mod dto;
pub mod errors;
pub mod models;
pub mod routes;
pub mod states;
pub mod store;

pub use states::AppState;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Builds the full HTTP surface over the given state.
pub fn app(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let uploads = ServeDir::new(state.upload_dir.as_path());
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/health", get(routes::health_check))
        // Accounts
        .route("/auth/register", post(routes::register))
        .route("/auth/login", post(routes::login))
        .route("/auth/me", get(routes::get_me))
        // Posts
        .route("/posts", get(routes::list_posts).post(routes::create_post))
        .route("/posts/tags", get(routes::list_tags))
        .route(
            "/posts/{id}",
            get(routes::get_post)
                .patch(routes::update_post)
                .delete(routes::delete_post),
        )
        .route("/popular", get(routes::list_popular))
        .route("/tags/{tag}", get(routes::list_posts_by_tag))
        // Files
        .route("/upload", post(routes::upload_image).layer(upload_limit))
        .nest_service("/uploads", uploads)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
