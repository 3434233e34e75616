use anyhow::Context;
use blog_api::{
    AppState, app,
    config::Config,
    store::{DocumentStore, MemoryStore, MongoStore},
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("blog_api=info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env().context("invalid configuration")?;

    let store: Arc<dyn DocumentStore> = match &config.mongodb_uri {
        Some(uri) => Arc::new(
            MongoStore::connect(uri, &config.mongodb_database)
                .await
                .context("failed to connect to MongoDB")?,
        ),
        None => {
            warn!("MONGODB_URI not set, documents are kept in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(store, &config);
    let app = app(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Server running on http://{}", addr);
    info!("API Endpoints:");
    info!("  POST   /auth/register    - Create account");
    info!("  POST   /auth/login       - Login");
    info!("  GET    /auth/me          - Current user (auth)");
    info!("  GET    /posts            - List posts, newest first");
    info!("  GET    /posts/tags       - Latest tags");
    info!("  GET    /posts/{{id}}   - Get post, counts a view");
    info!("  GET    /popular          - List posts by views");
    info!("  GET    /tags/{{tag}}   - List posts with tag");
    info!("  POST   /posts            - Create post (auth)");
    info!("  PATCH  /posts/{{id}}   - Update post (auth)");
    info!("  DELETE /posts/{{id}}   - Delete post (auth)");
    info!("  POST   /upload           - Upload image (auth)");
    info!("  GET    /uploads/*        - Uploaded files");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
