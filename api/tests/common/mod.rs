#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use blog_api::{
    AppState, app,
    config::Config,
    store::{DocumentStore, MemoryStore},
};
use serde_json::{Value, json};
use std::{path::PathBuf, sync::Arc};
use tower::ServiceExt;
use uuid::Uuid;

pub struct TestApp {
    pub router: Router,
    pub upload_dir: PathBuf,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(Arc::new(MemoryStore::new()), |_| {})
    }

    /// Builds the app over `store`, letting the caller adjust the config.
    pub fn with(store: Arc<dyn DocumentStore>, configure: impl FnOnce(&mut Config)) -> Self {
        let upload_dir = std::env::temp_dir().join(format!("blog-api-test-{}", Uuid::new_v4()));
        let mut config = Config::with_secret("integration-secret");
        config.upload_dir = upload_dir.clone();
        configure(&mut config);

        let state = AppState::new(store, &config);
        Self {
            router: app(state),
            upload_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, None, None)).await
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send(request(method, uri, token, body)).await
    }

    /// Registers a fresh user and returns `(user id, token)`.
    pub async fn register(&self, email: &str) -> (String, String) {
        let (status, body) = self
            .call(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": "secret-password",
                    "fullName": "Jane Doe"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        (
            body["id"].as_str().unwrap().to_string(),
            body["token"].as_str().unwrap().to_string(),
        )
    }

    /// Creates a post and returns its JSON.
    pub async fn create_post(&self, token: &str, title: &str, tags: &str) -> Value {
        let (status, body) = self
            .call(
                Method::POST,
                "/posts",
                Some(token),
                Some(json!({
                    "title": title,
                    "text": "Hello world",
                    "tags": tags,
                    "imageUrl": "/img.png"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {body}");
        body
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

/// Mints a token the app accepts without touching the store.
pub fn token_for(user_id: &str) -> String {
    blog_api::auth::create_token(
        user_id,
        "someone@example.com",
        "integration-secret",
        chrono::Duration::hours(1),
    )
    .unwrap()
}

pub fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
