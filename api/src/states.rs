use crate::{config::Config, store::DocumentStore};
use chrono::Duration;
use std::{path::PathBuf, sync::Arc};

/// Shared handle injected into every handler.
///
/// The store is created once at startup; cloning the state only clones the
/// `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub jwt_secret: Arc<str>,
    pub token_ttl: Duration,
    pub upload_dir: Arc<PathBuf>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: &Config) -> Self {
        Self {
            store,
            jwt_secret: Arc::from(config.jwt_secret.as_str()),
            token_ttl: Duration::try_hours(config.jwt_expiry_hours).unwrap_or(Duration::days(30)),
            upload_dir: Arc::new(config.upload_dir.clone()),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}
