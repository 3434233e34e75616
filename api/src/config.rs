//! Process configuration loaded from the environment.

use std::{env, path::PathBuf, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    /// When unset the process keeps its documents in memory.
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 4444)?,
            jwt_secret,
            jwt_expiry_hours: parse_var("JWT_EXPIRY_HOURS", 24 * 30)?,
            mongodb_uri: env::var("MONGODB_URI").ok().filter(|uri| !uri.is_empty()),
            mongodb_database: env::var("MONGODB_DATABASE").unwrap_or_else(|_| "blog".to_string()),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }

    /// Defaults for everything except the secret, with documents kept in memory.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4444,
            jwt_secret: jwt_secret.into(),
            jwt_expiry_hours: 24 * 30,
            mongodb_uri: None,
            mongodb_database: "blog".to_string(),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variable_falls_back_to_default() {
        let port: u16 = parse_var("BLOG_API_TEST_UNSET_PORT", 4444).unwrap();
        assert_eq!(port, 4444);
    }

    #[test]
    fn with_secret_uses_memory_store() {
        let config = Config::with_secret("s3cret");
        assert!(config.mongodb_uri.is_none());
        assert_eq!(config.addr(), "127.0.0.1:4444");
        assert_eq!(config.jwt_expiry_hours, 720);
    }
}
