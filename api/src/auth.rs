use crate::{errors::ApiError, states::AppState};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub email: String,
    pub exp: usize,
}

pub fn create_token(
    user_id: &str,
    email: &str,
    secret: &str,
    ttl: Duration,
) -> Result<String, ApiError> {
    let expiration = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| ApiError::internal("Failed to issue token", "expiration overflow"))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::internal("Failed to issue token", e))
}

pub fn validate_token(headers: &HeaderMap, secret: &str) -> Result<Claims, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized)
}

/// Id of the caller, taken from a verified bearer token.
///
/// Extracting it runs before any body extractor, so an unauthenticated
/// request is answered with 401 before its body is parsed or validated.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = validate_token(&parts.headers, &state.jwt_secret)?;
        Ok(Self {
            user_id: claims.sub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret";

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn issued_token_validates() {
        let token = create_token("user-1", "jane@example.com", SECRET, Duration::hours(1)).unwrap();
        let claims = validate_token(&bearer(&token), SECRET).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "jane@example.com");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_token("user-1", "jane@example.com", SECRET, Duration::hours(1)).unwrap();
        let err = validate_token(&bearer(&token), "other-secret").unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = create_token("user-1", "jane@example.com", SECRET, Duration::hours(-2)).unwrap();
        let err = validate_token(&bearer(&token), SECRET).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn missing_or_malformed_header_is_rejected() {
        assert!(matches!(
            validate_token(&HeaderMap::new(), SECRET),
            Err(ApiError::Unauthorized)
        ));

        let token = create_token("user-1", "jane@example.com", SECRET, Duration::hours(1)).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&token).unwrap());
        assert!(matches!(
            validate_token(&headers, SECRET),
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            validate_token(&bearer(""), SECRET),
            Err(ApiError::Unauthorized)
        ));
    }
}
