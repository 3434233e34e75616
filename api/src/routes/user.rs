use crate::{
    AppState,
    auth::{AuthUser, create_token},
    dto::{AuthResponse, LoginRequest, RegisterRequest, UserResponse, ValidatedJson},
    errors::ApiError,
    models::User,
    store::StoreError,
};
use axum::{Json, extract::State};
use bcrypt::{hash, verify};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

const PASSWORD_HASH_COST: u32 = 10;

/// POST /auth/register
/// Body: { "email": "...", "password": "...", "fullName": "...", "avatarUrl": "..." }
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let password_hash = hash(&payload.password, PASSWORD_HASH_COST)
        .map_err(|e| ApiError::internal("Failed to register", e))?;

    let now = Utc::now().timestamp_millis();
    let user = User {
        id: Uuid::new_v4().to_string(),
        full_name: payload.full_name,
        email: payload.email,
        password_hash,
        avatar_url: payload.avatar_url,
        created_at: now,
        updated_at: now,
    };

    let user = state.store.insert_user(user).await.map_err(|e| match e {
        StoreError::Duplicate(_) => ApiError::UserAlreadyExists,
        e => ApiError::internal("Failed to register", e),
    })?;

    let token = create_token(&user.id, &user.email, &state.jwt_secret, state.token_ttl)?;

    info!("New user registered: {}", user.email);

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// POST /auth/login
/// Body: { "email": "...", "password": "..." }
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    // Find user by email
    let user = state
        .store
        .find_user_by_email(&payload.email)
        .await
        .map_err(|e| ApiError::internal("Failed to log in", e))?
        .ok_or(ApiError::InvalidCredentials)?;

    // Verify password
    let valid = verify(&payload.password, &user.password_hash)
        .map_err(|e| ApiError::internal("Failed to log in", e))?;

    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let token = create_token(&user.id, &user.email, &state.jwt_secret, state.token_ttl)?;

    info!("User logged in: {}", user.email);

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// GET /auth/me
/// Headers: Authorization: Bearer <token>
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .store
        .find_user(&auth.user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch user", e))?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(user.into()))
}
