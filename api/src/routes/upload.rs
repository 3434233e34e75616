use crate::{AppState, auth::AuthUser, dto::UploadResponse, errors::ApiError};
use axum::{
    Json,
    extract::{Multipart, State},
};
use std::path::Path;
use tracing::info;

/// Multipart field carrying the file.
const IMAGE_FIELD: &str = "image";

/// POST /upload
/// Headers: Authorization: Bearer <token>
/// Body: multipart/form-data with one `image` file
///
/// The file keeps its original name, so uploading the same name twice
/// replaces the first file.
pub async fn upload_image(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Rejected(e.status(), e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        // Only the last path component is kept so a crafted name cannot
        // escape the upload directory.
        let file_name = field
            .file_name()
            .and_then(|name| Path::new(name).file_name())
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| ApiError::BadRequest("Uploaded file has no name".to_string()))?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Rejected(e.status(), e.body_text()))?;

        tokio::fs::create_dir_all(state.upload_dir.as_path())
            .await
            .map_err(|e| ApiError::internal("Failed to store upload", e))?;
        tokio::fs::write(state.upload_dir.join(&file_name), &bytes)
            .await
            .map_err(|e| ApiError::internal("Failed to store upload", e))?;

        info!(
            "Upload stored: {} ({} bytes) by user {}",
            file_name,
            bytes.len(),
            auth.user_id
        );

        return Ok(Json(UploadResponse {
            url: format!("/uploads/{file_name}"),
        }));
    }

    Err(ApiError::BadRequest("No image file provided".to_string()))
}
