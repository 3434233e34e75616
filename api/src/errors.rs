use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt::Display;
use tracing::error;
use validator::ValidationErrors;

/// One failing rule of a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    InvalidCredentials,
    UserAlreadyExists,
    Unauthorized,
    NotFound(&'static str),
    BadRequest(String),
    /// A request rejected while reading it, with the status the extractor chose.
    Rejected(StatusCode, String),
    ValidationError(Vec<FieldError>),
    /// A store or I/O failure. `detail` is logged and never sent to the client.
    Failed {
        status: StatusCode,
        message: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub fn internal(message: &'static str, detail: impl Display) -> Self {
        Self::Failed {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
            detail: detail.to_string(),
        }
    }

    pub fn bad_request(message: &'static str, detail: impl Display) -> Self {
        Self::Failed {
            status: StatusCode::BAD_REQUEST,
            message,
            detail: detail.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::UserAlreadyExists => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected(status, _) | ApiError::Failed { status, .. } => *status,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                let field = camel_case(&field);
                errors.iter().map(move |error| FieldError {
                    field: field.clone(),
                    message: error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| format!("Invalid {field}")),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(fields)
    }
}

/// Rule failures are reported under the wire name of the field.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert our custom errors to HTTP responses
///
/// Everything except a validation failure answers with `{ "message": ... }`.
/// Validation failures answer with the list of failing fields.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::InvalidCredentials => "Invalid email or password".to_string(),
            ApiError::UserAlreadyExists => "User already exists".to_string(),
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::NotFound(message) => message.to_string(),
            ApiError::BadRequest(message) | ApiError::Rejected(_, message) => message,
            ApiError::ValidationError(fields) => {
                return (status, Json(fields)).into_response();
            }
            ApiError::Failed {
                message, detail, ..
            } => {
                error!("{}: {}", message, detail);
                message.to_string()
            }
        };

        (
            status,
            Json(serde_json::json!({
              "message": message
            })),
        )
            .into_response()
    }
}
