use crate::errors::ApiError;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use tracing::debug;
use validator::Validate;

/// Reads a required string field. Any other JSON type reads as empty, so
/// the field's own rule reports it instead of the body failing to parse.
fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(value) => value,
        _ => String::new(),
    })
}

#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default, deserialize_with = "string_or_empty")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    #[validate(length(min = 5, message = "Password must be at least 5 characters"))]
    pub password: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    #[validate(length(min = 3, message = "Full name must be at least 3 characters"))]
    pub full_name: String,
    #[validate(url(message = "Invalid avatar URL"))]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "string_or_empty")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    #[validate(length(min = 5, message = "Password must be at least 5 characters"))]
    pub password: String,
}

/// Body of both post create and post update.
#[derive(Debug, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    #[serde(default, deserialize_with = "string_or_empty")]
    #[validate(length(min = 3, message = "Enter the post title"))]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    #[validate(length(min = 5, message = "Enter the post text"))]
    pub text: String,
    pub tags: Option<String>,
    pub image_url: Option<String>,
}

impl PostRequest {
    pub fn tag_list(&self) -> Vec<String> {
        self.tags.as_deref().map(split_tags).unwrap_or_default()
    }
}

/// Splits a comma separated tag string. Segments are kept verbatim, so
/// `"a,,b"` yields an empty tag in the middle.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_string).collect()
}

/// JSON body that has passed its `Validate` rules.
///
/// A body that cannot be parsed answers 400 with a single message; a body
/// that parses but breaks rules answers 400 with every failing field.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                debug!("Rejected request body: {}", rejection.body_text());
                ApiError::BadRequest(rejection_message(&rejection).to_string())
            })?;
        value.validate()?;
        Ok(Self(value))
    }
}

fn rejection_message(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::JsonSyntaxError(_) => "Malformed JSON body",
        JsonRejection::MissingJsonContentType(_) => "Expected a JSON body",
        _ => "Invalid request body",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_request(json: serde_json::Value) -> PostRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn tags_split_verbatim() {
        assert_eq!(split_tags("x,y,z"), ["x", "y", "z"]);
        assert_eq!(split_tags("a,,b"), ["a", "", "b"]);
        assert_eq!(split_tags(" a, b"), [" a", " b"]);
        assert_eq!(split_tags(""), [""]);
    }

    #[test]
    fn missing_tags_mean_no_tags() {
        let request = post_request(serde_json::json!({ "title": "Title", "text": "Hello" }));
        assert!(request.tag_list().is_empty());
    }

    #[test]
    fn post_rules() {
        let valid = post_request(serde_json::json!({
            "title": "Title",
            "text": "Hello",
            "tags": "x,y",
            "imageUrl": "/uploads/cat.png"
        }));
        assert!(valid.validate().is_ok());

        let invalid = post_request(serde_json::json!({ "title": "A", "text": "Hi" }));
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("text"));
    }

    #[test]
    fn register_rules() {
        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "email": "not-an-email",
            "password": "123",
            "fullName": "Jo",
            "avatarUrl": "nope"
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 4);

        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "email": "jane@example.com",
            "password": "12345",
            "fullName": "Jane Doe"
        }))
        .unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn wrong_typed_strings_reach_validation() {
        let request = post_request(serde_json::json!({ "title": 12345, "text": null }));
        assert_eq!(request.title, "");
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("text"));

        let request: LoginRequest =
            serde_json::from_value(serde_json::json!({ "email": true, "password": 123456 }))
                .unwrap();
        assert_eq!(request.validate().unwrap_err().field_errors().len(), 2);
    }

    #[test]
    fn missing_login_fields_fail_validation() {
        let request: LoginRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);
    }
}
