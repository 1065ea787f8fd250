//! Input validation for path parameters and request bodies

use axum::{extract::Request, middleware::Next, response::Response};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::{api::extract::Path, error::ApiError};

/// Input validator
pub struct InputValidator;

impl InputValidator {
    /// Parse the leading integer of a user id.
    ///
    /// Accepts optional leading whitespace and a sign followed by at least one
    /// ASCII digit. Anything after the digits is ignored, so `"42abc"` yields
    /// `42`.
    pub fn parse_user_id(raw: &str) -> Result<i64, ValidationError> {
        let trimmed = raw.trim_start();
        let (negative, unsigned) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let digits_len = unsigned
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();

        if digits_len == 0 {
            warn!("Validation failed: user id '{}' is not a number", raw);
            return Err(ValidationError::InvalidUserId);
        }

        // Saturate on overflow; the id only has to be numeric.
        let magnitude = unsigned[..digits_len]
            .parse::<i64>()
            .unwrap_or(i64::MAX);

        debug!("User id validation passed");
        Ok(if negative { -magnitude } else { magnitude })
    }

    /// Extract the `name` and `email` a new user requires
    pub fn validate_new_user(
        body: &Map<String, Value>,
    ) -> Result<(String, String), ValidationError> {
        match (Self::required_str(body, "name"), Self::required_str(body, "email")) {
            (Some(name), Some(email)) => Ok((name.to_string(), email.to_string())),
            _ => {
                warn!("Validation failed: name and email are required");
                Err(ValidationError::MissingUserFields)
            }
        }
    }

    fn required_str<'a>(body: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
        body.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Validation errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("User ID must be a number")]
    InvalidUserId,

    #[error("Name and email are required")]
    MissingUserFields,
}

/// Route stage: reject requests whose `id` path parameter is not numeric
pub async fn validate_user_id(
    Path(params): Path<HashMap<String, String>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw = params.get("id").map(String::as_str).unwrap_or_default();
    InputValidator::parse_user_id(raw)?;

    Ok(next.run(req).await)
}
