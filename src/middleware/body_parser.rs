//! JSON body-parse stage

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{header::CONTENT_TYPE, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::debug;

use super::body_limit::BodyLimiter;
use crate::error::ApiError;

/// Request body fields decoded by the body-parse stage.
///
/// Requests without a JSON body carry an empty map, so handlers read missing
/// fields as absent rather than failing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonBody(pub Map<String, Value>);

impl JsonBody {
    /// Look up a body field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Access the decoded fields
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<JsonBody>().cloned().unwrap_or_default())
    }
}

/// Global stage: decode an `application/json` body into a [`JsonBody`].
///
/// Malformed JSON and top-level scalars are not client errors here; they
/// propagate to the error-conversion stage and surface as a 500.
pub async fn parse_json_body(
    State(limiter): State<Arc<BodyLimiter>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (parts, body) = req.into_parts();

    if !has_json_content_type(&parts.headers) {
        let mut req = Request::from_parts(parts, body);
        req.extensions_mut().insert(JsonBody::default());
        return Ok(next.run(req).await);
    }

    let bytes = axum::body::to_bytes(body, limiter.max_body_size()).await?;
    let parsed = decode_json_body(&bytes)?;
    debug!(fields = parsed.0.len(), "Decoded JSON body");

    let mut req = Request::from_parts(parts, Body::from(bytes));
    req.extensions_mut().insert(parsed);

    Ok(next.run(req).await)
}

/// Decode raw body bytes.
///
/// An empty body yields an empty map. Arrays are accepted but expose no named
/// fields. Any other top-level value is rejected.
pub fn decode_json_body(bytes: &[u8]) -> Result<JsonBody, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(JsonBody::default());
    }

    match serde_json::from_slice::<Value>(bytes)? {
        Value::Object(map) => Ok(JsonBody(map)),
        Value::Array(_) => Ok(JsonBody::default()),
        other => Err(ApiError::Internal(anyhow::anyhow!(
            "JSON body must be an object or array, got {}",
            json_kind(&other)
        ))),
    }
}

pub(crate) fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
