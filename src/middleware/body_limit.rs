//! Middleware for limiting request body size

use axum::{
    body::HttpBody,
    extract::{Request, State},
    http::header::CONTENT_LENGTH,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use super::body_parser::has_json_content_type;
use crate::error::ApiError;

/// Configuration for body size limiting
#[derive(Debug, Clone)]
pub struct BodyLimitConfig {
    /// Maximum body size in bytes
    pub max_body_size: usize,
}

impl Default for BodyLimitConfig {
    fn default() -> Self {
        Self {
            max_body_size: 100 * 1024,
        }
    }
}

/// Body size limiter shared by the limit and body-parse stages
#[derive(Debug, Clone)]
pub struct BodyLimiter {
    config: BodyLimitConfig,
}

impl BodyLimiter {
    /// Create a new body limiter
    pub fn new(config: BodyLimitConfig) -> Self {
        Self { config }
    }

    /// Get the maximum body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.config.max_body_size
    }

    /// Check a declared `Content-Length` against the limit
    pub fn check_declared_length(&self, declared: usize) -> Result<(), ApiError> {
        if declared > self.config.max_body_size {
            warn!(
                "Request body too large: {} bytes (max: {})",
                declared, self.config.max_body_size
            );
            return Err(ApiError::PayloadTooLarge {
                limit: self.config.max_body_size,
            });
        }
        Ok(())
    }
}

/// Global stage: reject JSON bodies whose declared length exceeds the limit.
///
/// Only bodies the parse stage would decode are checked; anything else is
/// never read and passes through untouched. The length comes from
/// `Content-Length`, or from the body itself when its size is known up front.
/// Streamed bodies of unknown size are bounded later, when the body-parse
/// stage buffers them.
pub async fn body_limit_middleware(
    State(limiter): State<Arc<BodyLimiter>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !has_json_content_type(req.headers()) {
        return Ok(next.run(req).await);
    }

    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok())
        .or_else(|| {
            req.body()
                .size_hint()
                .exact()
                .and_then(|len| usize::try_from(len).ok())
        });

    if let Some(len) = declared {
        limiter.check_declared_length(len)?;
    }

    Ok(next.run(req).await)
}
