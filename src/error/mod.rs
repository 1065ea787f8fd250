//! Error types for the user API

use std::any::Any;

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::middleware::{AuthError, ValidationError};

/// Result type alias for service setup and lifecycle operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors raised while configuring, binding or running the service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ServiceError {
    fn from(err: config::ConfigError) -> Self {
        ServiceError::Config(err.to_string())
    }
}

/// Errors produced by pipeline stages and terminal handlers.
///
/// Every variant converts into a JSON response through [`IntoResponse`], which
/// makes this type the single error-conversion point of the pipeline. Client
/// errors carry their own message; everything else collapses into an opaque
/// 500 and is logged with its cause.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication error: {0}")]
    Unauthorized(#[from] AuthError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("No route for {0}")]
    NotFound(String),

    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("Failed to read request body: {0}")]
    BodyRead(#[from] axum::Error),

    #[error("Invalid path parameters: {0}")]
    PathParams(#[from] PathRejection),

    #[error("Invalid query string: {0}")]
    QueryString(#[from] QueryRejection),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge { .. }
            | ApiError::MalformedBody(_)
            | ApiError::BodyRead(_)
            | ApiError::PathParams(_)
            | ApiError::QueryString(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to the caller
    fn public_message(&self) -> String {
        match self {
            ApiError::Unauthorized(_) => "Unauthorized".to_string(),
            ApiError::Validation(e) => e.to_string(),
            ApiError::NotFound(_) => "Not Found".to_string(),
            _ => INTERNAL_SERVER_ERROR.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!("Unhandled error: {}", self);
        } else {
            debug!(status = status.as_u16(), "Request rejected: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}

const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Error body shared by every failure response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert a caught panic into the uniform 500 response
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    error!("Unhandled error: handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: INTERNAL_SERVER_ERROR.to_string(),
        }),
    )
        .into_response()
}
