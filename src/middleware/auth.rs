//! Authentication stage

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::error::ApiError;

/// Credential verification capability used by the auth stage.
///
/// Receives the raw `Authorization` header value and decides whether the
/// request may proceed.
pub trait CredentialVerifier: Send + Sync {
    /// Verify a presented credential
    fn verify(&self, authorization: &str) -> Result<(), AuthError>;
}

/// Verifier that accepts exactly one `<scheme> <token>` header value
pub struct StaticTokenVerifier {
    expected: Secret<String>,
}

impl StaticTokenVerifier {
    /// Create a verifier for the given scheme and token
    pub fn new(scheme: &str, token: &Secret<String>) -> Self {
        Self {
            expected: Secret::new(format!("{} {}", scheme, token.expose_secret())),
        }
    }

    /// Create a verifier from configuration
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.scheme, &config.token)
    }
}

impl CredentialVerifier for StaticTokenVerifier {
    fn verify(&self, authorization: &str) -> Result<(), AuthError> {
        if authorization == self.expected.expose_secret().as_str() {
            debug!("Authentication successful");
            Ok(())
        } else {
            warn!("Authentication failed: invalid token");
            Err(AuthError::InvalidToken)
        }
    }
}

/// Authentication errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid or missing authentication token")]
    InvalidToken,

    #[error("Authentication is required but no token provided")]
    MissingToken,
}

/// Route stage: reject requests without the expected `Authorization` header
pub async fn authenticate(
    State(verifier): State<Arc<dyn CredentialVerifier>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req.headers().get(AUTHORIZATION).ok_or_else(|| {
        warn!("Missing authentication token");
        AuthError::MissingToken
    })?;

    let header = header.to_str().map_err(|_| {
        warn!("Authorization header is not valid UTF-8");
        AuthError::InvalidToken
    })?;

    verifier.verify(header)?;

    Ok(next.run(req).await)
}
