//! Pipeline stages applied before the terminal handlers

pub mod auth;
pub mod body_limit;
pub mod body_parser;
pub mod logger;
pub mod validator;

pub use auth::{authenticate, AuthError, CredentialVerifier, StaticTokenVerifier};
pub use body_limit::{body_limit_middleware, BodyLimitConfig, BodyLimiter};
pub use body_parser::{parse_json_body, JsonBody};
pub use logger::{log_request, RequestId, X_REQUEST_ID};
pub use validator::{validate_user_id, InputValidator, ValidationError};
