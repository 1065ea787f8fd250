//! User API - a demonstration user CRUD service
//!
//! Requests flow through an ordered pipeline of stages:
//!
//! - **Global stages**: panic conversion, body size limit, JSON body parsing
//!   and request logging, applied to every request
//! - **Route stages**: bearer-token authentication and user-id validation,
//!   declared per route in a static routing table
//! - **Terminal handlers**: get, create, update and delete a synthetic user
//!
//! Any failure that is not a client error is converted into a uniform
//! `500 {"error":"Internal Server Error"}` response.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use user_api::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::from_file_with_env("config.toml")?;
//!     user_api::observability::init_observability(&config.logging);
//!     user_api::server::start_server(config).await
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod ids;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod shutdown;

pub use config::Config;
pub use error::{ApiError, Result, ServiceError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{build_router, AppState, User, UserStatus};
    pub use crate::config::Config;
    pub use crate::error::{ApiError, Result, ServiceError};
    pub use crate::ids::{ClockIdGenerator, IdGenerator, SequentialIdGenerator};
    pub use crate::middleware::{BodyLimiter, CredentialVerifier, StaticTokenVerifier};
}
