//! HTTP API: routing table, handlers and response models

pub mod extract;
pub mod handlers;
pub mod models;
pub mod routes;

pub use extract::{Path, QueryPairs};
pub use handlers::AppState;
pub use models::{Post, User, UserId, UserStatus};
pub use routes::{build_router, with_global_stages, App, Endpoint, RouteSpec, Stage, USER_ROUTES};
