//! API request handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

use super::{
    extract::{Path, QueryPairs},
    models::{SuccessResponse, UpdateUserResponse, User},
};
use crate::{
    error::ApiError,
    ids::IdGenerator,
    middleware::{CredentialVerifier, InputValidator, JsonBody},
};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn CredentialVerifier>,
    pub ids: Arc<dyn IdGenerator>,
}

const INCLUDE_POSTS: &str = "includePosts";

/// Posts are included only when `includePosts` is given once, as the literal
/// `true`. A repeated key counts as a list, never as `true`.
pub fn wants_posts(query: &QueryPairs) -> bool {
    let mut values = query.values(INCLUDE_POSTS);
    matches!((values.next(), values.next()), (Some("true"), None))
}

/// Fetch a user
pub async fn get_user(Path(id): Path<String>, query: QueryPairs) -> impl IntoResponse {
    let include_posts = wants_posts(&query);
    let mut user = User::placeholder(&id);
    if include_posts {
        user = user.with_posts();
    }

    debug!(user_id = %id, include_posts, "Fetched user");
    (StatusCode::OK, Json(user))
}

/// Create a user
pub async fn create_user(
    State(state): State<AppState>,
    body: JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let (name, email) = InputValidator::validate_new_user(body.fields())?;
    let user = User::created(state.ids.next_id(), name, email);

    info!(user_id = ?user.id, "Created user");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Update a user; `name` and `email` are echoed as given
pub async fn update_user(Path(id): Path<String>, body: JsonBody) -> impl IntoResponse {
    info!(user_id = %id, "Updated user");
    (
        StatusCode::OK,
        Json(UpdateUserResponse {
            message: format!("User {} updated", id),
            name: body.field("name").cloned(),
            email: body.field("email").cloned(),
        }),
    )
}

/// Delete a user
pub async fn delete_user(Path(id): Path<String>) -> impl IntoResponse {
    info!(user_id = %id, "Deleted user");
    (
        StatusCode::OK,
        Json(SuccessResponse {
            message: format!("User {} deleted", id),
        }),
    )
}

/// Root handler
pub async fn root_handler() -> impl IntoResponse {
    Json(json!({
        "service": "User API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Liveness probe handler - always returns 200
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "healthy"})))
}

/// Fallback for unmatched paths
pub async fn not_found(uri: axum::http::Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
