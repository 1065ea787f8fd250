//! Request logger stage.
//!
//! Logs the timestamp, method and full path of every request that gets past
//! body parsing. Each request is tagged with an id (taken from `x-request-id`
//! or generated) that is recorded on the tracing span and echoed in the
//! response.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::{SecondsFormat, Utc};
use tracing::{info, Instrument};
use uuid::Uuid;

/// Header name used for the request identifier.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request identifier stored in request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Global stage: log the request line and tag it with a request id
pub async fn log_request(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(id.clone()));

    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let span = tracing::info_span!("request", request_id = %id);
    info!(
        parent: &span,
        timestamp = %Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        method = %req.method(),
        path = %path,
        "{} {}",
        req.method(),
        path
    );

    let mut response = next.run(req).instrument(span).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(X_REQUEST_ID.clone(), val);
    }

    response
}
