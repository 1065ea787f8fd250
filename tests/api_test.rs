//! API integration tests
//!
//! Drives the full router, global and route stages included, with
//! `tower::ServiceExt::oneshot`.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use serde_json::{json, Value};
use std::{
    convert::Infallible,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tower::{Service, ServiceExt};
use user_api::{
    api::{build_router, with_global_stages, App, AppState},
    ids::SequentialIdGenerator,
    middleware::{AuthError, BodyLimitConfig, BodyLimiter, CredentialVerifier, StaticTokenVerifier},
};

const AUTH: &str = "Bearer secret123";

/// Verifier that counts how often it is consulted
struct CountingVerifier {
    inner: StaticTokenVerifier,
    calls: AtomicUsize,
}

impl CredentialVerifier for CountingVerifier {
    fn verify(&self, authorization: &str) -> Result<(), AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(authorization)
    }
}

fn default_verifier() -> StaticTokenVerifier {
    StaticTokenVerifier::new("Bearer", &Secret::new("secret123".to_string()))
}

fn limiter(max_body_size: usize) -> Arc<BodyLimiter> {
    Arc::new(BodyLimiter::new(BodyLimitConfig { max_body_size }))
}

fn app_with(verifier: Arc<dyn CredentialVerifier>, max_body_size: usize) -> App {
    let state = AppState {
        verifier,
        ids: Arc::new(SequentialIdGenerator::starting_at(1000)),
    };
    build_router(state, limiter(max_body_size))
}

fn app() -> App {
    app_with(Arc::new(default_verifier()), 100 * 1024)
}

fn request(method: &str, uri: &str, auth: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send<S>(app: S, req: Request<Body>) -> (StatusCode, Value)
where
    S: Service<Request<Body>, Response = Response, Error = Infallible>,
{
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn protected_routes_require_exact_token() {
    let cases = [
        ("GET", "/api/users/42", None),
        ("POST", "/api/users", Some(r#"{"name":"A","email":"a@b.com"}"#)),
        ("PUT", "/api/users/7", Some(r#"{"name":"B"}"#)),
        ("DELETE", "/api/users/9", None),
    ];
    let bad_tokens = [None, Some("Bearer wrong"), Some("secret123"), Some("bearer secret123")];

    for (method, uri, body) in cases {
        for token in bad_tokens {
            let (status, json) = send(app(), request(method, uri, token, body)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {} {:?}", method, uri, token);
            assert_eq!(json, json!({"error": "Unauthorized"}));
        }
    }
}

#[tokio::test]
async fn unauthorized_create_has_no_side_effect() {
    let (status, json) = send(
        app(),
        request(
            "POST",
            "/api/users",
            Some("Bearer nope"),
            Some(r#"{"name":"A","email":"a@b.com"}"#),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json.get("id").is_none());
}

#[tokio::test]
async fn auth_runs_before_id_validation() {
    let (status, _) = send(app(), request("GET", "/api/users/abc", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn custom_verifier_is_consulted_once_per_request() {
    let verifier = Arc::new(CountingVerifier {
        inner: default_verifier(),
        calls: AtomicUsize::new(0),
    });
    let app = app_with(verifier.clone(), 1024);

    let (status, _) = send(app.clone(), request("GET", "/api/users/1", Some(AUTH), None)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(app, request("DELETE", "/api/users/1", Some("Bearer x"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(verifier.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn public_routes_skip_auth() {
    let (status, json) = send(app(), request("GET", "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");

    let (status, json) = send(app(), request("GET", "/", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "running");
}

// ---------------------------------------------------------------------------
// Id validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_numeric_ids_are_rejected() {
    for method in ["GET", "PUT", "DELETE"] {
        for id in ["abc", "x1", "-"] {
            let uri = format!("/api/users/{}", id);
            let (status, json) = send(app(), request(method, &uri, Some(AUTH), None)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", method, uri);
            assert_eq!(json, json!({"error": "User ID must be a number"}));
        }
    }
}

#[tokio::test]
async fn numeric_prefix_ids_are_accepted() {
    let (status, json) = send(app(), request("GET", "/api/users/42abc", Some(AUTH), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], "42abc");
}

#[tokio::test]
async fn undecodable_path_becomes_internal_error() {
    for method in ["GET", "PUT", "DELETE"] {
        let (status, json) = send(app(), request(method, "/api/users/%FF", Some(AUTH), None)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", method);
        assert_eq!(json, json!({"error": "Internal Server Error"}));
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn trailing_slash_reaches_the_same_route() {
    let (status, json) = send(app(), request("GET", "/api/users/42/", Some(AUTH), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"id": "42", "name": "User 42", "status": "active"}));

    let (status, json) = send(
        app(),
        request("POST", "/api/users/", Some(AUTH), Some(r#"{"name":"A","email":"a@b.com"}"#)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["id"], 1000);

    let (status, _) = send(app(), request("GET", "/health/", None, None)).await;
    assert_eq!(status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Get user
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_user_with_posts() {
    let (status, json) = send(
        app(),
        request("GET", "/api/users/42?includePosts=true", Some(AUTH), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], "42");
    assert_eq!(json["name"], "User 42");
    assert_eq!(json["status"], "active");
    assert_eq!(
        json["posts"],
        json!([
            {"id": 1, "title": "Hello World"},
            {"id": 2, "title": "Express.js is great!"}
        ])
    );
}

#[tokio::test]
async fn get_user_without_posts() {
    for uri in [
        "/api/users/42",
        "/api/users/42?includePosts=false",
        "/api/users/42?includePosts=TRUE",
        "/api/users/42?includePosts=1",
    ] {
        let (status, json) = send(app(), request("GET", uri, Some(AUTH), None)).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(json, json!({"id": "42", "name": "User 42", "status": "active"}));
    }
}

#[tokio::test]
async fn repeated_include_posts_omits_posts() {
    let (status, json) = send(
        app(),
        request("GET", "/api/users/42?includePosts=true&includePosts=false", Some(AUTH), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"id": "42", "name": "User 42", "status": "active"}));
}

#[tokio::test]
async fn get_user_is_idempotent() {
    let first = send(app(), request("GET", "/api/users/5", Some(AUTH), None)).await;
    let second = send(app(), request("GET", "/api/users/5", Some(AUTH), None)).await;
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Create user
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_user_success() {
    let (status, json) = send(
        app(),
        request("POST", "/api/users", Some(AUTH), Some(r#"{"name":"A","email":"a@b.com"}"#)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        json,
        json!({"id": 1000, "name": "A", "email": "a@b.com", "status": "active"})
    );
}

#[tokio::test]
async fn create_user_generates_fresh_ids() {
    let app = app();
    let body = Some(r#"{"name":"A","email":"a@b.com"}"#);
    let (_, first) = send(app.clone(), request("POST", "/api/users", Some(AUTH), body)).await;
    let (_, second) = send(app, request("POST", "/api/users", Some(AUTH), body)).await;
    assert_ne!(first["id"], second["id"]);
}

#[tokio::test]
async fn create_user_requires_name_and_email() {
    for body in [
        Some(r#"{"name":"A"}"#),
        Some(r#"{"email":"a@b.com"}"#),
        Some(r#"{"name":"","email":"a@b.com"}"#),
        Some("[]"),
        None,
    ] {
        let (status, json) = send(app(), request("POST", "/api/users", Some(AUTH), body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{:?}", body);
        assert_eq!(json, json!({"error": "Name and email are required"}));
    }
}

#[tokio::test]
async fn create_user_rejects_non_string_fields() {
    for body in [
        r#"{"name":5,"email":"a@b.com"}"#,
        r#"{"name":"A","email":true}"#,
        r#"{"name":["A"],"email":{"a":"b"}}"#,
    ] {
        let (status, json) =
            send(app(), request("POST", "/api/users", Some(AUTH), Some(body))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(json, json!({"error": "Name and email are required"}));
    }
}

#[tokio::test]
async fn non_json_content_type_is_treated_as_empty_body() {
    let req = Request::builder()
        .method("POST")
        .uri("/api/users")
        .header(header::AUTHORIZATION, AUTH)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(r#"{"name":"A","email":"a@b.com"}"#))
        .unwrap();

    let (status, _) = send(app(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Update and delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_user_echoes_fields() {
    let (status, json) = send(
        app(),
        request("PUT", "/api/users/7", Some(AUTH), Some(r#"{"name":"B","email":"b@c.com"}"#)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({"message": "User 7 updated", "name": "B", "email": "b@c.com"})
    );
}

#[tokio::test]
async fn update_user_without_body() {
    let (status, json) = send(app(), request("PUT", "/api/users/7", Some(AUTH), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"message": "User 7 updated"}));
}

#[tokio::test]
async fn update_user_echoes_non_string_values() {
    let (status, json) = send(
        app(),
        request("PUT", "/api/users/7", Some(AUTH), Some(r#"{"name":null,"email":5}"#)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"message": "User 7 updated", "name": null, "email": 5}));
}

#[tokio::test]
async fn delete_user() {
    let (status, json) = send(app(), request("DELETE", "/api/users/9", Some(AUTH), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"message": "User 9 deleted"}));
}

#[tokio::test]
async fn delete_user_is_idempotent() {
    let first = send(app(), request("DELETE", "/api/users/9", Some(AUTH), None)).await;
    let second = send(app(), request("DELETE", "/api/users/9", Some(AUTH), None)).await;
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Error conversion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_json_becomes_internal_error() {
    let (status, json) = send(
        app(),
        request("POST", "/api/users", Some(AUTH), Some(r#"{"name": "A", "#)),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({"error": "Internal Server Error"}));
}

#[tokio::test]
async fn body_parse_failure_precedes_auth() {
    let (status, _) = send(app(), request("PUT", "/api/users/1", None, Some("not json"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn scalar_json_body_becomes_internal_error() {
    let (status, json) = send(app(), request("PUT", "/api/users/1", Some(AUTH), Some("42"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Internal Server Error");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = app_with(Arc::new(default_verifier()), 16);
    let (status, json) = send(
        app,
        request("POST", "/api/users", Some(AUTH), Some(r#"{"name":"A","email":"a@b.com"}"#)),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({"error": "Internal Server Error"}));
}

#[tokio::test]
async fn oversized_non_json_body_is_ignored() {
    let app = app_with(Arc::new(default_verifier()), 1024);
    let req = Request::builder()
        .method("DELETE")
        .uri("/api/users/9")
        .header(header::AUTHORIZATION, AUTH)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("x".repeat(200 * 1024)))
        .unwrap();

    let (status, json) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"message": "User 9 deleted"}));
}

#[tokio::test]
async fn handler_panic_becomes_internal_error() {
    async fn explode() -> &'static str {
        panic!("handler exploded")
    }

    let router = Router::new().route("/explode", get(explode));
    let app = with_global_stages(router, limiter(1024));

    let (status, json) = send(app, request("GET", "/explode", None, None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({"error": "Internal Server Error"}));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (status, json) = send(app(), request("GET", "/api/nothing", Some(AUTH), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({"error": "Not Found"}));
}

// ---------------------------------------------------------------------------
// Logger stage
// ---------------------------------------------------------------------------

#[tokio::test]
async fn responses_carry_request_id() {
    let response = app()
        .oneshot(request("GET", "/api/users/1", Some(AUTH), None))
        .await
        .unwrap();
    let id = response.headers().get("x-request-id").unwrap();
    assert!(!id.is_empty());

    let mut req = request("GET", "/api/users/1", None, None);
    req.headers_mut()
        .insert("x-request-id", "abc-123".parse().unwrap());
    let response = app().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "abc-123");
}
