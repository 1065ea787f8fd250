//! API route configuration.
//!
//! The user routes are described by a static table: every entry names its
//! path, its terminal endpoint and the ordered list of route stages that run
//! in front of it. [`build_router`] folds that table into an axum [`Router`]
//! once at startup and wraps the whole router in the global stages.
//!
//! Trailing slashes are trimmed before routing, so `/api/users/42/` reaches
//! the same route as `/api/users/42`. That has to happen outside the router:
//! layers added with [`Router::layer`] only run after a route has matched.

use axum::{
    http::Method,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use std::sync::Arc;
use tower::{Layer, ServiceBuilder};
use tower_http::{
    catch_panic::CatchPanicLayer,
    normalize_path::{NormalizePath, NormalizePathLayer},
    trace::TraceLayer,
};

use super::handlers::{self, AppState};
use crate::{
    error::panic_response,
    middleware::{
        authenticate, body_limit_middleware, log_request, parse_json_body, validate_user_id,
        BodyLimiter,
    },
};

/// Route-specific stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Authenticate,
    ValidateUserId,
}

/// Terminal handler of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    GetUser,
    CreateUser,
    UpdateUser,
    DeleteUser,
}

impl Endpoint {
    /// HTTP method the endpoint answers
    pub fn method(self) -> Method {
        match self {
            Endpoint::GetUser => Method::GET,
            Endpoint::CreateUser => Method::POST,
            Endpoint::UpdateUser => Method::PUT,
            Endpoint::DeleteUser => Method::DELETE,
        }
    }

    fn method_router(self) -> MethodRouter<AppState> {
        match self {
            Endpoint::GetUser => get(handlers::get_user),
            Endpoint::CreateUser => post(handlers::create_user),
            Endpoint::UpdateUser => put(handlers::update_user),
            Endpoint::DeleteUser => delete(handlers::delete_user),
        }
    }
}

/// One row of the routing table
#[derive(Debug, Clone, Copy)]
pub struct RouteSpec {
    pub path: &'static str,
    pub endpoint: Endpoint,
    pub stages: &'static [Stage],
}

const ID_ROUTE_STAGES: &[Stage] = &[Stage::Authenticate, Stage::ValidateUserId];

/// User routes and the stages each one runs
pub const USER_ROUTES: &[RouteSpec] = &[
    RouteSpec {
        path: "/api/users/:id",
        endpoint: Endpoint::GetUser,
        stages: ID_ROUTE_STAGES,
    },
    RouteSpec {
        path: "/api/users",
        endpoint: Endpoint::CreateUser,
        stages: &[Stage::Authenticate],
    },
    RouteSpec {
        path: "/api/users/:id",
        endpoint: Endpoint::UpdateUser,
        stages: ID_ROUTE_STAGES,
    },
    RouteSpec {
        path: "/api/users/:id",
        endpoint: Endpoint::DeleteUser,
        stages: ID_ROUTE_STAGES,
    },
];

/// Complete application service: the router behind path normalization
pub type App = NormalizePath<Router>;

/// Build the complete API router with all stages
pub fn build_router(app_state: AppState, body_limiter: Arc<BodyLimiter>) -> App {
    // Public routes (no auth)
    let public_routes = Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler));

    let api_routes = USER_ROUTES.iter().fold(Router::new(), |router, spec| {
        router.route(spec.path, build_route(spec, &app_state))
    });

    let router = public_routes
        .merge(api_routes)
        .fallback(handlers::not_found)
        .with_state(app_state);

    let app = with_global_stages(router, body_limiter);
    NormalizePathLayer::trim_trailing_slash().layer(app)
}

/// Wrap a router in the global stages.
///
/// Order, outermost first: panic conversion, tracing span, body limit, body
/// parsing, request logging. Panics raised by any later stage or handler are
/// turned into the uniform 500 response.
pub fn with_global_stages(router: Router, body_limiter: Arc<BodyLimiter>) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(TraceLayer::new_for_http())
            .layer(from_fn_with_state(body_limiter.clone(), body_limit_middleware))
            .layer(from_fn_with_state(body_limiter, parse_json_body))
            .layer(from_fn(log_request)),
    )
}

fn build_route(spec: &RouteSpec, state: &AppState) -> MethodRouter<AppState> {
    // Each layer wraps the previous one, so the first stage has to be added last.
    spec.stages
        .iter()
        .rev()
        .fold(spec.endpoint.method_router(), |route, stage| match stage {
            Stage::Authenticate => {
                route.route_layer(from_fn_with_state(state.verifier.clone(), authenticate))
            }
            Stage::ValidateUserId => route.route_layer(from_fn(validate_user_id)),
        })
}
