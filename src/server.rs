//! HTTP server assembly and startup

use axum::{extract::Request, ServiceExt};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::{
    api::{build_router, App, AppState},
    config::Config,
    error::Result,
    ids::ClockIdGenerator,
    middleware::{BodyLimitConfig, BodyLimiter, StaticTokenVerifier},
    shutdown::shutdown_signal,
};

/// Build the application router from configuration
pub fn create_app(config: &Config) -> App {
    let app_state = AppState {
        verifier: Arc::new(StaticTokenVerifier::from_config(&config.auth)),
        ids: Arc::new(ClockIdGenerator::new()),
    };

    let body_limiter = Arc::new(BodyLimiter::new(BodyLimitConfig {
        max_body_size: config.server.max_body_size_bytes(),
    }));

    build_router(app_state, body_limiter)
}

/// Bind the configured address and serve until Ctrl+C or SIGTERM
pub async fn start_server(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    serve(listener, &config, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, config: &Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_app(config);
    let local_addr = listener.local_addr()?;

    info!("Server is running at http://localhost:{}", local_addr.port());

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
