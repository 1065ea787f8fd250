//! User API Server Binary
//!
//! Loads configuration (defaults, optional `config.toml`, `USER_API__*`
//! environment overrides), initializes logging and serves until shutdown.

use user_api::{config::Config, observability::init_observability, server::start_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let config = Config::from_file_with_env(&config_path)?;

    init_observability(&config.logging);
    tracing::info!("Configuration loaded and validated from {}", config_path);

    start_server(config).await?;

    Ok(())
}
