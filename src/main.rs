//! Payroll engine HTTP server.
//!
//! Reads configuration from `PAYROLL_CONFIG_DIR` (default `./config/default`)
//! and listens on `PAYROLL_BIND_ADDR` (default `0.0.0.0:3000`).

use payroll_engine::api::{create_router, AppState};
use payroll_engine::config::ConfigLoader;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_CONFIG_DIR: &str = "./config/default";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,payroll_engine=debug".into()),
        )
        .init();

    let config_dir =
        std::env::var("PAYROLL_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let bind_addr =
        std::env::var("PAYROLL_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    let config = ConfigLoader::load(&config_dir)?;
    tracing::info!(
        organisation = %config.organisation().name,
        currency = %config.organisation().currency,
        version = %config.organisation().version,
        "Loaded payroll configuration from {config_dir}"
    );

    let app = create_router(AppState::from_config(&config));
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("payroll-engine listening on {bind_addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
