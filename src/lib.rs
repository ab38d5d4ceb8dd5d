pub mod asset; // Asset Encoder: uploads as inline base64 assets
pub mod config;
pub mod error;
pub mod model; // Report Model + Builder
pub mod render; // Print / Word / Spreadsheet renderers
pub mod server; // Multipart intake + report routes

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

/// Start the report server.
///
/// Branding marks are loaded once before the socket binds; a missing mark is
/// a configuration fault and aborts startup.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let branding = model::Branding::load()?;
    let app = server::router(branding);

    let addr = SocketAddr::from(([0, 0, 0, 0], config::PORT));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "report server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
