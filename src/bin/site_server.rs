// Site server binary entry point
//
// Purpose: start the Axum server for the contact form and content catalog
// Usage: cargo run --bin site_server

use site_content::{create_router, AppState, ServerConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "site_content=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting site server...");

    let config = ServerConfig::from_env()?;

    tracing::info!("Configuration:");
    tracing::info!("  PORT: {}", config.port);
    tracing::info!("  RECAPTCHA_VERIFY_URL: {}", config.captcha.verify_url);
    tracing::info!("  RECAPTCHA_TIMEOUT: {:?}", config.captcha.timeout);
    tracing::info!("  CONTACT_TO_ADDRESS: {}", config.notification.to_address);

    let state = AppState::new(&config)?;
    let app = create_router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Connect info provides the submitter address for verification
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await?;

    Ok(())
}
