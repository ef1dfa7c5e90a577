// DevHelm control plane server
// Decision: PostgreSQL when DATABASE_URL is set, otherwise dev mode on the in-memory backend

use anyhow::{Context, Result};
use devhelm_control::auth::AuthConfig;
use devhelm_control::build_app;
use devhelm_control::config::{ServerConfig, DEFAULT_LOG_FILTER};
use devhelm_storage::StorageBackend;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "devhelm-control starting...");

    let config = ServerConfig::from_env();

    let db = match &config.database_url {
        Some(url) => {
            let db = StorageBackend::postgres(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database, migrations applied");
            db
        }
        None => {
            tracing::warn!("DATABASE_URL not set, running in dev mode with in-memory storage (data is lost on exit)");
            StorageBackend::in_memory()
        }
    };

    let auth_config = AuthConfig::from_env();
    tracing::info!(
        access_token_lifetime_secs = auth_config.jwt.access_token_lifetime.as_secs(),
        api_prefix = %auth_config.api_key.path_prefix,
        "Authentication configured"
    );

    if config.cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS origins configured");
    }

    let app = build_app(db, auth_config, config.cors_origins.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("HTTP server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
