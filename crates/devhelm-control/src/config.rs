// Server configuration loaded from environment variables
// Decision: No DATABASE_URL means dev mode on the in-memory backend

use axum::http::HeaderValue;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9000";
pub const DEFAULT_LOG_FILTER: &str = "devhelm_control=debug,tower_http=debug";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: Option<String>,
    pub bind_addr: String,
    /// Empty means same-origin only; no CORS layer is installed
    pub cors_origins: Vec<HeaderValue>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            bind_addr: std::env::var("BIND_ADDR")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            cors_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .map(|s| parse_cors_origins(&s))
                .unwrap_or_default(),
        }
    }
}

/// Comma-separated origins; unparsable entries are skipped
pub fn parse_cors_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}
