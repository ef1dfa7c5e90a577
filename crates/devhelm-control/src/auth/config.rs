// Authentication configuration loaded from environment variables.
// Decision: AUTH_ prefix for all auth config
// Decision: Agent API-key settings are fixed, only the JWT side is configurable

use std::time::Duration;

/// Path prefix that the API-key authenticator guards
pub const API_PATH_PREFIX: &str = "/api/";

/// Header carrying the agent API key (header names are case-insensitive)
pub const API_KEY_HEADER: &str = "x-api-key";

/// Query-string fallback for the agent API key
pub const API_KEY_QUERY_PARAM: &str = "api_key";

/// Cookie carrying the app-user access token
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

const DEFAULT_ACCESS_TOKEN_LIFETIME: Duration = Duration::from_secs(15 * 60);

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWTs
    pub secret: String,
    /// Access token lifetime
    pub access_token_lifetime: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_lifetime: DEFAULT_ACCESS_TOKEN_LIFETIME,
        }
    }
}

/// Agent API-key extraction settings
#[derive(Debug, Clone)]
pub struct ApiKeyConfig {
    pub path_prefix: String,
    pub header: String,
    pub query_param: String,
}

impl Default for ApiKeyConfig {
    fn default() -> Self {
        Self {
            path_prefix: API_PATH_PREFIX.to_string(),
            header: API_KEY_HEADER.to_string(),
            query_param: API_KEY_QUERY_PARAM.to_string(),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
    pub api_key: ApiKeyConfig,
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let secret = std::env::var("AUTH_JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                tracing::warn!(
                    "AUTH_JWT_SECRET not set, using a random secret (tokens will not survive a restart)"
                );
                random_secret()
            });

        let access_token_lifetime = std::env::var("AUTH_ACCESS_TOKEN_LIFETIME")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_ACCESS_TOKEN_LIFETIME);

        Self {
            jwt: JwtConfig {
                secret,
                access_token_lifetime,
            },
            api_key: ApiKeyConfig::default(),
        }
    }

    /// Config with a random JWT secret, used by tests and dev tooling
    pub fn with_random_secret() -> Self {
        Self {
            jwt: JwtConfig {
                secret: random_secret(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

fn random_secret() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}
