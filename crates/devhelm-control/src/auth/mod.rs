// Authentication module
//
// Two surfaces:
// - /api/: agents authenticate with an API key (X-API-KEY header or api_key query parameter)
// - /app/: team members authenticate with a JWT access token (Bearer header or cookie)

pub mod api_key;
pub mod config;
pub mod jwt;
pub mod middleware;

pub use api_key::{authenticator, ApiKeyError};
pub use config::{ApiKeyConfig, AuthConfig, JwtConfig};
pub use jwt::JwtService;
pub use middleware::{AuthError, AuthState, AuthUser};
