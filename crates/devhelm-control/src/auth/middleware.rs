// App-user authentication extractor
// Decision: Support both cookie-based (UI) and header-based (API) JWT auth
// Decision: The user is reloaded on every request so team changes apply immediately

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use devhelm_core::{ControlError, User};
use devhelm_storage::StorageBackend;
use serde::Serialize;
use uuid::Uuid;

use super::{
    config::{AuthConfig, ACCESS_TOKEN_COOKIE},
    jwt::JwtService,
};
use crate::services::ApiKeyService;

/// Authentication error
#[derive(Debug, Clone, Serialize)]
pub struct AuthError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip)]
    pub status: StatusCode,
}

impl AuthError {
    pub fn unauthorized(message: &str) -> Self {
        Self {
            error: message.to_string(),
            message: None,
            status: StatusCode::UNAUTHORIZED,
        }
    }

    /// Uniform agent API-key failure: `{"error": "Authentication failed", "message": ...}`
    pub fn authentication_failed(message: &str) -> Self {
        Self {
            error: "Authentication failed".to_string(),
            message: Some(message.to_string()),
            status: StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Authenticated app user loaded from storage
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub team_id: Option<Uuid>,
}

impl AuthUser {
    /// Team of the caller, or `NoTeam`
    pub fn require_team(&self) -> Result<Uuid, ControlError> {
        self.team_id.ok_or(ControlError::NoTeam)
    }
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            team_id: user.team_id,
        }
    }
}

/// Auth state shared across routes
#[derive(Clone)]
pub struct AuthState {
    pub config: AuthConfig,
    pub jwt_service: Arc<JwtService>,
    pub api_keys: Arc<ApiKeyService>,
    pub db: StorageBackend,
}

impl AuthState {
    pub fn new(config: AuthConfig, db: StorageBackend) -> Self {
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        let api_keys = Arc::new(ApiKeyService::new(db.clone()));
        Self {
            config,
            jwt_service,
            api_keys,
            db,
        }
    }
}

/// Extractor for the authenticated app user.
/// Returns 401 if not authenticated.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        extract_auth_user(parts, &auth_state).await
    }
}

/// Find the access token: Authorization header first, then cookie
fn bearer_token(parts: &Parts) -> Option<String> {
    if let Some(value) = parts.headers.get(header::AUTHORIZATION) {
        if let Some(token) = value.to_str().ok().and_then(|v| v.strip_prefix("Bearer ")) {
            return Some(token.trim().to_string());
        }
    }

    let jar = CookieJar::from_headers(&parts.headers);
    jar.get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

async fn extract_auth_user(parts: &Parts, auth_state: &AuthState) -> Result<AuthUser, Response> {
    let token = bearer_token(parts)
        .ok_or_else(|| AuthError::unauthorized("Authentication required").into_response())?;

    let claims = auth_state
        .jwt_service
        .validate_access_token(&token)
        .map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            AuthError::unauthorized("Invalid or expired token").into_response()
        })?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
        AuthError::unauthorized("Invalid user ID in token").into_response()
    })?;

    let user = auth_state
        .db
        .get_user(user_id)
        .await
        .map_err(|e| crate::api::ApiError::Internal(e).into_response())?
        .ok_or_else(|| AuthError::unauthorized("User not found").into_response())?;

    Ok(AuthUser::from(User::from(user)))
}
