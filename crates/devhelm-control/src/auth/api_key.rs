// API-key authenticator for the agent-facing namespace
// Decision: Runs as router middleware; paths outside the namespace pass through untouched
// Decision: A missing key fails before any storage round trip
// Decision: Every other failure returns the same message so callers cannot tell which check failed

use std::collections::HashMap;

use axum::{
    extract::{Query, Request, State},
    http::{HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use devhelm_core::{AgentPrincipal, ControlError};
use thiserror::Error;

use super::{config::ApiKeyConfig, middleware::AuthError, AuthState};
use crate::api::ApiError;

/// Why an agent request could not be authenticated
#[derive(Debug, Error)]
pub enum ApiKeyError {
    #[error("API key is missing")]
    Missing,
    #[error("API key not found or expired")]
    NotFound,
    #[error("Failed to resolve API key: {0}")]
    Internal(#[from] ControlError),
}

impl IntoResponse for ApiKeyError {
    fn into_response(self) -> Response {
        match self {
            ApiKeyError::Missing | ApiKeyError::NotFound => {
                AuthError::authentication_failed(&self.to_string()).into_response()
            }
            ApiKeyError::Internal(e) => ApiError::from(e).into_response(),
        }
    }
}

/// Whether the authenticator applies to this path
pub fn supports(config: &ApiKeyConfig, path: &str) -> bool {
    path.starts_with(&config.path_prefix)
}

/// Candidate key from the header, falling back to the query string.
/// Empty values count as absent.
pub fn extract_api_key(config: &ApiKeyConfig, headers: &HeaderMap, uri: &Uri) -> Option<String> {
    // Opaque header bytes still name a key; they resolve to nothing rather than "missing"
    let from_header = headers
        .get(config.header.as_str())
        .map(|v| String::from_utf8_lossy(v.as_bytes()))
        .filter(|v| !v.is_empty());
    if let Some(key) = from_header {
        return Some(key.into_owned());
    }

    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(uri).ok()?;
    params
        .get(&config.query_param)
        .filter(|v| !v.is_empty())
        .cloned()
}

/// Resolve a request to its agent principal
pub async fn authenticate_request(
    state: &AuthState,
    headers: &HeaderMap,
    uri: &Uri,
) -> Result<AgentPrincipal, ApiKeyError> {
    let key = extract_api_key(&state.config.api_key, headers, uri).ok_or(ApiKeyError::Missing)?;

    state
        .api_keys
        .resolve(&key)
        .await?
        .ok_or(ApiKeyError::NotFound)
}

/// Middleware: authenticate requests under the API namespace and attach the
/// principal to request extensions
pub async fn authenticator(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    if !supports(&state.config.api_key, request.uri().path()) {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    match authenticate_request(&state, &parts.headers, &parts.uri).await {
        Ok(principal) => {
            tracing::debug!(agent_id = %principal.identifier(), "Agent authenticated");
            parts.extensions.insert(principal);
            next.run(Request::from_parts(parts, body)).await
        }
        Err(ApiKeyError::Internal(e)) => {
            tracing::error!("API key authentication error: {}", e);
            ApiKeyError::Internal(e).into_response()
        }
        Err(e) => {
            tracing::debug!(path = %parts.uri.path(), reason = %e, "API key authentication failed");
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    fn config() -> ApiKeyConfig {
        ApiKeyConfig::default()
    }

    #[test]
    fn test_supports_api_namespace_only() {
        let config = config();
        assert!(supports(&config, "/api/v1/hello-world"));
        assert!(supports(&config, "/api/anything"));
        assert!(!supports(&config, "/app/agents"));
        assert!(!supports(&config, "/health"));
        assert!(!supports(&config, "/apix"));
    }

    #[test]
    fn test_header_wins_over_query() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(b"X-API-KEY").unwrap(),
            HeaderValue::from_static("from-header"),
        );
        let uri: Uri = "/api/v1/hello-world?api_key=from-query".parse().unwrap();

        assert_eq!(
            extract_api_key(&config(), &headers, &uri).as_deref(),
            Some("from-header")
        );
    }

    #[test]
    fn test_query_fallback() {
        let uri: Uri = "/api/v1/hello-world?foo=1&api_key=from-query".parse().unwrap();
        assert_eq!(
            extract_api_key(&config(), &HeaderMap::new(), &uri).as_deref(),
            Some("from-query")
        );
    }

    #[test]
    fn test_empty_values_are_missing() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static(""));
        let uri: Uri = "/api/v1/hello-world?api_key=".parse().unwrap();
        assert!(extract_api_key(&config(), &headers, &uri).is_none());

        let bare: Uri = "/api/v1/hello-world".parse().unwrap();
        assert!(extract_api_key(&config(), &HeaderMap::new(), &bare).is_none());
    }

    #[test]
    fn test_empty_header_falls_back_to_query() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static(""));
        let uri: Uri = "/api/v1/hello-world?api_key=from-query".parse().unwrap();
        assert_eq!(
            extract_api_key(&config(), &headers, &uri).as_deref(),
            Some("from-query")
        );
    }

    #[test]
    fn test_opaque_header_is_still_a_candidate() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_bytes(b"k\xff\xfe").unwrap());
        let uri: Uri = "/api/v1/hello-world?api_key=from-query".parse().unwrap();

        let key = extract_api_key(&config(), &headers, &uri).unwrap();
        assert_ne!(key, "from-query");
        assert!(key.starts_with('k'));
    }

    #[test]
    fn test_custom_query_param() {
        let config = ApiKeyConfig {
            query_param: "token".to_string(),
            ..config()
        };
        let uri: Uri = "/api/v1/hello-world?token=abc".parse().unwrap();
        assert_eq!(
            extract_api_key(&config, &HeaderMap::new(), &uri).as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ApiKeyError::Missing.to_string(), "API key is missing");
        assert_eq!(ApiKeyError::NotFound.to_string(), "API key not found or expired");
    }
}
