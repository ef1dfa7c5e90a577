// DevHelm Control Plane Library
// Decision: Shared library for binaries (API server, operator tools) and integration tests
// Decision: The API-key authenticator wraps the whole router, fallback included, so
// unknown /api/ paths are rejected before they are reported as missing

// API routes and types (shared for OpenAPI generation)
pub mod api;

// Authentication: API keys for agents, JWT for app users
pub mod auth;

// Environment configuration
pub mod config;

// OpenAPI spec generation
pub mod openapi;

// Services layer
pub mod services;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    routing::get,
    Json, Router,
};
use devhelm_storage::StorageBackend;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::ErrorResponse;
use crate::auth::{authenticator, AuthConfig, AuthState};
use crate::openapi::ApiDoc;
use crate::services::TaskService;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage: &'static str,
}

/// State for health endpoint
#[derive(Clone)]
struct HealthState {
    storage: &'static str,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage,
    })
}

async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found")))
}

/// Build the full application router
pub fn build_app(
    db: StorageBackend,
    auth_config: AuthConfig,
    cors_origins: Vec<HeaderValue>,
) -> Router {
    let auth_state = AuthState::new(auth_config, db.clone());

    // Create module-specific states
    let agents_state = api::agents::AppState::new(auth_state.clone());
    let leads_state = api::leads::AppState::new(auth_state.clone());
    let hello_state = api::hello::AppState {
        agents: agents_state.service.clone(),
    };
    let tasks_state = api::tasks::AppState {
        service: Arc::new(TaskService::new(db.clone())),
    };
    let health_state = HealthState { storage: db.kind() };

    let app = Router::new()
        .route("/health", get(health).with_state(health_state))
        .merge(api::agents::routes(agents_state))
        .merge(api::leads::routes(leads_state))
        .merge(api::hello::routes(hello_state))
        .merge(api::tasks::routes(tasks_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(auth_state, authenticator));

    // Add CORS layer only if origins are configured
    let app = if !cors_origins.is_empty() {
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::ORIGIN,
                    header::HeaderName::from_static(auth::config::API_KEY_HEADER),
                ])
                .allow_credentials(true),
        )
    } else {
        app
    };

    app.layer(TraceLayer::new_for_http())
}
