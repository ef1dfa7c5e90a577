// Example agent endpoint: echoes the authenticated identity

use axum::{extract::State, routing::get, Extension, Json, Router};
use devhelm_core::AgentPrincipal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::AgentService;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HelloAgent {
    pub id: Uuid,
    pub name: String,
    pub authenticated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HelloWorldResponse {
    /// Agent name, or "world" without an identity
    #[schema(example = "Bot1")]
    pub hello: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<HelloAgent>,
}

#[derive(Clone)]
pub struct AppState {
    pub agents: Arc<AgentService>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/hello-world", get(hello_world))
        .with_state(state)
}

/// GET /api/v1/hello-world
#[utoipa::path(
    get,
    path = "/api/v1/hello-world",
    responses(
        (status = 200, description = "Greeting for the calling agent", body = HelloWorldResponse),
        (status = 401, description = "API key missing or not accepted")
    ),
    security(("api_key" = [])),
    tag = "agent-api"
)]
pub async fn hello_world(
    State(state): State<AppState>,
    principal: Option<Extension<AgentPrincipal>>,
) -> Json<HelloWorldResponse> {
    let Some(Extension(principal)) = principal else {
        return Json(HelloWorldResponse {
            hello: "world".to_string(),
            agent: None,
        });
    };

    let agent = principal.agent();
    // A failed heartbeat must not fail the request
    if let Err(e) = state.agents.record_seen(agent.id).await {
        tracing::warn!(agent_id = %agent.id, "Failed to record last_seen: {}", e);
    }

    Json(HelloWorldResponse {
        hello: agent.name.clone(),
        agent: Some(HelloAgent {
            id: agent.id,
            name: agent.name.clone(),
            authenticated: true,
        }),
    })
}
