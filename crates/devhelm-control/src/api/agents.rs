// Agent management HTTP routes (app-facing, team scoped)

use axum::{
    extract::{rejection::JsonRejection, FromRef, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use devhelm_core::{mask_api_key, Agent, AgentStatus, ApiKey, ApiKeyStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{ApiError, ErrorResponse, ListResponse, ValidationErrorResponse, TIMESTAMP_FORMAT};
use super::validation::{validate_agent_input, Validator};
use crate::auth::{AuthState, AuthUser};
use crate::services::AgentService;

/// Request to create or edit an agent
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AgentRequest {
    /// Display name, unique per team by convention.
    #[serde(default)]
    #[schema(example = "Bot1")]
    pub name: String,
    /// Short project code.
    #[serde(default)]
    #[schema(example = "DEV")]
    pub project: String,
}

impl AgentRequest {
    /// Trimmed name and project; validation and storage see the same values
    pub fn normalized(&self) -> (String, String) {
        (
            self.name.trim().to_string(),
            self.project.trim().to_string(),
        )
    }
}

/// Request to change an agent's status
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateAgentStatusRequest {
    /// One of `enabled`, `disabled`, `unresponsive`.
    #[serde(default)]
    #[schema(example = "disabled")]
    pub status: String,
}

/// Agent as shown to team members
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AgentResponse {
    pub id: Uuid,
    pub name: String,
    pub project: String,
    pub team_id: Uuid,
    pub status: AgentStatus,
    /// Formatted as `YYYY-MM-DD HH:MM:SS` (UTC).
    #[schema(example = "2025-06-01 12:00:00")]
    pub created_at: String,
    /// The first API key. Only present in the creation response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl From<&Agent> for AgentResponse {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id,
            name: agent.name.clone(),
            project: agent.project.clone(),
            team_id: agent.team_id,
            status: agent.status,
            created_at: agent.created_at.format(TIMESTAMP_FORMAT).to_string(),
            api_key: None,
        }
    }
}

/// Agent list. Pagination is not implemented: `has_more` is always false.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AgentListResponse {
    pub data: Vec<AgentResponse>,
    pub has_more: bool,
    /// ID of the last agent in `data`
    pub last_key: Option<Uuid>,
}

/// API key summary. The key itself is masked.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiKeySummary {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub status: ApiKeyStatus,
    #[schema(example = "3f9a1c2e...")]
    pub key_preview: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&ApiKey> for ApiKeySummary {
    fn from(key: &ApiKey) -> Self {
        Self {
            id: key.id,
            agent_id: key.agent_id,
            status: key.status,
            key_preview: mask_api_key(&key.key),
            expires_at: key.expires_at,
            created_at: key.created_at,
        }
    }
}

/// Newly issued API key. The full key is shown only once.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssuedApiKeyResponse {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub key: String,
    pub status: ApiKeyStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<ApiKey> for IssuedApiKeyResponse {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            agent_id: key.agent_id,
            key: key.key,
            status: key.status,
            expires_at: key.expires_at,
            created_at: key.created_at,
        }
    }
}

/// App state for agents routes
#[derive(Clone, FromRef)]
pub struct AppState {
    pub service: Arc<AgentService>,
    pub auth: AuthState,
}

impl AppState {
    pub fn new(auth: AuthState) -> Self {
        Self {
            service: Arc::new(AgentService::new(auth.db.clone(), auth.api_keys.clone())),
            auth,
        }
    }
}

/// Create agent routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/app/agents", post(create_agent).get(list_agents))
        .route(
            "/app/agents/{agent_id}",
            get(get_agent).post(update_agent).delete(delete_agent),
        )
        .route("/app/agents/{agent_id}/status", post(update_agent_status))
        .route(
            "/app/agents/{agent_id}/api-keys",
            get(list_api_keys).post(create_api_key),
        )
        .route(
            "/app/agents/{agent_id}/api-keys/{key_id}",
            delete(revoke_api_key),
        )
        .with_state(state)
}

/// Malformed IDs cannot name an existing agent
fn parse_agent_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Agent not found".to_string()))
}

/// POST /app/agents - Create an agent and issue its first API key
#[utoipa::path(
    post,
    path = "/app/agents",
    request_body = AgentRequest,
    responses(
        (status = 201, description = "Agent created", body = AgentResponse),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "User has no team", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "agents"
)]
pub async fn create_agent(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<AgentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AgentResponse>), ApiError> {
    tracing::info!(user_id = %user.id, "Agent creation request received");
    let team_id = user.require_team()?;
    let Json(req) = payload?;
    let (name, project) = req.normalized();
    validate_agent_input(&name, &project)?;

    let (agent, key) = state.service.create(team_id, name, project).await?;

    let mut response = AgentResponse::from(&agent);
    response.api_key = Some(key.key);
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /app/agents - List the team's agents
#[utoipa::path(
    get,
    path = "/app/agents",
    responses(
        (status = 200, description = "List of agents", body = AgentListResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "User has no team", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "agents"
)]
pub async fn list_agents(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<AgentListResponse>, ApiError> {
    let team_id = user.require_team()?;
    let agents = state.service.list_for_team(team_id).await?;

    let data: Vec<AgentResponse> = agents.iter().map(AgentResponse::from).collect();
    let last_key = data.last().map(|a| a.id);
    Ok(Json(AgentListResponse {
        data,
        has_more: false,
        last_key,
    }))
}

/// GET /app/agents/{agent_id} - Get one agent
#[utoipa::path(
    get,
    path = "/app/agents/{agent_id}",
    params(
        ("agent_id" = Uuid, Path, description = "Agent ID")
    ),
    responses(
        (status = 200, description = "Agent found", body = AgentResponse),
        (status = 403, description = "User has no team", body = ErrorResponse),
        (status = 404, description = "Agent not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "agents"
)]
pub async fn get_agent(
    State(state): State<AppState>,
    user: AuthUser,
    Path(agent_id): Path<String>,
) -> Result<Json<AgentResponse>, ApiError> {
    let team_id = user.require_team()?;
    let agent_id = parse_agent_id(&agent_id)?;
    let agent = state.service.get_for_team(team_id, agent_id).await?;
    Ok(Json(AgentResponse::from(&agent)))
}

/// POST /app/agents/{agent_id} - Edit name and project
#[utoipa::path(
    post,
    path = "/app/agents/{agent_id}",
    params(
        ("agent_id" = Uuid, Path, description = "Agent ID")
    ),
    request_body = AgentRequest,
    responses(
        (status = 200, description = "Agent updated", body = AgentResponse),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 403, description = "User has no team", body = ErrorResponse),
        (status = 404, description = "Agent not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "agents"
)]
pub async fn update_agent(
    State(state): State<AppState>,
    user: AuthUser,
    Path(agent_id): Path<String>,
    payload: Result<Json<AgentRequest>, JsonRejection>,
) -> Result<Json<AgentResponse>, ApiError> {
    tracing::info!(agent_id = %agent_id, "Agent edit request received");
    let team_id = user.require_team()?;
    let agent_id = parse_agent_id(&agent_id)?;
    // Unknown agents are reported before body problems
    state.service.get_for_team(team_id, agent_id).await?;

    let Json(req) = payload?;
    let (name, project) = req.normalized();
    validate_agent_input(&name, &project)?;

    let agent = state
        .service
        .update(team_id, agent_id, name, project)
        .await?;
    Ok(Json(AgentResponse::from(&agent)))
}

/// POST /app/agents/{agent_id}/status - Change status
#[utoipa::path(
    post,
    path = "/app/agents/{agent_id}/status",
    params(
        ("agent_id" = Uuid, Path, description = "Agent ID")
    ),
    request_body = UpdateAgentStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = AgentResponse),
        (status = 400, description = "Unknown status", body = ValidationErrorResponse),
        (status = 404, description = "Agent not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "agents"
)]
pub async fn update_agent_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(agent_id): Path<String>,
    payload: Result<Json<UpdateAgentStatusRequest>, JsonRejection>,
) -> Result<Json<AgentResponse>, ApiError> {
    let team_id = user.require_team()?;
    let agent_id = parse_agent_id(&agent_id)?;
    let Json(req) = payload?;
    Validator::new()
        .required("status", "Status", &req.status)
        .finish()?;
    let status: AgentStatus = req.status.trim().parse()?;

    let agent = state.service.set_status(team_id, agent_id, status).await?;
    Ok(Json(AgentResponse::from(&agent)))
}

/// DELETE /app/agents/{agent_id} - Soft delete
#[utoipa::path(
    delete,
    path = "/app/agents/{agent_id}",
    params(
        ("agent_id" = Uuid, Path, description = "Agent ID")
    ),
    responses(
        (status = 204, description = "Agent deleted"),
        (status = 404, description = "Agent not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "agents"
)]
pub async fn delete_agent(
    State(state): State<AppState>,
    user: AuthUser,
    Path(agent_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let team_id = user.require_team()?;
    let agent_id = parse_agent_id(&agent_id)?;
    state.service.delete(team_id, agent_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /app/agents/{agent_id}/api-keys - List keys (masked)
#[utoipa::path(
    get,
    path = "/app/agents/{agent_id}/api-keys",
    params(
        ("agent_id" = Uuid, Path, description = "Agent ID")
    ),
    responses(
        (status = 200, description = "Keys of the agent", body = ListResponse<ApiKeySummary>),
        (status = 404, description = "Agent not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "agents"
)]
pub async fn list_api_keys(
    State(state): State<AppState>,
    user: AuthUser,
    Path(agent_id): Path<String>,
) -> Result<Json<ListResponse<ApiKeySummary>>, ApiError> {
    let team_id = user.require_team()?;
    let agent_id = parse_agent_id(&agent_id)?;
    let keys = state.service.list_api_keys(team_id, agent_id).await?;
    Ok(Json(ListResponse::new(
        keys.iter().map(ApiKeySummary::from).collect(),
    )))
}

/// POST /app/agents/{agent_id}/api-keys - Issue an additional key
#[utoipa::path(
    post,
    path = "/app/agents/{agent_id}/api-keys",
    params(
        ("agent_id" = Uuid, Path, description = "Agent ID")
    ),
    responses(
        (status = 201, description = "Key issued", body = IssuedApiKeyResponse),
        (status = 404, description = "Agent not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "agents"
)]
pub async fn create_api_key(
    State(state): State<AppState>,
    user: AuthUser,
    Path(agent_id): Path<String>,
) -> Result<(StatusCode, Json<IssuedApiKeyResponse>), ApiError> {
    let team_id = user.require_team()?;
    let agent_id = parse_agent_id(&agent_id)?;
    let key = state.service.issue_api_key(team_id, agent_id).await?;
    Ok((StatusCode::CREATED, Json(IssuedApiKeyResponse::from(key))))
}

/// DELETE /app/agents/{agent_id}/api-keys/{key_id} - Revoke a key
#[utoipa::path(
    delete,
    path = "/app/agents/{agent_id}/api-keys/{key_id}",
    params(
        ("agent_id" = Uuid, Path, description = "Agent ID"),
        ("key_id" = Uuid, Path, description = "API key ID")
    ),
    responses(
        (status = 204, description = "Key revoked"),
        (status = 404, description = "Agent or key not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "agents"
)]
pub async fn revoke_api_key(
    State(state): State<AppState>,
    user: AuthUser,
    Path((agent_id, key_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let team_id = user.require_team()?;
    let agent_id = parse_agent_id(&agent_id)?;
    let key_id = Uuid::parse_str(&key_id)
        .map_err(|_| ApiError::NotFound("API key not found".to_string()))?;
    state.service.revoke_api_key(team_id, agent_id, key_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_request_is_trimmed_before_validation() {
        let req = AgentRequest {
            name: " a".to_string(),
            project: "D ".to_string(),
        };
        let (name, project) = req.normalized();
        assert_eq!((name.as_str(), project.as_str()), ("a", "D"));
        assert!(validate_agent_input(&name, &project).is_err());
    }

    #[test]
    fn test_agent_response_format() {
        let created_at = Utc.with_ymd_and_hms(2025, 6, 1, 9, 5, 3).unwrap();
        let agent = Agent {
            id: Uuid::now_v7(),
            team_id: Uuid::now_v7(),
            name: "Bot1".to_string(),
            project: "DEV".to_string(),
            status: AgentStatus::Enabled,
            last_seen: None,
            server_address: None,
            created_at,
            updated_at: created_at,
            deleted_at: None,
        };

        let json = serde_json::to_value(AgentResponse::from(&agent)).unwrap();
        assert_eq!(json["name"], "Bot1");
        assert_eq!(json["project"], "DEV");
        assert_eq!(json["status"], "enabled");
        assert_eq!(json["team_id"], agent.team_id.to_string());
        assert_eq!(json["created_at"], "2025-06-01 09:05:03");
        assert!(json.get("api_key").is_none());
    }
}
