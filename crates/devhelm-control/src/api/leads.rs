// Lead capture HTTP route

use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use devhelm_core::Lead;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{ApiError, ErrorResponse, ValidationErrorResponse, TIMESTAMP_FORMAT};
use super::validation::validate_lead_input;
use crate::auth::{AuthState, AuthUser};
use crate::services::LeadService;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateLeadRequest {
    #[serde(default)]
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "jane@example.com")]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[schema(example = "2025-06-01 12:00:00")]
    pub created_at: String,
}

impl From<Lead> for LeadResponse {
    fn from(lead: Lead) -> Self {
        Self {
            id: lead.id,
            name: lead.name,
            email: lead.email,
            created_at: lead.created_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Clone, FromRef)]
pub struct AppState {
    pub service: Arc<LeadService>,
    pub auth: AuthState,
}

impl AppState {
    pub fn new(auth: AuthState) -> Self {
        Self {
            service: Arc::new(LeadService::new(auth.db.clone())),
            auth,
        }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/app/leads", post(create_lead))
        .with_state(state)
}

/// POST /app/leads - Capture a lead and issue an invite code
#[utoipa::path(
    post,
    path = "/app/leads",
    request_body = CreateLeadRequest,
    responses(
        (status = 201, description = "Lead captured", body = LeadResponse),
        (status = 400, description = "Validation failed or email taken", body = ValidationErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "leads"
)]
pub async fn create_lead(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateLeadRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LeadResponse>), ApiError> {
    let Json(req) = payload?;
    let name = req.name.trim().to_string();
    let email = req.email.trim().to_string();
    validate_lead_input(&name, &email)?;

    let (lead, _invite) = state
        .service
        .capture(user.id, user.team_id, name, email)
        .await?;
    Ok((StatusCode::CREATED, Json(LeadResponse::from(lead))))
}
