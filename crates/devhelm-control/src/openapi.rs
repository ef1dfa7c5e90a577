// OpenAPI specification generation
//
// Shared by the server (Swagger UI) and the export-openapi binary.

use crate::api;
use crate::api::common::{InternalErrorResponse, ValidationErrorResponse};
use crate::api::{ErrorResponse, ListResponse};
use devhelm_core::{AgentStatus, ApiKeyStatus};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI documentation for the DevHelm control plane
#[derive(OpenApi)]
#[openapi(
    paths(
        api::agents::create_agent,
        api::agents::list_agents,
        api::agents::get_agent,
        api::agents::update_agent,
        api::agents::update_agent_status,
        api::agents::delete_agent,
        api::agents::list_api_keys,
        api::agents::create_api_key,
        api::agents::revoke_api_key,
        api::leads::create_lead,
        api::hello::hello_world,
        api::tasks::list_tasks,
        api::tasks::create_task,
        api::tasks::update_task_status,
        api::tasks::create_feedback,
        api::tasks::list_feedback,
        api::tasks::create_question,
        api::tasks::list_questions,
    ),
    components(
        schemas(
            AgentStatus, ApiKeyStatus,
            ErrorResponse, InternalErrorResponse, ValidationErrorResponse,
            api::agents::AgentRequest, api::agents::UpdateAgentStatusRequest,
            api::agents::AgentResponse, api::agents::AgentListResponse,
            api::agents::ApiKeySummary, api::agents::IssuedApiKeyResponse,
            ListResponse<api::agents::ApiKeySummary>,
            api::leads::CreateLeadRequest, api::leads::LeadResponse,
            api::hello::HelloWorldResponse, api::hello::HelloAgent,
            api::tasks::CreateTaskRequest, api::tasks::UpdateTaskStatusRequest,
            api::tasks::CreateFeedbackRequest, api::tasks::CreateQuestionRequest,
            api::tasks::TaskResponse, api::tasks::FeedbackResponse, api::tasks::QuestionResponse,
            ListResponse<api::tasks::TaskResponse>,
            ListResponse<api::tasks::FeedbackResponse>,
            ListResponse<api::tasks::QuestionResponse>,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "agents", description = "Team agent management"),
        (name = "leads", description = "Lead capture and invites"),
        (name = "agent-api", description = "Endpoints called by agents with an API key")
    ),
    info(
        title = "DevHelm Control Plane API",
        version = "0.1.0",
        description = "Multi-tenant control plane for autonomous developer agents",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

/// Registers the agent API key and the user bearer token schemes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-KEY"))),
        );
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

impl ApiDoc {
    /// Pretty-printed OpenAPI JSON
    pub fn to_json() -> String {
        Self::openapi()
            .to_pretty_json()
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document() {
        let json: serde_json::Value = serde_json::from_str(&ApiDoc::to_json()).unwrap();
        let paths = json["paths"].as_object().unwrap();
        assert!(paths.contains_key("/app/agents"));
        assert!(paths.contains_key("/app/agents/{agent_id}/api-keys/{key_id}"));
        assert!(paths.contains_key("/api/v1/hello-world"));
        assert!(paths.contains_key("/api/v1/tasks/{task_id}/questions"));
        assert!(json["components"]["securitySchemes"]["api_key"].is_object());
    }
}
