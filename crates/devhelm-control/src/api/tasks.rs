// Agent work-tracking HTTP routes
// Decision: The caller is always the principal attached by the authenticator; no agent id in paths

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use devhelm_core::{AgentPrincipal, Feedback, Question, Task};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{ApiError, ErrorResponse, ListResponse, ValidationErrorResponse};
use super::validation::{
    validate_feedback_input, validate_question_input, validate_task_input, validate_task_status,
};
use crate::services::TaskService;

/// Request to open a task
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    #[serde(default)]
    #[schema(example = "DEV-42")]
    pub jira_ticket_id: String,
    #[serde(default)]
    pub github_pull_request_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateTaskStatusRequest {
    #[serde(default)]
    #[schema(example = "in_review")]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateFeedbackRequest {
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub github_comment_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateQuestionRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskResponse {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub jira_ticket_id: String,
    pub status: String,
    pub github_pull_request_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            agent_id: task.agent_id,
            jira_ticket_id: task.jira_ticket_id,
            status: task.status,
            github_pull_request_id: task.github_pull_request_id,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeedbackResponse {
    pub id: Uuid,
    pub task_id: Uuid,
    pub feedback: String,
    pub github_comment_id: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Feedback> for FeedbackResponse {
    fn from(feedback: Feedback) -> Self {
        Self {
            id: feedback.id,
            task_id: feedback.task_id,
            feedback: feedback.feedback,
            github_comment_id: feedback.github_comment_id,
            status: feedback.status,
            created_at: feedback.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuestionResponse {
    pub id: Uuid,
    pub task_id: Uuid,
    pub question: String,
    pub answer: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Question> for QuestionResponse {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            task_id: question.task_id,
            question: question.question,
            answer: question.answer,
            status: question.status,
            created_at: question.created_at,
        }
    }
}

/// App state for task routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TaskService>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/tasks", get(list_tasks).post(create_task))
        .route("/api/v1/tasks/{task_id}/status", post(update_task_status))
        .route(
            "/api/v1/tasks/{task_id}/feedback",
            get(list_feedback).post(create_feedback),
        )
        .route(
            "/api/v1/tasks/{task_id}/questions",
            get(list_questions).post(create_question),
        )
        .with_state(state)
}

fn parse_task_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Task not found".to_string()))
}

/// Blank optional ids are treated as absent
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// GET /api/v1/tasks - Tasks of the calling agent
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    responses(
        (status = 200, description = "Tasks of the calling agent", body = ListResponse<TaskResponse>),
        (status = 401, description = "API key missing or not accepted"),
        (status = 500, description = "Internal server error")
    ),
    security(("api_key" = [])),
    tag = "agent-api"
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(principal): Extension<AgentPrincipal>,
) -> Result<Json<ListResponse<TaskResponse>>, ApiError> {
    let tasks = state.service.list(principal.identifier()).await?;
    Ok(Json(ListResponse::new(
        tasks.into_iter().map(TaskResponse::from).collect(),
    )))
}

/// POST /api/v1/tasks - Open a task
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 401, description = "API key missing or not accepted"),
        (status = 500, description = "Internal server error")
    ),
    security(("api_key" = [])),
    tag = "agent-api"
)]
pub async fn create_task(
    State(state): State<AppState>,
    Extension(principal): Extension<AgentPrincipal>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let Json(req) = payload?;
    let pull_request = non_blank(req.github_pull_request_id);
    validate_task_input(&req.jira_ticket_id, pull_request.as_deref())?;

    let task = state
        .service
        .create(
            principal.identifier(),
            req.jira_ticket_id.trim().to_string(),
            pull_request,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

/// POST /api/v1/tasks/{task_id}/status - Set free-text status
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{task_id}/status",
    params(
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    request_body = UpdateTaskStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = TaskResponse),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    security(("api_key" = [])),
    tag = "agent-api"
)]
pub async fn update_task_status(
    State(state): State<AppState>,
    Extension(principal): Extension<AgentPrincipal>,
    Path(task_id): Path<String>,
    payload: Result<Json<UpdateTaskStatusRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task_id = parse_task_id(&task_id)?;
    let Json(req) = payload?;
    validate_task_status(&req.status)?;

    let task = state
        .service
        .update_status(principal.identifier(), task_id, req.status.trim())
        .await?;
    Ok(Json(TaskResponse::from(task)))
}

/// POST /api/v1/tasks/{task_id}/feedback - Attach review feedback
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{task_id}/feedback",
    params(
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    request_body = CreateFeedbackRequest,
    responses(
        (status = 201, description = "Feedback recorded", body = FeedbackResponse),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    security(("api_key" = [])),
    tag = "agent-api"
)]
pub async fn create_feedback(
    State(state): State<AppState>,
    Extension(principal): Extension<AgentPrincipal>,
    Path(task_id): Path<String>,
    payload: Result<Json<CreateFeedbackRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FeedbackResponse>), ApiError> {
    let task_id = parse_task_id(&task_id)?;
    let Json(req) = payload?;
    let comment_id = non_blank(req.github_comment_id);
    validate_feedback_input(&req.feedback, comment_id.as_deref())?;

    let feedback = state
        .service
        .add_feedback(principal.identifier(), task_id, req.feedback, comment_id)
        .await?;
    Ok((StatusCode::CREATED, Json(FeedbackResponse::from(feedback))))
}

/// GET /api/v1/tasks/{task_id}/feedback
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{task_id}/feedback",
    params(
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Feedback for the task", body = ListResponse<FeedbackResponse>),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    security(("api_key" = [])),
    tag = "agent-api"
)]
pub async fn list_feedback(
    State(state): State<AppState>,
    Extension(principal): Extension<AgentPrincipal>,
    Path(task_id): Path<String>,
) -> Result<Json<ListResponse<FeedbackResponse>>, ApiError> {
    let task_id = parse_task_id(&task_id)?;
    let feedback = state
        .service
        .list_feedback(principal.identifier(), task_id)
        .await?;
    Ok(Json(ListResponse::new(
        feedback.into_iter().map(FeedbackResponse::from).collect(),
    )))
}

/// POST /api/v1/tasks/{task_id}/questions - Ask a question about a task
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{task_id}/questions",
    params(
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question recorded", body = QuestionResponse),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    security(("api_key" = [])),
    tag = "agent-api"
)]
pub async fn create_question(
    State(state): State<AppState>,
    Extension(principal): Extension<AgentPrincipal>,
    Path(task_id): Path<String>,
    payload: Result<Json<CreateQuestionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    let task_id = parse_task_id(&task_id)?;
    let Json(req) = payload?;
    validate_question_input(&req.question)?;

    let question = state
        .service
        .add_question(principal.identifier(), task_id, req.question)
        .await?;
    Ok((StatusCode::CREATED, Json(QuestionResponse::from(question))))
}

/// GET /api/v1/tasks/{task_id}/questions
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{task_id}/questions",
    params(
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Questions for the task", body = ListResponse<QuestionResponse>),
        (status = 404, description = "Task not found", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    security(("api_key" = [])),
    tag = "agent-api"
)]
pub async fn list_questions(
    State(state): State<AppState>,
    Extension(principal): Extension<AgentPrincipal>,
    Path(task_id): Path<String>,
) -> Result<Json<ListResponse<QuestionResponse>>, ApiError> {
    let task_id = parse_task_id(&task_id)?;
    let questions = state
        .service
        .list_questions(principal.identifier(), task_id)
        .await?;
    Ok(Json(ListResponse::new(
        questions.into_iter().map(QuestionResponse::from).collect(),
    )))
}
