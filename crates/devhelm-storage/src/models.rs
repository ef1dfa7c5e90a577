// Database models (internal, may differ from domain types)

use chrono::{DateTime, Utc};
use devhelm_core::{
    Agent, AgentStatus, ApiKey, ApiKeyStatus, Feedback, InviteCode, Lead, Question, Task, Team,
    User,
};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// Teams and users
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct TeamRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateTeamRow {
    pub name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub team_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUserRow {
    pub email: String,
    pub name: String,
    pub team_id: Option<Uuid>,
}

// ============================================
// Agents
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct AgentRow {
    pub id: Uuid,
    pub team_id: Uuid,
    pub name: String,
    pub project: String,
    pub status: String,
    pub last_seen: Option<DateTime<Utc>>,
    pub server_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CreateAgentRow {
    pub team_id: Uuid,
    pub name: String,
    pub project: String,
    pub status: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateAgent {
    pub name: Option<String>,
    pub project: Option<String>,
    pub status: Option<String>,
    pub last_seen: Option<DateTime<Utc>>,
    pub server_address: Option<String>,
}

// ============================================
// API keys
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct ApiKeyRow {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub key: String,
    pub key_hash: String,
    pub status: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CreateApiKeyRow {
    pub agent_id: Uuid,
    pub key: String,
    pub key_hash: String,
    pub expires_at: Option<DateTime<Utc>>,
}

// ============================================
// Leads and invite codes
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct LeadRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CreateLeadRow {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct InviteCodeRow {
    pub id: Uuid,
    pub code: String,
    pub email: String,
    pub invited_by: Uuid,
    pub team_id: Option<Uuid>,
    pub used: bool,
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateInviteCodeRow {
    pub code: String,
    pub email: String,
    pub invited_by: Uuid,
    pub team_id: Option<Uuid>,
}

// ============================================
// Tasks, feedback, questions
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub jira_ticket_id: String,
    pub status: String,
    pub github_pull_request_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CreateTaskRow {
    pub agent_id: Uuid,
    pub jira_ticket_id: String,
    pub status: String,
    pub github_pull_request_id: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct FeedbackRow {
    pub id: Uuid,
    pub task_id: Uuid,
    pub github_comment_id: Option<String>,
    pub status: String,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CreateFeedbackRow {
    pub task_id: Uuid,
    pub github_comment_id: Option<String>,
    pub status: String,
    pub feedback: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub id: Uuid,
    pub task_id: Uuid,
    pub question: String,
    pub answer: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CreateQuestionRow {
    pub task_id: Uuid,
    pub question: String,
    pub status: String,
}

// ============================================
// Row -> domain conversions
// ============================================

impl From<TeamRow> for Team {
    fn from(row: TeamRow) -> Self {
        Team {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            name: row.name,
            team_id: row.team_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<AgentRow> for Agent {
    fn from(row: AgentRow) -> Self {
        Agent {
            id: row.id,
            team_id: row.team_id,
            name: row.name,
            project: row.project,
            status: AgentStatus::from(row.status.as_str()),
            last_seen: row.last_seen,
            server_address: row.server_address,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

impl From<ApiKeyRow> for ApiKey {
    fn from(row: ApiKeyRow) -> Self {
        ApiKey {
            id: row.id,
            agent_id: row.agent_id,
            key: row.key,
            // Unknown stored values must never authenticate
            status: row.status.parse().unwrap_or(ApiKeyStatus::Revoked),
            expires_at: row.expires_at,
            created_at: row.created_at,
            deleted_at: row.deleted_at,
        }
    }
}

impl From<LeadRow> for Lead {
    fn from(row: LeadRow) -> Self {
        Lead {
            id: row.id,
            name: row.name,
            email: row.email,
            last_seen: row.last_seen,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<InviteCodeRow> for InviteCode {
    fn from(row: InviteCodeRow) -> Self {
        InviteCode {
            id: row.id,
            code: row.code,
            email: row.email,
            invited_by: row.invited_by,
            team_id: row.team_id,
            used: row.used,
            cancelled: row.cancelled,
            created_at: row.created_at,
        }
    }
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            agent_id: row.agent_id,
            jira_ticket_id: row.jira_ticket_id,
            status: row.status,
            github_pull_request_id: row.github_pull_request_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

impl From<FeedbackRow> for Feedback {
    fn from(row: FeedbackRow) -> Self {
        Feedback {
            id: row.id,
            task_id: row.task_id,
            github_comment_id: row.github_comment_id,
            status: row.status,
            feedback: row.feedback,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        Question {
            id: row.id,
            task_id: row.task_id,
            question: row.question,
            answer: row.answer,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}
