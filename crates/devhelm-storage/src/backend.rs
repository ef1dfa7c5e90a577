// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
//
// StorageBackend works with either PostgreSQL (production) or the
// in-memory database (dev mode and tests).

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::memory::InMemoryDatabase;
use crate::models::*;
use crate::repositories::Database;

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory database (dev mode)
    InMemory(Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Connect to PostgreSQL and apply pending migrations
    pub async fn postgres(database_url: &str) -> Result<Self> {
        let db = Database::from_url(database_url).await?;
        db.migrate().await?;
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend
    pub fn in_memory() -> Self {
        Self::InMemory(Arc::new(InMemoryDatabase::new()))
    }

    /// Short name reported by the health endpoint
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::InMemory(_) => "in_memory",
        }
    }

    /// Get the PostgreSQL pool if using PostgreSQL backend
    pub fn pool(&self) -> Option<&PgPool> {
        match self {
            Self::Postgres(db) => Some(db.pool()),
            Self::InMemory(_) => None,
        }
    }

    // ============================================
    // Teams
    // ============================================

    pub async fn create_team(&self, input: CreateTeamRow) -> Result<TeamRow> {
        match self {
            Self::Postgres(db) => db.create_team(input).await,
            Self::InMemory(db) => db.create_team(input).await,
        }
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        match self {
            Self::Postgres(db) => db.create_user(input).await,
            Self::InMemory(db) => db.create_user(input).await,
        }
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user(id).await,
            Self::InMemory(db) => db.get_user(id).await,
        }
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user_by_email(email).await,
            Self::InMemory(db) => db.get_user_by_email(email).await,
        }
    }

    // ============================================
    // Agents
    // ============================================

    pub async fn create_agent(&self, input: CreateAgentRow) -> Result<AgentRow> {
        match self {
            Self::Postgres(db) => db.create_agent(input).await,
            Self::InMemory(db) => db.create_agent(input).await,
        }
    }

    pub async fn get_agent(&self, id: Uuid) -> Result<Option<AgentRow>> {
        match self {
            Self::Postgres(db) => db.get_agent(id).await,
            Self::InMemory(db) => db.get_agent(id).await,
        }
    }

    pub async fn list_agents_for_team(&self, team_id: Uuid) -> Result<Vec<AgentRow>> {
        match self {
            Self::Postgres(db) => db.list_agents_for_team(team_id).await,
            Self::InMemory(db) => db.list_agents_for_team(team_id).await,
        }
    }

    pub async fn update_agent(&self, id: Uuid, input: UpdateAgent) -> Result<Option<AgentRow>> {
        match self {
            Self::Postgres(db) => db.update_agent(id, input).await,
            Self::InMemory(db) => db.update_agent(id, input).await,
        }
    }

    pub async fn soft_delete_agent(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.soft_delete_agent(id).await,
            Self::InMemory(db) => db.soft_delete_agent(id).await,
        }
    }

    pub async fn touch_agent_last_seen(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        match self {
            Self::Postgres(db) => db.touch_agent_last_seen(id, at).await,
            Self::InMemory(db) => db.touch_agent_last_seen(id, at).await,
        }
    }

    // ============================================
    // API keys
    // ============================================

    pub async fn create_api_key(&self, input: CreateApiKeyRow) -> Result<ApiKeyRow> {
        match self {
            Self::Postgres(db) => db.create_api_key(input).await,
            Self::InMemory(db) => db.create_api_key(input).await,
        }
    }

    pub async fn find_active_api_key_by_hash(
        &self,
        key_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ApiKeyRow>> {
        match self {
            Self::Postgres(db) => db.find_active_api_key_by_hash(key_hash, now).await,
            Self::InMemory(db) => db.find_active_api_key_by_hash(key_hash, now).await,
        }
    }

    pub async fn list_api_keys_for_agent(&self, agent_id: Uuid) -> Result<Vec<ApiKeyRow>> {
        match self {
            Self::Postgres(db) => db.list_api_keys_for_agent(agent_id).await,
            Self::InMemory(db) => db.list_api_keys_for_agent(agent_id).await,
        }
    }

    pub async fn revoke_api_key(&self, id: Uuid, agent_id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.revoke_api_key(id, agent_id).await,
            Self::InMemory(db) => db.revoke_api_key(id, agent_id).await,
        }
    }

    // ============================================
    // Leads and invite codes
    // ============================================

    pub async fn create_lead(&self, input: CreateLeadRow) -> Result<LeadRow> {
        match self {
            Self::Postgres(db) => db.create_lead(input).await,
            Self::InMemory(db) => db.create_lead(input).await,
        }
    }

    pub async fn get_lead_by_email(&self, email: &str) -> Result<Option<LeadRow>> {
        match self {
            Self::Postgres(db) => db.get_lead_by_email(email).await,
            Self::InMemory(db) => db.get_lead_by_email(email).await,
        }
    }

    pub async fn create_invite_code(&self, input: CreateInviteCodeRow) -> Result<InviteCodeRow> {
        match self {
            Self::Postgres(db) => db.create_invite_code(input).await,
            Self::InMemory(db) => db.create_invite_code(input).await,
        }
    }

    pub async fn list_invite_codes_for_email(&self, email: &str) -> Result<Vec<InviteCodeRow>> {
        match self {
            Self::Postgres(db) => db.list_invite_codes_for_email(email).await,
            Self::InMemory(db) => db.list_invite_codes_for_email(email).await,
        }
    }

    // ============================================
    // Tasks
    // ============================================

    pub async fn create_task(&self, input: CreateTaskRow) -> Result<TaskRow> {
        match self {
            Self::Postgres(db) => db.create_task(input).await,
            Self::InMemory(db) => db.create_task(input).await,
        }
    }

    pub async fn get_task(&self, id: Uuid) -> Result<Option<TaskRow>> {
        match self {
            Self::Postgres(db) => db.get_task(id).await,
            Self::InMemory(db) => db.get_task(id).await,
        }
    }

    pub async fn list_tasks_for_agent(&self, agent_id: Uuid) -> Result<Vec<TaskRow>> {
        match self {
            Self::Postgres(db) => db.list_tasks_for_agent(agent_id).await,
            Self::InMemory(db) => db.list_tasks_for_agent(agent_id).await,
        }
    }

    pub async fn update_task_status(&self, id: Uuid, status: &str) -> Result<Option<TaskRow>> {
        match self {
            Self::Postgres(db) => db.update_task_status(id, status).await,
            Self::InMemory(db) => db.update_task_status(id, status).await,
        }
    }

    // ============================================
    // Feedback
    // ============================================

    pub async fn create_feedback(&self, input: CreateFeedbackRow) -> Result<FeedbackRow> {
        match self {
            Self::Postgres(db) => db.create_feedback(input).await,
            Self::InMemory(db) => db.create_feedback(input).await,
        }
    }

    pub async fn list_feedback_for_task(&self, task_id: Uuid) -> Result<Vec<FeedbackRow>> {
        match self {
            Self::Postgres(db) => db.list_feedback_for_task(task_id).await,
            Self::InMemory(db) => db.list_feedback_for_task(task_id).await,
        }
    }

    // ============================================
    // Questions
    // ============================================

    pub async fn create_question(&self, input: CreateQuestionRow) -> Result<QuestionRow> {
        match self {
            Self::Postgres(db) => db.create_question(input).await,
            Self::InMemory(db) => db.create_question(input).await,
        }
    }

    pub async fn list_questions_for_task(&self, task_id: Uuid) -> Result<Vec<QuestionRow>> {
        match self {
            Self::Postgres(db) => db.list_questions_for_task(task_id).await,
            Self::InMemory(db) => db.list_questions_for_task(task_id).await,
        }
    }
}
