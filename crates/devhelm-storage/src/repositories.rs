// Repository layer for database operations
// Decision: IDs are generated in Rust (uuid v7) so both backends agree
// Decision: Every read of soft-deletable tables filters deleted_at IS NULL

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::*;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply embedded migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::debug!("Database migrations applied");
        Ok(())
    }

    // ============================================
    // Teams
    // ============================================

    pub async fn create_team(&self, input: CreateTeamRow) -> Result<TeamRow> {
        let row = sqlx::query_as::<_, TeamRow>(
            r#"
            INSERT INTO teams (id, name)
            VALUES ($1, $2)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, name, team_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, team_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.email)
        .bind(&input.name)
        .bind(input.team_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, team_id, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, team_id, created_at, updated_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Agents
    // ============================================

    pub async fn create_agent(&self, input: CreateAgentRow) -> Result<AgentRow> {
        let row = sqlx::query_as::<_, AgentRow>(
            r#"
            INSERT INTO agents (id, team_id, name, project, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, team_id, name, project, status, last_seen, server_address,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(input.team_id)
        .bind(&input.name)
        .bind(&input.project)
        .bind(&input.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_agent(&self, id: Uuid) -> Result<Option<AgentRow>> {
        let row = sqlx::query_as::<_, AgentRow>(
            r#"
            SELECT id, team_id, name, project, status, last_seen, server_address,
                   created_at, updated_at, deleted_at
            FROM agents
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_agents_for_team(&self, team_id: Uuid) -> Result<Vec<AgentRow>> {
        let rows = sqlx::query_as::<_, AgentRow>(
            r#"
            SELECT id, team_id, name, project, status, last_seen, server_address,
                   created_at, updated_at, deleted_at
            FROM agents
            WHERE team_id = $1 AND deleted_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_agent(&self, id: Uuid, input: UpdateAgent) -> Result<Option<AgentRow>> {
        let row = sqlx::query_as::<_, AgentRow>(
            r#"
            UPDATE agents
            SET
                name = COALESCE($2, name),
                project = COALESCE($3, project),
                status = COALESCE($4, status),
                last_seen = COALESCE($5, last_seen),
                server_address = COALESCE($6, server_address),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, team_id, name, project, status, last_seen, server_address,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.project)
        .bind(&input.status)
        .bind(input.last_seen)
        .bind(&input.server_address)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn soft_delete_agent(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE agents
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Record agent activity without bumping updated_at
    pub async fn touch_agent_last_seen(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE agents
            SET last_seen = $2
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ============================================
    // API keys
    // ============================================

    pub async fn create_api_key(&self, input: CreateApiKeyRow) -> Result<ApiKeyRow> {
        let row = sqlx::query_as::<_, ApiKeyRow>(
            r#"
            INSERT INTO api_keys (id, agent_id, key, key_hash, status, expires_at)
            VALUES ($1, $2, $3, $4, 'active', $5)
            RETURNING id, agent_id, key, key_hash, status, expires_at,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(input.agent_id)
        .bind(&input.key)
        .bind(&input.key_hash)
        .bind(input.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Find the usable key with this hash: active, not deleted, not expired at `now`
    pub async fn find_active_api_key_by_hash(
        &self,
        key_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ApiKeyRow>> {
        let row = sqlx::query_as::<_, ApiKeyRow>(
            r#"
            SELECT id, agent_id, key, key_hash, status, expires_at,
                   created_at, updated_at, deleted_at
            FROM api_keys
            WHERE key_hash = $1
              AND status = 'active'
              AND deleted_at IS NULL
              AND (expires_at IS NULL OR expires_at > $2)
            LIMIT 1
            "#,
        )
        .bind(key_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_api_keys_for_agent(&self, agent_id: Uuid) -> Result<Vec<ApiKeyRow>> {
        let rows = sqlx::query_as::<_, ApiKeyRow>(
            r#"
            SELECT id, agent_id, key, key_hash, status, expires_at,
                   created_at, updated_at, deleted_at
            FROM api_keys
            WHERE agent_id = $1 AND deleted_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Revoke a key owned by the given agent. Returns false if no such key.
    pub async fn revoke_api_key(&self, id: Uuid, agent_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE api_keys
            SET status = 'revoked', updated_at = NOW()
            WHERE id = $1 AND agent_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(agent_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Leads and invite codes
    // ============================================

    pub async fn create_lead(&self, input: CreateLeadRow) -> Result<LeadRow> {
        let row = sqlx::query_as::<_, LeadRow>(
            r#"
            INSERT INTO leads (id, name, email)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, last_seen, created_at, updated_at, deleted_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.name)
        .bind(&input.email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_lead_by_email(&self, email: &str) -> Result<Option<LeadRow>> {
        let row = sqlx::query_as::<_, LeadRow>(
            r#"
            SELECT id, name, email, last_seen, created_at, updated_at, deleted_at
            FROM leads
            WHERE LOWER(email) = LOWER($1) AND deleted_at IS NULL
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn create_invite_code(&self, input: CreateInviteCodeRow) -> Result<InviteCodeRow> {
        let row = sqlx::query_as::<_, InviteCodeRow>(
            r#"
            INSERT INTO invite_codes (id, code, email, invited_by, team_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, code, email, invited_by, team_id, used, cancelled, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.code)
        .bind(&input.email)
        .bind(input.invited_by)
        .bind(input.team_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_invite_codes_for_email(&self, email: &str) -> Result<Vec<InviteCodeRow>> {
        let rows = sqlx::query_as::<_, InviteCodeRow>(
            r#"
            SELECT id, code, email, invited_by, team_id, used, cancelled, created_at
            FROM invite_codes
            WHERE LOWER(email) = LOWER($1)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ============================================
    // Tasks
    // ============================================

    pub async fn create_task(&self, input: CreateTaskRow) -> Result<TaskRow> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            INSERT INTO tasks (id, agent_id, jira_ticket_id, status, github_pull_request_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, agent_id, jira_ticket_id, status, github_pull_request_id,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(input.agent_id)
        .bind(&input.jira_ticket_id)
        .bind(&input.status)
        .bind(&input.github_pull_request_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_task(&self, id: Uuid) -> Result<Option<TaskRow>> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, agent_id, jira_ticket_id, status, github_pull_request_id,
                   created_at, updated_at, deleted_at
            FROM tasks
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_tasks_for_agent(&self, agent_id: Uuid) -> Result<Vec<TaskRow>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, agent_id, jira_ticket_id, status, github_pull_request_id,
                   created_at, updated_at, deleted_at
            FROM tasks
            WHERE agent_id = $1 AND deleted_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_task_status(&self, id: Uuid, status: &str) -> Result<Option<TaskRow>> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            UPDATE tasks
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, agent_id, jira_ticket_id, status, github_pull_request_id,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Feedback
    // ============================================

    pub async fn create_feedback(&self, input: CreateFeedbackRow) -> Result<FeedbackRow> {
        let row = sqlx::query_as::<_, FeedbackRow>(
            r#"
            INSERT INTO feedback (id, task_id, github_comment_id, status, feedback)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, task_id, github_comment_id, status, feedback,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(input.task_id)
        .bind(&input.github_comment_id)
        .bind(&input.status)
        .bind(&input.feedback)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_feedback_for_task(&self, task_id: Uuid) -> Result<Vec<FeedbackRow>> {
        let rows = sqlx::query_as::<_, FeedbackRow>(
            r#"
            SELECT id, task_id, github_comment_id, status, feedback,
                   created_at, updated_at, deleted_at
            FROM feedback
            WHERE task_id = $1 AND deleted_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ============================================
    // Questions
    // ============================================

    pub async fn create_question(&self, input: CreateQuestionRow) -> Result<QuestionRow> {
        let row = sqlx::query_as::<_, QuestionRow>(
            r#"
            INSERT INTO questions (id, task_id, question, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, task_id, question, answer, status,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(input.task_id)
        .bind(&input.question)
        .bind(&input.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_questions_for_task(&self, task_id: Uuid) -> Result<Vec<QuestionRow>> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT id, task_id, question, answer, status,
                   created_at, updated_at, deleted_at
            FROM questions
            WHERE task_id = $1 AND deleted_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
