// In-memory storage implementation for dev mode
// Decision: Use parking_lot for thread-safe access
// Decision: UUIDs generated via uuid v7 (time-ordered)
//
// Mirrors the PostgreSQL repository API, including soft-delete filtering,
// so the control plane and its tests can run without a database.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::*;

/// In-memory database for dev mode
/// All data is stored in memory and lost on restart
#[derive(Default)]
pub struct InMemoryDatabase {
    teams: RwLock<HashMap<Uuid, TeamRow>>,
    users: RwLock<HashMap<Uuid, UserRow>>,
    agents: RwLock<HashMap<Uuid, AgentRow>>,
    api_keys: RwLock<HashMap<Uuid, ApiKeyRow>>,
    leads: RwLock<HashMap<Uuid, LeadRow>>,
    invite_codes: RwLock<HashMap<Uuid, InviteCodeRow>>,
    tasks: RwLock<HashMap<Uuid, TaskRow>>,
    feedback: RwLock<HashMap<Uuid, FeedbackRow>>,
    questions: RwLock<HashMap<Uuid, QuestionRow>>,
}

fn sorted_by_created<T, F>(mut rows: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> (DateTime<Utc>, Uuid),
{
    rows.sort_by_key(|r| key(r));
    rows
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    // ============================================
    // Teams
    // ============================================

    pub async fn create_team(&self, input: CreateTeamRow) -> Result<TeamRow> {
        let now = Self::now();
        let row = TeamRow {
            id: Uuid::now_v7(),
            name: input.name,
            created_at: now,
            updated_at: now,
        };
        self.teams.write().insert(row.id, row.clone());
        Ok(row)
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let mut users = self.users.write();
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&input.email))
        {
            bail!("duplicate key value violates unique constraint on users.email");
        }
        let now = Self::now();
        let row = UserRow {
            id: Uuid::now_v7(),
            email: input.email,
            name: input.name,
            team_id: input.team_id,
            created_at: now,
            updated_at: now,
        };
        users.insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        Ok(self.users.read().get(&id).cloned())
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    // ============================================
    // Agents
    // ============================================

    pub async fn create_agent(&self, input: CreateAgentRow) -> Result<AgentRow> {
        let now = Self::now();
        let row = AgentRow {
            id: Uuid::now_v7(),
            team_id: input.team_id,
            name: input.name,
            project: input.project,
            status: input.status,
            last_seen: None,
            server_address: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.agents.write().insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn get_agent(&self, id: Uuid) -> Result<Option<AgentRow>> {
        Ok(self
            .agents
            .read()
            .get(&id)
            .filter(|a| a.deleted_at.is_none())
            .cloned())
    }

    pub async fn list_agents_for_team(&self, team_id: Uuid) -> Result<Vec<AgentRow>> {
        let rows = self
            .agents
            .read()
            .values()
            .filter(|a| a.team_id == team_id && a.deleted_at.is_none())
            .cloned()
            .collect();
        Ok(sorted_by_created(rows, |a: &AgentRow| (a.created_at, a.id)))
    }

    pub async fn update_agent(&self, id: Uuid, input: UpdateAgent) -> Result<Option<AgentRow>> {
        let mut agents = self.agents.write();
        let Some(agent) = agents.get_mut(&id).filter(|a| a.deleted_at.is_none()) else {
            return Ok(None);
        };
        if let Some(name) = input.name {
            agent.name = name;
        }
        if let Some(project) = input.project {
            agent.project = project;
        }
        if let Some(status) = input.status {
            agent.status = status;
        }
        if let Some(last_seen) = input.last_seen {
            agent.last_seen = Some(last_seen);
        }
        if let Some(server_address) = input.server_address {
            agent.server_address = Some(server_address);
        }
        agent.updated_at = Self::now();
        Ok(Some(agent.clone()))
    }

    pub async fn soft_delete_agent(&self, id: Uuid) -> Result<bool> {
        let mut agents = self.agents.write();
        match agents.get_mut(&id).filter(|a| a.deleted_at.is_none()) {
            Some(agent) => {
                let now = Self::now();
                agent.deleted_at = Some(now);
                agent.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn touch_agent_last_seen(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        if let Some(agent) = self
            .agents
            .write()
            .get_mut(&id)
            .filter(|a| a.deleted_at.is_none())
        {
            agent.last_seen = Some(at);
        }
        Ok(())
    }

    // ============================================
    // API keys
    // ============================================

    pub async fn create_api_key(&self, input: CreateApiKeyRow) -> Result<ApiKeyRow> {
        let now = Self::now();
        let row = ApiKeyRow {
            id: Uuid::now_v7(),
            agent_id: input.agent_id,
            key: input.key,
            key_hash: input.key_hash,
            status: "active".to_string(),
            expires_at: input.expires_at,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.api_keys.write().insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn find_active_api_key_by_hash(
        &self,
        key_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ApiKeyRow>> {
        Ok(self
            .api_keys
            .read()
            .values()
            .find(|k| {
                k.key_hash == key_hash
                    && k.status == "active"
                    && k.deleted_at.is_none()
                    && k.expires_at.map_or(true, |exp| exp > now)
            })
            .cloned())
    }

    pub async fn list_api_keys_for_agent(&self, agent_id: Uuid) -> Result<Vec<ApiKeyRow>> {
        let rows = self
            .api_keys
            .read()
            .values()
            .filter(|k| k.agent_id == agent_id && k.deleted_at.is_none())
            .cloned()
            .collect();
        Ok(sorted_by_created(rows, |k: &ApiKeyRow| (k.created_at, k.id)))
    }

    pub async fn revoke_api_key(&self, id: Uuid, agent_id: Uuid) -> Result<bool> {
        let mut keys = self.api_keys.write();
        match keys
            .get_mut(&id)
            .filter(|k| k.agent_id == agent_id && k.deleted_at.is_none())
        {
            Some(key) => {
                key.status = "revoked".to_string();
                key.updated_at = Self::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ============================================
    // Leads and invite codes
    // ============================================

    pub async fn create_lead(&self, input: CreateLeadRow) -> Result<LeadRow> {
        let mut leads = self.leads.write();
        if leads
            .values()
            .any(|l| l.email.eq_ignore_ascii_case(&input.email))
        {
            bail!("duplicate key value violates unique constraint on leads.email");
        }
        let now = Self::now();
        let row = LeadRow {
            id: Uuid::now_v7(),
            name: input.name,
            email: input.email,
            last_seen: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        leads.insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn get_lead_by_email(&self, email: &str) -> Result<Option<LeadRow>> {
        Ok(self
            .leads
            .read()
            .values()
            .find(|l| l.email.eq_ignore_ascii_case(email) && l.deleted_at.is_none())
            .cloned())
    }

    pub async fn create_invite_code(&self, input: CreateInviteCodeRow) -> Result<InviteCodeRow> {
        let row = InviteCodeRow {
            id: Uuid::now_v7(),
            code: input.code,
            email: input.email,
            invited_by: input.invited_by,
            team_id: input.team_id,
            used: false,
            cancelled: false,
            created_at: Self::now(),
        };
        self.invite_codes.write().insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn list_invite_codes_for_email(&self, email: &str) -> Result<Vec<InviteCodeRow>> {
        let rows = self
            .invite_codes
            .read()
            .values()
            .filter(|c| c.email.eq_ignore_ascii_case(email))
            .cloned()
            .collect();
        Ok(sorted_by_created(rows, |c: &InviteCodeRow| (c.created_at, c.id)))
    }

    // ============================================
    // Tasks
    // ============================================

    pub async fn create_task(&self, input: CreateTaskRow) -> Result<TaskRow> {
        let now = Self::now();
        let row = TaskRow {
            id: Uuid::now_v7(),
            agent_id: input.agent_id,
            jira_ticket_id: input.jira_ticket_id,
            status: input.status,
            github_pull_request_id: input.github_pull_request_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.tasks.write().insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn get_task(&self, id: Uuid) -> Result<Option<TaskRow>> {
        Ok(self
            .tasks
            .read()
            .get(&id)
            .filter(|t| t.deleted_at.is_none())
            .cloned())
    }

    pub async fn list_tasks_for_agent(&self, agent_id: Uuid) -> Result<Vec<TaskRow>> {
        let rows = self
            .tasks
            .read()
            .values()
            .filter(|t| t.agent_id == agent_id && t.deleted_at.is_none())
            .cloned()
            .collect();
        Ok(sorted_by_created(rows, |t: &TaskRow| (t.created_at, t.id)))
    }

    pub async fn update_task_status(&self, id: Uuid, status: &str) -> Result<Option<TaskRow>> {
        let mut tasks = self.tasks.write();
        let Some(task) = tasks.get_mut(&id).filter(|t| t.deleted_at.is_none()) else {
            return Ok(None);
        };
        task.status = status.to_string();
        task.updated_at = Self::now();
        Ok(Some(task.clone()))
    }

    // ============================================
    // Feedback
    // ============================================

    pub async fn create_feedback(&self, input: CreateFeedbackRow) -> Result<FeedbackRow> {
        let now = Self::now();
        let row = FeedbackRow {
            id: Uuid::now_v7(),
            task_id: input.task_id,
            github_comment_id: input.github_comment_id,
            status: input.status,
            feedback: input.feedback,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.feedback.write().insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn list_feedback_for_task(&self, task_id: Uuid) -> Result<Vec<FeedbackRow>> {
        let rows = self
            .feedback
            .read()
            .values()
            .filter(|f| f.task_id == task_id && f.deleted_at.is_none())
            .cloned()
            .collect();
        Ok(sorted_by_created(rows, |f: &FeedbackRow| (f.created_at, f.id)))
    }

    // ============================================
    // Questions
    // ============================================

    pub async fn create_question(&self, input: CreateQuestionRow) -> Result<QuestionRow> {
        let now = Self::now();
        let row = QuestionRow {
            id: Uuid::now_v7(),
            task_id: input.task_id,
            question: input.question,
            answer: None,
            status: input.status,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.questions.write().insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn list_questions_for_task(&self, task_id: Uuid) -> Result<Vec<QuestionRow>> {
        let rows = self
            .questions
            .read()
            .values()
            .filter(|q| q.task_id == task_id && q.deleted_at.is_none())
            .cloned()
            .collect();
        Ok(sorted_by_created(rows, |q: &QuestionRow| (q.created_at, q.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn seed_agent(db: &InMemoryDatabase) -> AgentRow {
        let team = db
            .create_team(CreateTeamRow {
                name: "Team".to_string(),
            })
            .await
            .unwrap();
        db.create_agent(CreateAgentRow {
            team_id: team.id,
            name: "Bot1".to_string(),
            project: "DEV".to_string(),
            status: "enabled".to_string(),
        })
        .await
        .unwrap()
    }

    fn key_input(agent_id: Uuid, hash: &str, expires_at: Option<DateTime<Utc>>) -> CreateApiKeyRow {
        CreateApiKeyRow {
            agent_id,
            key: format!("key-{hash}"),
            key_hash: hash.to_string(),
            expires_at,
        }
    }

    #[tokio::test]
    async fn test_find_active_key_by_hash() {
        let db = InMemoryDatabase::new();
        let agent = seed_agent(&db).await;
        let key = db.create_api_key(key_input(agent.id, "h1", None)).await.unwrap();

        let found = db
            .find_active_api_key_by_hash("h1", Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, key.id);
        assert_eq!(found.status, "active");

        assert!(db
            .find_active_api_key_by_hash("missing", Utc::now())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_expired_key_is_not_found() {
        let db = InMemoryDatabase::new();
        let agent = seed_agent(&db).await;
        let now = Utc::now();
        db.create_api_key(key_input(agent.id, "past", Some(now - Duration::hours(1))))
            .await
            .unwrap();
        db.create_api_key(key_input(agent.id, "edge", Some(now)))
            .await
            .unwrap();
        db.create_api_key(key_input(agent.id, "future", Some(now + Duration::hours(1))))
            .await
            .unwrap();

        assert!(db.find_active_api_key_by_hash("past", now).await.unwrap().is_none());
        // Expiry must be strictly in the future
        assert!(db.find_active_api_key_by_hash("edge", now).await.unwrap().is_none());
        assert!(db.find_active_api_key_by_hash("future", now).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_revoked_and_deleted_keys_are_not_found() {
        let db = InMemoryDatabase::new();
        let agent = seed_agent(&db).await;
        let revoked = db.create_api_key(key_input(agent.id, "r", None)).await.unwrap();
        let deleted = db.create_api_key(key_input(agent.id, "d", None)).await.unwrap();

        assert!(db.revoke_api_key(revoked.id, agent.id).await.unwrap());
        // Keys are only ever soft-deleted by cascade, so mark the row directly
        if let Some(key) = db.api_keys.write().get_mut(&deleted.id) {
            key.deleted_at = Some(Utc::now());
        }

        assert!(db.find_active_api_key_by_hash("r", Utc::now()).await.unwrap().is_none());
        assert!(db.find_active_api_key_by_hash("d", Utc::now()).await.unwrap().is_none());

        // Revoked keys stay listed, deleted ones do not
        let listed = db.list_api_keys_for_agent(agent.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, revoked.id);
        assert_eq!(listed[0].status, "revoked");
    }

    #[tokio::test]
    async fn test_revoke_requires_owning_agent() {
        let db = InMemoryDatabase::new();
        let agent = seed_agent(&db).await;
        let key = db.create_api_key(key_input(agent.id, "k", None)).await.unwrap();

        assert!(!db.revoke_api_key(key.id, Uuid::now_v7()).await.unwrap());
        assert!(db.find_active_api_key_by_hash("k", Utc::now()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_soft_deleted_agent_is_hidden() {
        let db = InMemoryDatabase::new();
        let agent = seed_agent(&db).await;

        assert!(db.soft_delete_agent(agent.id).await.unwrap());
        assert!(!db.soft_delete_agent(agent.id).await.unwrap());
        assert!(db.get_agent(agent.id).await.unwrap().is_none());
        assert!(db
            .list_agents_for_team(agent.team_id)
            .await
            .unwrap()
            .is_empty());
        assert!(db
            .update_agent(
                agent.id,
                UpdateAgent {
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                }
            )
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_agent_partial() {
        let db = InMemoryDatabase::new();
        let agent = seed_agent(&db).await;

        let updated = db
            .update_agent(
                agent.id,
                UpdateAgent {
                    status: Some("disabled".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, "disabled");
        assert_eq!(updated.name, "Bot1");
        assert_eq!(updated.project, "DEV");
        assert!(updated.updated_at >= agent.updated_at);
    }

    #[tokio::test]
    async fn test_agents_scoped_by_team() {
        let db = InMemoryDatabase::new();
        let agent = seed_agent(&db).await;
        let other = seed_agent(&db).await;

        let listed = db.list_agents_for_team(agent.team_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, agent.id);
        assert_ne!(agent.team_id, other.team_id);
    }

    #[tokio::test]
    async fn test_user_email_is_unique() {
        let db = InMemoryDatabase::new();
        let input = CreateUserRow {
            email: "dev@example.com".to_string(),
            name: "Dev".to_string(),
            team_id: None,
        };
        db.create_user(input.clone()).await.unwrap();
        assert!(db.create_user(input).await.is_err());

        let found = db.get_user_by_email("DEV@example.com").await.unwrap();
        assert!(found.is_some());

        let shouted = CreateUserRow {
            email: "Dev@Example.COM".to_string(),
            name: "Other".to_string(),
            team_id: None,
        };
        assert!(db.create_user(shouted).await.is_err());
    }

    #[tokio::test]
    async fn test_lead_email_is_unique_ignoring_case() {
        let db = InMemoryDatabase::new();
        db.create_lead(CreateLeadRow {
            name: "Lead".to_string(),
            email: "lead@example.com".to_string(),
        })
        .await
        .unwrap();

        let again = db
            .create_lead(CreateLeadRow {
                name: "Lead".to_string(),
                email: "LEAD@example.com".to_string(),
            })
            .await;
        assert!(again.is_err());
    }

    #[test]
    fn test_schema_email_uniqueness_ignores_case() {
        let schema = include_str!("../migrations/20250601000000_initial_schema.sql");
        assert!(schema.contains("ON users (LOWER(email))"));
        assert!(schema.contains("ON leads (LOWER(email))"));
        assert!(!schema.contains("email VARCHAR(255) NOT NULL UNIQUE"));
    }

    #[tokio::test]
    async fn test_tasks_feedback_and_questions() {
        let db = InMemoryDatabase::new();
        let agent = seed_agent(&db).await;
        let task = db
            .create_task(CreateTaskRow {
                agent_id: agent.id,
                jira_ticket_id: "DEV-1".to_string(),
                status: "open".to_string(),
                github_pull_request_id: None,
            })
            .await
            .unwrap();

        let updated = db
            .update_task_status(task.id, "in_review")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, "in_review");

        db.create_feedback(CreateFeedbackRow {
            task_id: task.id,
            github_comment_id: Some("c1".to_string()),
            status: "open".to_string(),
            feedback: "Please add tests".to_string(),
        })
        .await
        .unwrap();
        db.create_question(CreateQuestionRow {
            task_id: task.id,
            question: "Which branch?".to_string(),
            status: "open".to_string(),
        })
        .await
        .unwrap();

        assert_eq!(db.list_tasks_for_agent(agent.id).await.unwrap().len(), 1);
        assert_eq!(db.list_feedback_for_task(task.id).await.unwrap().len(), 1);
        let questions = db.list_questions_for_task(task.id).await.unwrap();
        assert_eq!(questions.len(), 1);
        assert!(questions[0].answer.is_none());
    }
}
