// Agent service: team-scoped agent management
// Decision: Agents outside the caller's team are reported as not found, never forbidden

use std::sync::Arc;

use chrono::Utc;
use devhelm_core::{Agent, AgentStatus, ApiKey, ControlError, Result};
use devhelm_storage::{CreateAgentRow, StorageBackend, UpdateAgent};
use uuid::Uuid;

use super::ApiKeyService;

pub struct AgentService {
    db: StorageBackend,
    api_keys: Arc<ApiKeyService>,
}

impl AgentService {
    pub fn new(db: StorageBackend, api_keys: Arc<ApiKeyService>) -> Self {
        Self { db, api_keys }
    }

    /// Create an enabled agent and issue its first API key
    pub async fn create(&self, team_id: Uuid, name: String, project: String) -> Result<(Agent, ApiKey)> {
        let row = self
            .db
            .create_agent(CreateAgentRow {
                team_id,
                name,
                project,
                status: AgentStatus::Enabled.to_string(),
            })
            .await?;
        let agent = Agent::from(row);
        let key = self.api_keys.issue_for_agent(&agent).await?;

        tracing::info!(agent_id = %agent.id, %team_id, "Created agent");
        Ok((agent, key))
    }

    pub async fn list_for_team(&self, team_id: Uuid) -> Result<Vec<Agent>> {
        let rows = self.db.list_agents_for_team(team_id).await?;
        Ok(rows.into_iter().map(Agent::from).collect())
    }

    /// Fetch a live agent owned by the team
    pub async fn get_for_team(&self, team_id: Uuid, id: Uuid) -> Result<Agent> {
        match self.db.get_agent(id).await? {
            Some(row) if row.team_id == team_id => Ok(Agent::from(row)),
            _ => Err(ControlError::AgentNotFound(id)),
        }
    }

    pub async fn update(&self, team_id: Uuid, id: Uuid, name: String, project: String) -> Result<Agent> {
        self.get_for_team(team_id, id).await?;
        let input = UpdateAgent {
            name: Some(name),
            project: Some(project),
            ..Default::default()
        };
        self.apply(id, input).await
    }

    /// Set the status. Any transition is allowed.
    pub async fn set_status(&self, team_id: Uuid, id: Uuid, status: AgentStatus) -> Result<Agent> {
        self.get_for_team(team_id, id).await?;
        let input = UpdateAgent {
            status: Some(status.to_string()),
            ..Default::default()
        };
        let agent = self.apply(id, input).await?;

        tracing::info!(agent_id = %id, %status, "Agent status changed");
        Ok(agent)
    }

    /// Soft delete. Keys and tasks stay in place but stop resolving.
    pub async fn delete(&self, team_id: Uuid, id: Uuid) -> Result<()> {
        self.get_for_team(team_id, id).await?;
        if !self.db.soft_delete_agent(id).await? {
            return Err(ControlError::AgentNotFound(id));
        }

        tracing::info!(agent_id = %id, %team_id, "Deleted agent");
        Ok(())
    }

    /// Record that the agent made an authenticated call
    pub async fn record_seen(&self, id: Uuid) -> Result<()> {
        self.db.touch_agent_last_seen(id, Utc::now()).await?;
        Ok(())
    }

    pub async fn list_api_keys(&self, team_id: Uuid, id: Uuid) -> Result<Vec<ApiKey>> {
        self.get_for_team(team_id, id).await?;
        self.api_keys.list_for_agent(id).await
    }

    pub async fn issue_api_key(&self, team_id: Uuid, id: Uuid) -> Result<ApiKey> {
        let agent = self.get_for_team(team_id, id).await?;
        self.api_keys.issue_for_agent(&agent).await
    }

    pub async fn revoke_api_key(&self, team_id: Uuid, id: Uuid, key_id: Uuid) -> Result<()> {
        self.get_for_team(team_id, id).await?;
        self.api_keys.revoke(id, key_id).await
    }

    async fn apply(&self, id: Uuid, input: UpdateAgent) -> Result<Agent> {
        self.db
            .update_agent(id, input)
            .await?
            .map(Agent::from)
            .ok_or(ControlError::AgentNotFound(id))
    }
}
