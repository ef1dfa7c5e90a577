// API key service: issuance, credential lookup and principal resolution
// Decision: Every lookup failure collapses to None so callers cannot tell which check failed
// Decision: Key material is never logged

use chrono::{DateTime, Utc};
use devhelm_core::{
    generate_api_key, hash_api_key, keys_match, Agent, AgentPrincipal, ApiKey, ControlError,
    Result,
};
use devhelm_storage::{CreateApiKeyRow, StorageBackend};
use uuid::Uuid;

pub struct ApiKeyService {
    db: StorageBackend,
}

impl ApiKeyService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    /// Issue a fresh, non-expiring key for the agent. Existing keys are untouched.
    pub async fn issue_for_agent(&self, agent: &Agent) -> Result<ApiKey> {
        self.issue(agent, None).await
    }

    /// Issue a fresh key with an optional expiry
    pub async fn issue(&self, agent: &Agent, expires_at: Option<DateTime<Utc>>) -> Result<ApiKey> {
        let key = generate_api_key();
        let row = self
            .db
            .create_api_key(CreateApiKeyRow {
                agent_id: agent.id,
                key_hash: hash_api_key(&key),
                key,
                expires_at,
            })
            .await?;

        tracing::info!(agent_id = %agent.id, key_id = %row.id, "Issued API key");
        Ok(ApiKey::from(row))
    }

    /// Find the credential for a raw key: exact match, active, not deleted,
    /// and not expired. Returns None on any mismatch.
    pub async fn lookup(&self, raw_key: &str) -> Result<Option<ApiKey>> {
        let now = Utc::now();
        let row = self
            .db
            .find_active_api_key_by_hash(&hash_api_key(raw_key), now)
            .await?;

        Ok(row
            .map(ApiKey::from)
            .filter(|key| keys_match(&key.key, raw_key) && key.is_usable_at(now)))
    }

    /// Resolve a raw key to the principal of its enabled, live agent
    pub async fn resolve(&self, raw_key: &str) -> Result<Option<AgentPrincipal>> {
        let Some(key) = self.lookup(raw_key).await? else {
            tracing::debug!("API key lookup found no usable credential");
            return Ok(None);
        };

        let Some(row) = self.db.get_agent(key.agent_id).await? else {
            tracing::debug!(key_id = %key.id, "API key belongs to a missing or deleted agent");
            return Ok(None);
        };

        let agent = Agent::from(row);
        if !agent.can_authenticate() {
            tracing::debug!(agent_id = %agent.id, status = %agent.status, "Agent may not authenticate");
            return Ok(None);
        }

        Ok(Some(AgentPrincipal::new(agent)))
    }

    pub async fn list_for_agent(&self, agent_id: Uuid) -> Result<Vec<ApiKey>> {
        let rows = self.db.list_api_keys_for_agent(agent_id).await?;
        Ok(rows.into_iter().map(ApiKey::from).collect())
    }

    pub async fn revoke(&self, agent_id: Uuid, key_id: Uuid) -> Result<()> {
        if !self.db.revoke_api_key(key_id, agent_id).await? {
            return Err(ControlError::ApiKeyNotFound(key_id));
        }
        tracing::info!(%agent_id, %key_id, "Revoked API key");
        Ok(())
    }
}
