// Authenticated identity for agent API requests

use uuid::Uuid;

use crate::agent::Agent;

/// Authorization roles a principal can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Programmatic access by an agent
    ApiUser,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ApiUser => "ROLE_API_USER",
        }
    }
}

const AGENT_ROLES: &[Role] = &[Role::ApiUser];

/// Read-only binding of exactly one agent to one request.
///
/// Holds no credential material: the key that resolved it is dropped
/// once resolution completes.
#[derive(Debug, Clone)]
pub struct AgentPrincipal {
    agent: Agent,
}

impl AgentPrincipal {
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Identifier used for logging and session purposes
    pub fn identifier(&self) -> Uuid {
        self.agent.id
    }

    pub fn roles(&self) -> &'static [Role] {
        AGENT_ROLES
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles().contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentStatus;
    use chrono::Utc;

    #[test]
    fn test_principal_wraps_agent() {
        let now = Utc::now();
        let agent = Agent {
            id: Uuid::now_v7(),
            team_id: Uuid::now_v7(),
            name: "Bot1".to_string(),
            project: "DEV".to_string(),
            status: AgentStatus::Enabled,
            last_seen: None,
            server_address: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let principal = AgentPrincipal::new(agent.clone());

        assert_eq!(principal.identifier(), agent.id);
        assert_eq!(principal.agent(), &agent);
        assert_eq!(principal.roles(), &[Role::ApiUser]);
        assert!(principal.has_role(Role::ApiUser));
        assert_eq!(Role::ApiUser.as_str(), "ROLE_API_USER");
    }
}
