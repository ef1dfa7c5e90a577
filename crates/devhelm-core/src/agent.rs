// Agent entity and lifecycle status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "openapi")]
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ControlError;

/// Agent lifecycle status.
///
/// A flat enum: any value may be set to any other value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Enabled,
    Disabled,
    Unresponsive,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Enabled => "enabled",
            AgentStatus::Disabled => "disabled",
            AgentStatus::Unresponsive => "unresponsive",
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentStatus {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enabled" => Ok(AgentStatus::Enabled),
            "disabled" => Ok(AgentStatus::Disabled),
            "unresponsive" => Ok(AgentStatus::Unresponsive),
            other => Err(ControlError::InvalidAgentStatus(other.to_string())),
        }
    }
}

/// Lossy conversion used when reading stored rows.
/// Unknown values map to `Disabled` so a corrupt row can never authenticate.
impl From<&str> for AgentStatus {
    fn from(s: &str) -> Self {
        s.parse().unwrap_or(AgentStatus::Disabled)
    }
}

/// Autonomous worker scoped to one team and one project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub id: Uuid,
    pub team_id: Uuid,
    pub name: String,
    /// Short project code, e.g. "DEV"
    pub project: String,
    pub status: AgentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Agent {
    /// Whether requests authenticated as this agent may proceed
    pub fn can_authenticate(&self) -> bool {
        self.status == AgentStatus::Enabled && self.deleted_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(status: AgentStatus) -> Agent {
        let now = Utc::now();
        Agent {
            id: Uuid::now_v7(),
            team_id: Uuid::now_v7(),
            name: "Bot1".to_string(),
            project: "DEV".to_string(),
            status,
            last_seen: None,
            server_address: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            AgentStatus::Enabled,
            AgentStatus::Disabled,
            AgentStatus::Unresponsive,
        ] {
            assert_eq!(status.as_str().parse::<AgentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        let err = "paused".parse::<AgentStatus>().unwrap_err();
        assert!(matches!(err, ControlError::InvalidAgentStatus(s) if s == "paused"));
    }

    #[test]
    fn test_lossy_status_fails_closed() {
        assert_eq!(AgentStatus::from("enabled"), AgentStatus::Enabled);
        assert_eq!(AgentStatus::from("garbage"), AgentStatus::Disabled);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&AgentStatus::Unresponsive).unwrap();
        assert_eq!(json, "\"unresponsive\"");
    }

    #[test]
    fn test_can_authenticate() {
        assert!(agent(AgentStatus::Enabled).can_authenticate());
        assert!(!agent(AgentStatus::Disabled).can_authenticate());
        assert!(!agent(AgentStatus::Unresponsive).can_authenticate());

        let mut deleted = agent(AgentStatus::Enabled);
        deleted.deleted_at = Some(Utc::now());
        assert!(!deleted.can_authenticate());
    }
}
