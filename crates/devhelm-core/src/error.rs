// Error types for control-plane operations

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for control-plane operations
pub type Result<T> = std::result::Result<T, ControlError>;

/// Errors raised by domain services
#[derive(Debug, Error)]
pub enum ControlError {
    /// Unknown agent status value
    #[error("Invalid agent status: {0}")]
    InvalidAgentStatus(String),

    /// Unknown API key status value
    #[error("Invalid API key status: {0}")]
    InvalidApiKeyStatus(String),

    /// The calling user is not a member of any team
    #[error("User must belong to a team")]
    NoTeam,

    /// Agent missing, soft-deleted, or outside the caller's team
    #[error("Agent not found: {0}")]
    AgentNotFound(Uuid),

    /// API key missing or not owned by the given agent
    #[error("API key not found: {0}")]
    ApiKeyNotFound(Uuid),

    /// Task missing, soft-deleted, or owned by another agent
    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),

    /// A user already exists for the email of a new lead
    #[error("A user with this email already exists")]
    EmailTaken,

    /// Storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl ControlError {
    /// Whether this error means "the thing does not exist for this caller"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ControlError::AgentNotFound(_)
                | ControlError::ApiKeyNotFound(_)
                | ControlError::TaskNotFound(_)
        )
    }
}
