// Pre-signup leads and the invite codes issued for them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prospective signup captured before account creation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Invitation sent to a lead
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InviteCode {
    pub id: Uuid,
    pub code: String,
    pub email: String,
    pub invited_by: Uuid,
    pub team_id: Option<Uuid>,
    pub used: bool,
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
}
