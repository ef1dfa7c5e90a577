// DevHelm core domain
//
// Entities shared by the storage layer and the control-plane server:
// - Agent / AgentStatus: autonomous workers scoped to a team and project
// - ApiKey: bearer credentials owned by an agent
// - AgentPrincipal: the identity bound to one authenticated API request
// - Team / User / Lead / InviteCode: tenancy and signup
// - Task / Feedback / Question: work tracked against external tickets

pub mod agent;
pub mod api_key;
pub mod error;
pub mod lead;
pub mod principal;
pub mod task;
pub mod team;

pub use agent::{Agent, AgentStatus};
pub use api_key::{
    generate_api_key, hash_api_key, keys_match, mask_api_key, ApiKey, ApiKeyStatus,
    API_KEY_BYTES, API_KEY_HEX_LEN,
};
pub use error::{ControlError, Result};
pub use lead::{InviteCode, Lead};
pub use principal::{AgentPrincipal, Role};
pub use task::{Feedback, Question, Task, DEFAULT_TASK_STATUS};
pub use team::{Team, User};
