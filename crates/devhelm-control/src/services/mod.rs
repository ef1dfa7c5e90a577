// Services layer for business logic
// Services own domain rules and call storage directly

pub mod agent;
pub mod api_key;
pub mod lead;
pub mod task;

pub use agent::AgentService;
pub use api_key::ApiKeyService;
pub use lead::LeadService;
pub use task::TaskService;
