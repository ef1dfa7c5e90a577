// HTTP handlers, grouped by surface
//
// /app/...  team members, JWT user auth (agents, leads)
// /api/...  agents, API-key auth (hello-world, tasks)

pub mod agents;
pub mod common;
pub mod hello;
pub mod leads;
pub mod tasks;
pub mod validation;

pub use common::{ApiError, ErrorResponse, ListResponse};
