// DevHelm storage layer
//
// Row models, the PostgreSQL repository, the in-memory dev database and the
// StorageBackend enum that dispatches between them.

pub mod backend;
pub mod memory;
pub mod models;
pub mod repositories;

pub use backend::StorageBackend;
pub use memory::InMemoryDatabase;
pub use models::*;
pub use repositories::Database;
