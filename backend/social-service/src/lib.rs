pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod repository;
pub mod services;

pub use error::{ServiceError, ServiceResult};
pub use handlers::{configure, AppState};
pub use repository::{ContentRepository, MemoryRepository, PostgresRepository};
