mod memory_repository;
mod postgres_repository;
pub mod seed;
mod r#trait;

pub use memory_repository::MemoryRepository;
pub use postgres_repository::PostgresRepository;
pub use r#trait::ContentRepository;

#[cfg(test)]
pub use r#trait::MockContentRepository;
