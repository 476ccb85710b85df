pub mod memory;
pub mod postgres;
pub mod repository;

pub use memory::MemoryRepository;
pub use postgres::{create_pool, run_migrations, PgRecommendationRepository};
pub use repository::RecommendationRepository;

#[cfg(test)]
pub use repository::MockRecommendationRepository;
