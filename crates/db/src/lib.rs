pub mod connection;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_from_config, connect_with_settings, DbPool};
pub use repositories::{
    InMemoryGoalStore, InMemoryImplementationStore, InMemoryRecommendationStore, RepositoryError,
    SqlGoalRepository, SqlImplementationRepository, SqlRecommendationRepository,
};
