use std::sync::Arc;

use greenpath_agent::build_ai_source;
use greenpath_core::config::{AppConfig, ConfigError, LoadOptions};
use greenpath_core::errors::AiSourceError;
use greenpath_core::{
    AiRecommendationSource, GoalImpactMapper, ImpactMappingTable, ImplementationService,
    RecommendationService, RuleEngine,
};
use greenpath_db::{
    connect_from_config, migrations, DbPool, SqlGoalRepository, SqlImplementationRepository,
    SqlRecommendationRepository,
};
use thiserror::Error;
use tracing::info;

use crate::routes::AppState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("ai source setup failed: {0}")]
    AiSource(#[source] AiSourceError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool =
        connect_from_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let ai_source = build_ai_source(&config.ai).map_err(BootstrapError::AiSource)?;
    let status = ai_source.status();
    info!(
        event_name = "system.bootstrap.ai_source",
        correlation_id = "bootstrap",
        configured = status.configured,
        provider = %status.provider,
        model = status.model.as_deref().unwrap_or("none"),
        "ai recommendation source initialized"
    );

    let state = build_state(&config, db_pool.clone(), ai_source);
    Ok(Application { config, db_pool, state })
}

pub fn build_state(
    config: &AppConfig,
    db_pool: DbPool,
    ai_source: Arc<dyn AiRecommendationSource>,
) -> AppState {
    let engine = Arc::new(RuleEngine::from_config(&config.engine));
    let recommendations = RecommendationService::new(
        engine.clone(),
        ai_source,
        Arc::new(SqlRecommendationRepository::new(db_pool.clone())),
    );
    let mapper = GoalImpactMapper::new(
        Arc::new(ImpactMappingTable::default()),
        Arc::new(SqlGoalRepository::new(db_pool.clone())),
    );
    let implementations = ImplementationService::new(
        Arc::new(SqlImplementationRepository::new(db_pool.clone())),
        mapper,
    );

    AppState {
        db_pool,
        engine,
        recommendations: Arc::new(recommendations),
        implementations: Arc::new(implementations),
    }
}
