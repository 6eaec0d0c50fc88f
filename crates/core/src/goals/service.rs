use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::domain::implementation::{Implementation, ImplementationId};
use crate::domain::recommendation::Recommendation;
use crate::domain::UserId;
use crate::errors::{ApplicationError, DomainError, StoreError};
use crate::goals::{GoalImpactMapper, GoalImpactResult};
use crate::store::ImplementationStore;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompletionOutcome {
    pub implementation: Implementation,
    pub goal_impact: GoalImpactResult,
}

#[derive(Clone)]
pub struct ImplementationService {
    implementations: Arc<dyn ImplementationStore>,
    mapper: GoalImpactMapper,
}

impl ImplementationService {
    pub fn new(implementations: Arc<dyn ImplementationStore>, mapper: GoalImpactMapper) -> Self {
        Self { implementations, mapper }
    }

    pub async fn start(
        &self,
        id: ImplementationId,
        user_id: UserId,
        recommendation: &Recommendation,
        correlation_id: &str,
    ) -> Result<Implementation, ApplicationError> {
        if self.implementations.find_by_id(&id).await?.is_some() {
            let message = format!("implementation {} already exists", id.0);
            return Err(DomainError::InvariantViolation(message).into());
        }

        let implementation = Implementation::start(id, user_id, recommendation, Utc::now());
        self.implementations.save(&implementation).await?;
        info!(
            event_name = "implementations.lifecycle.started",
            correlation_id,
            implementation_id = %implementation.id.0,
            user_id = %implementation.user_id,
            recommendation_id = %recommendation.id.0,
            "implementation started"
        );
        Ok(implementation)
    }

    /// Marks the implementation completed, then propagates its impact onto goals.
    ///
    /// The completed status is persisted before any goal is touched and stays
    /// authoritative when goal updates fail.
    pub async fn complete(
        &self,
        id: &ImplementationId,
        correlation_id: &str,
    ) -> Result<CompletionOutcome, ApplicationError> {
        let mut implementation = self.load(id).await?;
        let now = Utc::now();
        implementation.complete(now)?;
        self.implementations.save(&implementation).await?;
        info!(
            event_name = "implementations.lifecycle.completed",
            correlation_id,
            implementation_id = %id.0,
            user_id = %implementation.user_id,
            category = %implementation.category,
            "implementation completed"
        );

        let goal_impact = self.mapper.apply(&implementation, now, correlation_id).await;
        Ok(CompletionOutcome { implementation, goal_impact })
    }

    pub async fn update_progress(
        &self,
        id: &ImplementationId,
        percentage: f64,
        correlation_id: &str,
    ) -> Result<Implementation, ApplicationError> {
        let mut implementation = self.load(id).await?;
        implementation.record_progress(percentage, Utc::now())?;
        self.implementations.save(&implementation).await?;
        info!(
            event_name = "implementations.lifecycle.progress",
            correlation_id,
            implementation_id = %id.0,
            progress = implementation.progress_percentage,
            "implementation progress recorded"
        );
        Ok(implementation)
    }

    async fn load(&self, id: &ImplementationId) -> Result<Implementation, ApplicationError> {
        self.implementations
            .find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("implementation {}", id.0)).into())
    }
}
