//! Persistence collaborator contracts.
//!
//! Implementations live outside the core (SQLite and in-memory in `greenpath-db`).

use async_trait::async_trait;

use crate::domain::goal::SustainabilityGoal;
use crate::domain::implementation::{Implementation, ImplementationId};
use crate::domain::recommendation::{Recommendation, RecommendationStatus, StoredRecommendation};
use crate::domain::UserId;
use crate::errors::StoreError;

#[async_trait]
pub trait RecommendationStore: Send + Sync {
    /// An empty `statuses` slice matches every status.
    async fn list_for_user(
        &self,
        user_id: &UserId,
        statuses: &[RecommendationStatus],
    ) -> Result<Vec<StoredRecommendation>, StoreError>;

    /// Saves every recommendation as `pending`, or none of them.
    async fn save_batch(
        &self,
        user_id: &UserId,
        recommendations: &[Recommendation],
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ImplementationStore: Send + Sync {
    async fn find_by_id(&self, id: &ImplementationId)
        -> Result<Option<Implementation>, StoreError>;

    async fn save(&self, implementation: &Implementation) -> Result<(), StoreError>;
}

#[async_trait]
pub trait GoalStore: Send + Sync {
    async fn list_active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<SustainabilityGoal>, StoreError>;

    /// Unconditional overwrite; concurrent writers to the same goal are last-write-wins.
    // TODO: accept the expected `updated_at` and reject stale writes once goals are
    // edited concurrently.
    async fn save_goal(&self, goal: &SustainabilityGoal) -> Result<(), StoreError>;
}
