use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use greenpath_core::domain::goal::{GoalStatus, SustainabilityGoal};
use greenpath_core::domain::implementation::{Implementation, ImplementationId};
use greenpath_core::domain::recommendation::{
    Recommendation, RecommendationStatus, StoredRecommendation,
};
use greenpath_core::domain::UserId;
use greenpath_core::errors::StoreError;
use greenpath_core::store::{GoalStore, ImplementationStore, RecommendationStore};

#[derive(Default)]
pub struct InMemoryRecommendationStore {
    rows: RwLock<Vec<StoredRecommendation>>,
}

impl InMemoryRecommendationStore {
    pub async fn set_status(
        &self,
        user_id: &UserId,
        title: &str,
        status: RecommendationStatus,
    ) -> usize {
        let key = greenpath_core::domain::recommendation::normalize_title(title);
        let mut rows = self.rows.write().await;
        let mut changed = 0;
        for row in rows.iter_mut().filter(|row| {
            &row.user_id == user_id && row.recommendation.normalized_title() == key
        }) {
            row.status = status;
            changed += 1;
        }
        changed
    }
}

#[async_trait::async_trait]
impl RecommendationStore for InMemoryRecommendationStore {
    async fn list_for_user(
        &self,
        user_id: &UserId,
        statuses: &[RecommendationStatus],
    ) -> Result<Vec<StoredRecommendation>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|row| &row.user_id == user_id)
            .filter(|row| statuses.is_empty() || statuses.contains(&row.status))
            .cloned()
            .collect())
    }

    async fn save_batch(
        &self,
        user_id: &UserId,
        recommendations: &[Recommendation],
    ) -> Result<(), StoreError> {
        let created_at = Utc::now();
        let mut rows = self.rows.write().await;
        rows.extend(recommendations.iter().cloned().map(|recommendation| StoredRecommendation {
            user_id: user_id.clone(),
            recommendation,
            status: RecommendationStatus::Pending,
            created_at,
        }));
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryImplementationStore {
    implementations: RwLock<HashMap<String, Implementation>>,
}

#[async_trait::async_trait]
impl ImplementationStore for InMemoryImplementationStore {
    async fn find_by_id(
        &self,
        id: &ImplementationId,
    ) -> Result<Option<Implementation>, StoreError> {
        let implementations = self.implementations.read().await;
        Ok(implementations.get(&id.0).cloned())
    }

    async fn save(&self, implementation: &Implementation) -> Result<(), StoreError> {
        let mut implementations = self.implementations.write().await;
        implementations.insert(implementation.id.0.clone(), implementation.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryGoalStore {
    goals: RwLock<HashMap<String, SustainabilityGoal>>,
}

impl InMemoryGoalStore {
    pub async fn find(&self, id: &str) -> Option<SustainabilityGoal> {
        self.goals.read().await.get(id).cloned()
    }
}

#[async_trait::async_trait]
impl GoalStore for InMemoryGoalStore {
    async fn list_active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<SustainabilityGoal>, StoreError> {
        let goals = self.goals.read().await;
        let mut active = goals
            .values()
            .filter(|goal| &goal.user_id == user_id && goal.status == GoalStatus::Active)
            .cloned()
            .collect::<Vec<_>>();
        active.sort_by(|left, right| left.id.0.cmp(&right.id.0));
        Ok(active)
    }

    async fn save_goal(&self, goal: &SustainabilityGoal) -> Result<(), StoreError> {
        let mut goals = self.goals.write().await;
        goals.insert(goal.id.0.clone(), goal.clone());
        Ok(())
    }
}
