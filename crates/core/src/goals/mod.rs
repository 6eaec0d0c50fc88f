//! Propagation of a completed implementation's impact onto the user's goals.

pub mod conversion;
pub mod mapping;
pub mod service;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::goal::{GoalId, GoalStatus, SustainabilityGoal};
use crate::domain::implementation::Implementation;
use crate::store::GoalStore;

pub use conversion::{normalize_unit, UnitConverter};
pub use mapping::{normalize_category, CategoryImpactMapping, ImpactMappingTable, ImpactValue};
pub use service::{CompletionOutcome, ImplementationService};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GoalImpact {
    pub goal_id: GoalId,
    pub goal_title: String,
    pub goal_category: String,
    pub raw_value: f64,
    pub raw_unit: String,
    pub applied_value: f64,
    pub applied_unit: String,
    pub previous_value: f64,
    pub new_value: f64,
    pub progress_percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GoalUpdateError {
    /// `None` when the failure happened before any single goal was touched.
    pub goal_id: Option<GoalId>,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GoalImpactResult {
    pub success: bool,
    pub goals_updated: usize,
    pub total_impact: f64,
    pub impacts: Vec<GoalImpact>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GoalUpdateError>,
    pub message: String,
}

impl GoalImpactResult {
    fn empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            goals_updated: 0,
            total_impact: 0.0,
            impacts: Vec::new(),
            errors: Vec::new(),
            message: message.into(),
        }
    }
}

#[derive(Clone)]
pub struct GoalImpactMapper {
    table: Arc<ImpactMappingTable>,
    converter: UnitConverter,
    goals: Arc<dyn GoalStore>,
}

impl GoalImpactMapper {
    pub fn new(table: Arc<ImpactMappingTable>, goals: Arc<dyn GoalStore>) -> Self {
        Self { table, converter: UnitConverter::new(), goals }
    }

    /// Applies the implementation's impact to every matching active goal.
    ///
    /// Goals are updated one at a time with no shared transaction. A failed save is
    /// recorded in `errors` and the remaining goals are still processed.
    pub async fn apply(
        &self,
        implementation: &Implementation,
        now: DateTime<Utc>,
        correlation_id: &str,
    ) -> GoalImpactResult {
        let Some(mapping) = self.table.lookup(&implementation.category) else {
            info!(
                event_name = "goals.impact.unmapped_category",
                correlation_id,
                implementation_id = %implementation.id.0,
                category = %implementation.category,
                "implementation category has no goal mapping"
            );
            return GoalImpactResult::empty(format!(
                "No goal mapping for category '{}'",
                implementation.category
            ));
        };

        let goals = match self.goals.list_active_for_user(&implementation.user_id).await {
            Ok(goals) => goals,
            Err(error) => {
                warn!(
                    event_name = "goals.impact.load_failed",
                    correlation_id,
                    user_id = %implementation.user_id,
                    error = %error,
                    "could not load active goals"
                );
                return GoalImpactResult {
                    success: false,
                    errors: vec![GoalUpdateError { goal_id: None, message: error.to_string() }],
                    ..GoalImpactResult::empty("Goal impact could not be applied")
                };
            }
        };

        let mut impacts = Vec::new();
        let mut errors = Vec::new();
        for goal in goals.into_iter().filter(|goal| goal.status == GoalStatus::Active) {
            let Some(contribution) = mapping.contribution_for(&goal.category) else {
                continue;
            };
            let raw = (contribution.compute)(implementation);
            match self.apply_to_goal(goal, raw, now).await {
                Ok(impact) => impacts.push(impact),
                Err(error) => {
                    warn!(
                        event_name = "goals.impact.update_failed",
                        correlation_id,
                        goal_id = ?error.goal_id,
                        error = %error.message,
                        "goal update failed; continuing with remaining goals"
                    );
                    errors.push(error);
                }
            }
        }

        let goals_updated = impacts.len();
        let total_impact = impacts.iter().map(|impact| impact.applied_value).sum();
        let message = match (goals_updated, errors.len()) {
            (0, 0) => format!("No active goals track {} impact", mapping.category),
            (updated, 0) => format!("Updated {updated} goal(s)"),
            (updated, failed) => format!("Updated {updated} goal(s); {failed} update(s) failed"),
        };
        info!(
            event_name = "goals.impact.applied",
            correlation_id,
            implementation_id = %implementation.id.0,
            goals_updated,
            failed = errors.len(),
            "goal impact applied"
        );

        GoalImpactResult {
            success: errors.is_empty(),
            goals_updated,
            total_impact,
            impacts,
            errors,
            message,
        }
    }

    async fn apply_to_goal(
        &self,
        mut goal: SustainabilityGoal,
        raw: ImpactValue,
        now: DateTime<Utc>,
    ) -> Result<GoalImpact, GoalUpdateError> {
        let converted = if goal.unit.trim().is_empty() {
            conversion::Conversion { value: raw.value, unit: raw.unit.to_owned(), converted: false }
        } else {
            self.converter.convert(raw.value, raw.unit, &goal.unit)
        };

        let previous_value = goal.current_value;
        goal.record_contribution(converted.value, now);
        self.goals.save_goal(&goal).await.map_err(|error| GoalUpdateError {
            goal_id: Some(goal.id.clone()),
            message: error.to_string(),
        })?;

        Ok(GoalImpact {
            goal_id: goal.id,
            goal_title: goal.title,
            goal_category: goal.category,
            raw_value: raw.value,
            raw_unit: raw.unit.to_owned(),
            applied_value: converted.value,
            applied_unit: converted.unit,
            previous_value,
            new_value: goal.current_value,
            progress_percentage: goal.progress_percentage,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::{GoalImpactMapper, ImpactMappingTable};
    use crate::domain::goal::{GoalId, GoalStatus, SustainabilityGoal};
    use crate::domain::implementation::{Implementation, ImplementationId, ImplementationStatus};
    use crate::domain::UserId;
    use crate::errors::StoreError;
    use crate::store::GoalStore;

    #[derive(Default)]
    pub(crate) struct FakeGoals {
        pub(crate) goals: Mutex<Vec<SustainabilityGoal>>,
        pub(crate) failing: HashSet<String>,
    }

    impl FakeGoals {
        pub(crate) fn with(goals: Vec<SustainabilityGoal>) -> Self {
            Self { goals: Mutex::new(goals), failing: HashSet::new() }
        }

        pub(crate) fn goal(&self, id: &str) -> SustainabilityGoal {
            self.goals
                .lock()
                .expect("lock")
                .iter()
                .find(|goal| goal.id.0 == id)
                .cloned()
                .expect("goal exists")
        }
    }

    #[async_trait]
    impl GoalStore for FakeGoals {
        async fn list_active_for_user(
            &self,
            user_id: &UserId,
        ) -> Result<Vec<SustainabilityGoal>, StoreError> {
            Ok(self
                .goals
                .lock()
                .expect("lock")
                .iter()
                .filter(|goal| &goal.user_id == user_id && goal.status == GoalStatus::Active)
                .cloned()
                .collect())
        }

        async fn save_goal(&self, goal: &SustainabilityGoal) -> Result<(), StoreError> {
            if self.failing.contains(&goal.id.0) {
                return Err(StoreError::Backend(format!("write to {} rejected", goal.id.0)));
            }
            let mut goals = self.goals.lock().expect("lock");
            if let Some(existing) = goals.iter_mut().find(|existing| existing.id == goal.id) {
                *existing = goal.clone();
            }
            Ok(())
        }
    }

    pub(crate) fn goal(
        id: &str,
        category: &str,
        unit: &str,
        target: f64,
        current: f64,
    ) -> SustainabilityGoal {
        SustainabilityGoal {
            id: GoalId(id.to_owned()),
            user_id: UserId("user-1".to_owned()),
            title: format!("{category} goal"),
            category: category.to_owned(),
            unit: unit.to_owned(),
            target_value: target,
            current_value: current,
            progress_percentage: 0.0,
            status: GoalStatus::Active,
            last_measured_at: None,
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn completed(category: &str) -> Implementation {
        let now = Utc::now();
        Implementation {
            id: ImplementationId("IMP-1".to_owned()),
            user_id: UserId("user-1".to_owned()),
            recommendation_id: None,
            category: category.to_owned(),
            estimated_cost_savings: 2_400.0,
            estimated_co2_reduction: 1.5,
            status: ImplementationStatus::Completed,
            progress_percentage: 100.0,
            started_at: now,
            updated_at: now,
            completed_at: Some(now),
        }
    }

    fn mapper(store: Arc<FakeGoals>) -> GoalImpactMapper {
        GoalImpactMapper::new(Arc::new(ImpactMappingTable::default()), store)
    }

    #[tokio::test]
    async fn cost_savings_goal_advances_by_estimated_savings() {
        let store =
            Arc::new(FakeGoals::with(vec![goal("G-1", "cost_savings", "usd", 5_000.0, 1_000.0)]));

        let result =
            mapper(store.clone()).apply(&completed("Energy Efficiency"), Utc::now(), "req-1").await;

        assert!(result.success);
        assert_eq!(result.goals_updated, 1);
        let updated = store.goal("G-1");
        assert_eq!(updated.current_value, 3_400.0);
        assert!((updated.progress_percentage - 68.0).abs() < 1e-9);
        assert!(updated.last_measured_at.is_some());
    }

    #[tokio::test]
    async fn zero_target_goal_keeps_zero_progress() {
        let store =
            Arc::new(FakeGoals::with(vec![goal("G-1", "cost_savings", "usd", 0.0, 1_000.0)]));

        mapper(store.clone()).apply(&completed("Energy Efficiency"), Utc::now(), "req-2").await;

        let updated = store.goal("G-1");
        assert_eq!(updated.current_value, 3_400.0);
        assert_eq!(updated.progress_percentage, 0.0);
    }

    #[tokio::test]
    async fn values_are_converted_to_the_goal_unit() {
        let store = Arc::new(FakeGoals::with(vec![
            goal("G-1", "Carbon Reduction", "lbs_co2", 10_000.0, 0.0),
            goal("G-2", "cost_savings", "thousand_usd", 10.0, 0.0),
        ]));

        let result =
            mapper(store.clone()).apply(&completed("Energy Efficiency"), Utc::now(), "req-3").await;

        assert_eq!(result.goals_updated, 2);
        assert!((store.goal("G-1").current_value - 3_000.0).abs() < 1e-9);
        assert!((store.goal("G-2").current_value - 2.4).abs() < 1e-9);
        assert!((store.goal("G-1").progress_percentage - 30.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn missing_conversion_passes_value_through() {
        let store =
            Arc::new(FakeGoals::with(vec![goal("G-1", "cost_savings", "eur", 10_000.0, 0.0)]));

        mapper(store.clone()).apply(&completed("Energy Efficiency"), Utc::now(), "req-4").await;

        assert_eq!(store.goal("G-1").current_value, 2_400.0);
    }

    #[tokio::test]
    async fn unknown_category_is_an_informational_no_op() {
        let store =
            Arc::new(FakeGoals::with(vec![goal("G-1", "cost_savings", "usd", 5_000.0, 1_000.0)]));

        let result =
            mapper(store.clone()).apply(&completed("Assessment"), Utc::now(), "req-5").await;

        assert!(result.success);
        assert_eq!(result.goals_updated, 0);
        assert!(result.errors.is_empty());
        assert!(result.message.contains("Assessment"));
        assert_eq!(store.goal("G-1").current_value, 1_000.0);
    }

    #[tokio::test]
    async fn one_failing_goal_does_not_block_the_others() {
        let mut store = FakeGoals::with(vec![
            goal("G-1", "cost_savings", "usd", 5_000.0, 0.0),
            goal("G-2", "carbon_reduction", "tons_co2", 10.0, 0.0),
        ]);
        store.failing.insert("G-1".to_owned());
        let store = Arc::new(store);

        let result =
            mapper(store.clone()).apply(&completed("Energy Efficiency"), Utc::now(), "req-6").await;

        assert!(!result.success);
        assert_eq!(result.goals_updated, 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].goal_id, Some(GoalId("G-1".to_owned())));
        assert_eq!(store.goal("G-2").current_value, 1.5);
        assert_eq!(store.goal("G-1").current_value, 0.0);
    }

    #[tokio::test]
    async fn archived_and_unrelated_goals_are_untouched() {
        let mut archived = goal("G-1", "cost_savings", "usd", 5_000.0, 0.0);
        archived.status = GoalStatus::Archived;
        let unrelated = goal("G-2", "water_usage", "gallons", 100.0, 0.0);
        let store = Arc::new(FakeGoals::with(vec![archived, unrelated]));

        let result =
            mapper(store.clone()).apply(&completed("Energy Efficiency"), Utc::now(), "req-7").await;

        assert!(result.success);
        assert_eq!(result.goals_updated, 0);
        assert_eq!(store.goal("G-1").current_value, 0.0);
    }
}
