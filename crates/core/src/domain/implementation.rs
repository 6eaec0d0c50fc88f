use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::recommendation::{Recommendation, RecommendationId};
use crate::domain::UserId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImplementationId(pub String);

pub const MIN_ACTIVE_PROGRESS: f64 = 5.0;
pub const MAX_ACTIVE_PROGRESS: f64 = 95.0;
pub const COMPLETED_PROGRESS: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImplementationStatus {
    Started,
    InProgress,
    Completed,
}

impl ImplementationStatus {
    fn rank(self) -> u8 {
        match self {
            Self::Started => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "started" => Some(Self::Started),
            "in-progress" | "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Completed)
    }
}

/// A user's execution of a recommendation. Status only moves forward.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Implementation {
    pub id: ImplementationId,
    pub user_id: UserId,
    pub recommendation_id: Option<RecommendationId>,
    pub category: String,
    pub estimated_cost_savings: f64,
    pub estimated_co2_reduction: f64,
    pub status: ImplementationStatus,
    pub progress_percentage: f64,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Implementation {
    pub fn start(
        id: ImplementationId,
        user_id: UserId,
        recommendation: &Recommendation,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            recommendation_id: Some(recommendation.id.clone()),
            category: recommendation.category.clone(),
            estimated_cost_savings: recommendation.estimated_cost_savings,
            estimated_co2_reduction: recommendation.estimated_co2_reduction,
            status: ImplementationStatus::Started,
            progress_percentage: MIN_ACTIVE_PROGRESS,
            started_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn can_transition_to(&self, next: ImplementationStatus) -> bool {
        next.rank() > self.status.rank()
    }

    pub fn transition_to(
        &mut self,
        next: ImplementationStatus,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.can_transition_to(next) {
            let from = self.status;
            return Err(DomainError::InvalidImplementationTransition { from, to: next });
        }

        self.status = next;
        self.updated_at = now;
        if next == ImplementationStatus::Completed {
            self.progress_percentage = COMPLETED_PROGRESS;
            self.completed_at = Some(now);
        } else {
            self.progress_percentage = clamp_active_progress(self.progress_percentage);
        }
        Ok(())
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition_to(ImplementationStatus::Completed, now)
    }

    /// Records reported progress on an active implementation, clamped to [5, 95].
    /// The first report moves a started implementation to in-progress.
    pub fn record_progress(
        &mut self,
        percentage: f64,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.status.is_active() {
            return Err(DomainError::InvariantViolation(
                "completed implementations are fixed at 100% progress".to_owned(),
            ));
        }
        if !percentage.is_finite() {
            return Err(DomainError::validation("progress_percentage", "must be a finite number"));
        }

        if self.status == ImplementationStatus::Started {
            self.transition_to(ImplementationStatus::InProgress, now)?;
        }
        self.progress_percentage = clamp_active_progress(percentage);
        self.updated_at = now;
        Ok(())
    }
}

fn clamp_active_progress(percentage: f64) -> f64 {
    percentage.clamp(MIN_ACTIVE_PROGRESS, MAX_ACTIVE_PROGRESS)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{Implementation, ImplementationId, ImplementationStatus};
    use crate::domain::recommendation::{
        Difficulty, Recommendation, RecommendationId, RecommendationSource,
    };
    use crate::domain::UserId;
    use crate::errors::DomainError;

    fn implementation(status: ImplementationStatus) -> Implementation {
        let now = Utc::now();
        Implementation {
            id: ImplementationId("IMP-1".to_owned()),
            user_id: UserId("user-1".to_owned()),
            recommendation_id: None,
            category: "Energy Efficiency".to_owned(),
            estimated_cost_savings: 2_400.0,
            estimated_co2_reduction: 1.5,
            status,
            progress_percentage: 40.0,
            started_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    #[test]
    fn completion_forces_full_progress() {
        let mut implementation = implementation(ImplementationStatus::InProgress);
        implementation.complete(Utc::now()).expect("in-progress -> completed");

        assert_eq!(implementation.status, ImplementationStatus::Completed);
        assert_eq!(implementation.progress_percentage, 100.0);
        assert!(implementation.completed_at.is_some());
    }

    #[test]
    fn started_can_jump_straight_to_completed() {
        let mut implementation = implementation(ImplementationStatus::Started);
        implementation.complete(Utc::now()).expect("started -> completed");
        assert_eq!(implementation.status, ImplementationStatus::Completed);
    }

    #[test]
    fn backwards_and_repeated_transitions_are_rejected() {
        let mut implementation = implementation(ImplementationStatus::Completed);
        let error = implementation
            .transition_to(ImplementationStatus::InProgress, Utc::now())
            .expect_err("completed -> in-progress");
        assert!(matches!(error, DomainError::InvalidImplementationTransition { .. }));

        let error = implementation.complete(Utc::now()).expect_err("completed -> completed");
        assert!(matches!(error, DomainError::InvalidImplementationTransition { .. }));
    }

    #[test]
    fn active_progress_is_clamped() {
        let mut implementation = implementation(ImplementationStatus::InProgress);
        implementation.record_progress(100.0, Utc::now()).expect("progress");
        assert_eq!(implementation.progress_percentage, 95.0);

        implementation.record_progress(0.0, Utc::now()).expect("progress");
        assert_eq!(implementation.progress_percentage, 5.0);
    }

    #[test]
    fn first_progress_report_moves_started_to_in_progress() {
        let mut implementation = implementation(ImplementationStatus::Started);
        implementation.record_progress(30.0, Utc::now()).expect("progress");

        assert_eq!(implementation.status, ImplementationStatus::InProgress);
        assert_eq!(implementation.progress_percentage, 30.0);

        implementation.record_progress(60.0, Utc::now()).expect("second report");
        assert_eq!(implementation.status, ImplementationStatus::InProgress);
    }

    #[test]
    fn start_copies_recommendation_impact() {
        let recommendation = Recommendation {
            id: RecommendationId("led_retrofit_basic".to_owned()),
            title: "LED Lighting Retrofit".to_owned(),
            description: String::new(),
            category: "Energy Efficiency".to_owned(),
            estimated_cost_savings: 1_200.0,
            estimated_co2_reduction: 2.76,
            roi_months: 12,
            difficulty: Difficulty::Easy,
            priority_score: 0.8,
            source: RecommendationSource::Rules,
            confidence: 0.9,
            implementation_steps: Vec::new(),
            reasoning: None,
        };

        let implementation = Implementation::start(
            ImplementationId("IMP-7".to_owned()),
            UserId("user-1".to_owned()),
            &recommendation,
            Utc::now(),
        );

        assert_eq!(implementation.status, ImplementationStatus::Started);
        assert_eq!(implementation.progress_percentage, 5.0);
        assert_eq!(implementation.recommendation_id, Some(recommendation.id.clone()));
        assert_eq!(implementation.estimated_co2_reduction, 2.76);
        assert!(implementation.completed_at.is_none());
    }

    #[test]
    fn completed_progress_cannot_be_edited() {
        let mut implementation = implementation(ImplementationStatus::Completed);
        assert!(implementation.record_progress(50.0, Utc::now()).is_err());
    }
}
