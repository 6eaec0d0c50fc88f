use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Achieved,
    Archived,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Achieved => "achieved",
            Self::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "achieved" => Some(Self::Achieved),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// A user-defined sustainability target. `progress_percentage` always lies in [0, 100].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SustainabilityGoal {
    pub id: GoalId,
    pub user_id: UserId,
    pub title: String,
    pub category: String,
    pub unit: String,
    pub target_value: f64,
    pub current_value: f64,
    pub progress_percentage: f64,
    pub status: GoalStatus,
    pub last_measured_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl SustainabilityGoal {
    /// Adds a contribution and recomputes progress from the new current value.
    pub fn record_contribution(&mut self, value: f64, now: DateTime<Utc>) {
        self.current_value += value;
        self.progress_percentage = progress_percentage(self.current_value, self.target_value);
        self.last_measured_at = Some(now);
        self.updated_at = now;
    }
}

/// `current / target * 100` clamped to [0, 100]; zero when the target is not positive.
pub fn progress_percentage(current_value: f64, target_value: f64) -> f64 {
    if target_value <= 0.0 || !target_value.is_finite() || !current_value.is_finite() {
        return 0.0;
    }
    (current_value / target_value * 100.0).clamp(0.0, 100.0)
}
