use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecommendationId(pub String);

pub const MIN_PRIORITY_SCORE: f64 = 0.1;
pub const MAX_PRIORITY_SCORE: f64 = 1.0;
pub const MIN_ROI_MONTHS: u32 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }

    /// Lenient parse used for externally generated candidates; unknown text is `Medium`.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" | "low" => Self::Easy,
            "hard" | "high" | "difficult" => Self::Hard,
            _ => Self::Medium,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Rules,
    Ai,
}

impl RecommendationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rules => "rules",
            Self::Ai => "ai",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "rules" => Some(Self::Rules),
            "ai" => Some(Self::Ai),
            _ => None,
        }
    }
}

/// A scored recommendation. Never re-scored once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: RecommendationId,
    pub title: String,
    pub description: String,
    pub category: String,
    /// USD per year
    pub estimated_cost_savings: f64,
    pub estimated_co2_reduction: f64,
    pub roi_months: u32,
    pub difficulty: Difficulty,
    pub priority_score: f64,
    pub source: RecommendationSource,
    pub confidence: f64,
    #[serde(default)]
    pub implementation_steps: Vec<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl Recommendation {
    /// Key used for de-duplication and cross-session suppression.
    pub fn normalized_title(&self) -> String {
        normalize_title(&self.title)
    }
}

pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Sum of savings and CO2 reduction across a list of recommendations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationTotals {
    pub total_potential_savings: f64,
    pub total_co2_reduction: f64,
}

impl RecommendationTotals {
    pub fn from_recommendations(recommendations: &[Recommendation]) -> Self {
        recommendations.iter().fold(Self::default(), |totals, recommendation| Self {
            total_potential_savings: totals.total_potential_savings
                + recommendation.estimated_cost_savings,
            total_co2_reduction: totals.total_co2_reduction
                + recommendation.estimated_co2_reduction,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Pending,
    InProgress,
    Completed,
    Dismissed,
}

impl RecommendationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Dismissed => "dismissed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "dismissed" => Some(Self::Dismissed),
            _ => None,
        }
    }

    /// Statuses whose titles must not be recommended again.
    pub fn suppressing() -> &'static [Self] {
        &[Self::Pending, Self::InProgress, Self::Completed]
    }
}

/// A recommendation as held by the persistence collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredRecommendation {
    pub user_id: UserId,
    pub recommendation: Recommendation,
    pub status: RecommendationStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::{normalize_title, Difficulty, RecommendationStatus};

    #[test]
    fn titles_normalize_case_and_whitespace() {
        assert_eq!(normalize_title("  LED Lighting Retrofit "), "led lighting retrofit");
    }

    #[test]
    fn lenient_difficulty_defaults_to_medium() {
        assert_eq!(Difficulty::parse_lenient("EASY"), Difficulty::Easy);
        assert_eq!(Difficulty::parse_lenient("hard"), Difficulty::Hard);
        assert_eq!(Difficulty::parse_lenient("moderate"), Difficulty::Medium);
    }

    #[test]
    fn status_round_trips_through_storage_strings() {
        for status in [
            RecommendationStatus::Pending,
            RecommendationStatus::InProgress,
            RecommendationStatus::Completed,
            RecommendationStatus::Dismissed,
        ] {
            assert_eq!(RecommendationStatus::parse(status.as_str()), Some(status));
        }
        assert!(!RecommendationStatus::suppressing().contains(&RecommendationStatus::Dismissed));
    }
}
