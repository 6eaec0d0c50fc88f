//! Merging deterministic rule output with externally generated candidates.

pub mod service;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::profile::BusinessProfile;
use crate::domain::recommendation::{
    normalize_title, Difficulty, Recommendation, RecommendationId, RecommendationSource,
    MIN_ROI_MONTHS,
};
use crate::errors::AiSourceError;
use crate::scoring::clamp_priority;

pub use service::{HybridOutcome, RecommendationService};

/// Confidence attached to every AI-sourced recommendation.
pub const AI_CONFIDENCE: f64 = 0.7;

/// Input handed to the AI collaborator. Prompt construction is the collaborator's concern.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AiRecommendationRequest {
    pub profile: BusinessProfile,
    pub previous_recommendations: Vec<String>,
}

/// A candidate as returned by the AI collaborator, before normalization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AiRecommendation {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub estimated_cost_savings: f64,
    pub estimated_co2_reduction: f64,
    pub roi_months: i64,
    pub difficulty: String,
    pub priority_score: f64,
    pub implementation_steps: Vec<String>,
    pub reasoning: String,
}

impl AiRecommendation {
    /// Normalizes into a [`Recommendation`]: priority clamped to [0.1, 1.0], ROI at least 6.
    pub fn into_recommendation(self, position: usize) -> Recommendation {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("ai-rec-{}", position + 1));
        let roi_months =
            u32::try_from(self.roi_months.max(0)).unwrap_or(u32::MAX).max(MIN_ROI_MONTHS);
        let finite_or_zero = |value: f64| if value.is_finite() { value } else { 0.0 };

        Recommendation {
            id: RecommendationId(id),
            title: self.title.trim().to_owned(),
            description: self.description,
            category: self.category,
            estimated_cost_savings: finite_or_zero(self.estimated_cost_savings),
            estimated_co2_reduction: finite_or_zero(self.estimated_co2_reduction),
            roi_months,
            difficulty: Difficulty::parse_lenient(&self.difficulty),
            priority_score: clamp_priority(self.priority_score),
            source: RecommendationSource::Ai,
            confidence: AI_CONFIDENCE,
            implementation_steps: self.implementation_steps,
            reasoning: Some(self.reasoning).filter(|reasoning| !reasoning.trim().is_empty()),
        }
    }
}

/// Availability report surfaced by health checks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSourceStatus {
    pub configured: bool,
    pub provider: String,
    pub model: Option<String>,
}

#[async_trait]
pub trait AiRecommendationSource: Send + Sync {
    async fn recommend(
        &self,
        request: &AiRecommendationRequest,
    ) -> Result<Vec<AiRecommendation>, AiSourceError>;

    fn status(&self) -> AiSourceStatus;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergeOutcome {
    pub recommendations: Vec<Recommendation>,
    /// Entries dropped because the user already holds a recommendation with that title.
    pub suppressed: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HybridMerger;

impl HybridMerger {
    pub fn new() -> Self {
        Self
    }

    /// Suppresses previously seen titles, lets AI entries replace rule entries with the
    /// same normalized title, and sorts by descending priority.
    ///
    /// Pre-sort order is rule order (with in-place AI replacements) followed by new AI
    /// entries; the stable sort keeps that order among equal scores.
    pub fn merge<S: AsRef<str>>(
        &self,
        rule_recommendations: Vec<Recommendation>,
        ai_recommendations: Vec<Recommendation>,
        existing_titles: &[S],
    ) -> MergeOutcome {
        let existing = existing_titles
            .iter()
            .map(|title| normalize_title(title.as_ref()))
            .collect::<HashSet<_>>();
        let mut suppressed = 0;
        let mut keep = |recommendation: &Recommendation| {
            let fresh = !existing.contains(&recommendation.normalized_title());
            if !fresh {
                suppressed += 1;
            }
            fresh
        };

        let rules = rule_recommendations.into_iter().filter(&mut keep).collect::<Vec<_>>();
        let ai = ai_recommendations.into_iter().filter(&mut keep).collect::<Vec<_>>();

        let mut merged: Vec<Recommendation> = Vec::with_capacity(rules.len() + ai.len());
        let mut positions: HashMap<String, usize> = HashMap::new();
        for recommendation in rules {
            let key = recommendation.normalized_title();
            if positions.contains_key(&key) {
                continue;
            }
            positions.insert(key, merged.len());
            merged.push(recommendation);
        }

        let mut replaced = HashSet::new();
        for recommendation in ai {
            let key = recommendation.normalized_title();
            if !replaced.insert(key.clone()) {
                continue;
            }
            match positions.get(&key) {
                Some(&index) => merged[index] = recommendation,
                None => merged.push(recommendation),
            }
        }

        merged.sort_by(|left, right| right.priority_score.total_cmp(&left.priority_score));
        MergeOutcome { recommendations: merged, suppressed }
    }
}
