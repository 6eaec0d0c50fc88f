use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::domain::profile::ProfileInput;
use crate::domain::recommendation::{
    Recommendation, RecommendationId, RecommendationStatus, RecommendationTotals,
};
use crate::domain::UserId;
use crate::errors::ApplicationError;
use crate::hybrid::{AiRecommendationRequest, AiRecommendationSource, HybridMerger};
use crate::rules::RuleEngine;
use crate::store::RecommendationStore;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HybridOutcome {
    pub recommendations: Vec<Recommendation>,
    /// False when the AI branch failed and only rule output was merged.
    pub ai_available: bool,
    pub suppressed: usize,
    pub totals: RecommendationTotals,
}

/// Generates, merges and persists recommendations for a user.
#[derive(Clone)]
pub struct RecommendationService {
    engine: Arc<RuleEngine>,
    ai_source: Arc<dyn AiRecommendationSource>,
    store: Arc<dyn RecommendationStore>,
    merger: HybridMerger,
}

impl RecommendationService {
    pub fn new(
        engine: Arc<RuleEngine>,
        ai_source: Arc<dyn AiRecommendationSource>,
        store: Arc<dyn RecommendationStore>,
    ) -> Self {
        Self { engine, ai_source, store, merger: HybridMerger::new() }
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn ai_source(&self) -> &dyn AiRecommendationSource {
        self.ai_source.as_ref()
    }

    /// Looks up one of the user's stored recommendations regardless of its status.
    pub async fn find_for_user(
        &self,
        user_id: &UserId,
        recommendation_id: &RecommendationId,
    ) -> Result<Recommendation, ApplicationError> {
        self.store
            .list_for_user(user_id, &[])
            .await?
            .into_iter()
            .map(|stored| stored.recommendation)
            .find(|recommendation| &recommendation.id == recommendation_id)
            .ok_or_else(|| {
                ApplicationError::NotFound(format!(
                    "recommendation {} for user {}",
                    recommendation_id.0, user_id
                ))
            })
    }

    /// AI failure degrades to rule-only output; a failed save persists nothing and fails the call.
    pub async fn generate(
        &self,
        user_id: &UserId,
        input: ProfileInput,
        correlation_id: &str,
    ) -> Result<HybridOutcome, ApplicationError> {
        let profile = input.validate()?;

        let existing_titles = self
            .store
            .list_for_user(user_id, RecommendationStatus::suppressing())
            .await?
            .into_iter()
            .map(|stored| stored.recommendation.title)
            .collect::<Vec<_>>();

        let rule_recommendations = self.engine.generate_or_fallback(&profile);
        let rule_count = rule_recommendations.len();

        let request =
            AiRecommendationRequest { profile, previous_recommendations: existing_titles.clone() };
        let (ai_recommendations, ai_available) = match self.ai_source.recommend(&request).await {
            Ok(candidates) => (
                candidates
                    .into_iter()
                    .enumerate()
                    .map(|(position, candidate)| candidate.into_recommendation(position))
                    .collect::<Vec<_>>(),
                true,
            ),
            Err(source_error) => {
                warn!(
                    event_name = "recommendations.ai.unavailable",
                    correlation_id,
                    user_id = %user_id,
                    error = %source_error,
                    "ai recommendation branch failed; continuing with rule output"
                );
                (Vec::new(), false)
            }
        };
        let ai_count = ai_recommendations.len();

        let outcome = self.merger.merge(rule_recommendations, ai_recommendations, &existing_titles);
        info!(
            event_name = "recommendations.hybrid.merged",
            correlation_id,
            user_id = %user_id,
            rule_count,
            ai_count,
            suppressed = outcome.suppressed,
            merged_count = outcome.recommendations.len(),
            ai_available,
            "hybrid recommendations merged"
        );

        if let Err(store_error) = self.store.save_batch(user_id, &outcome.recommendations).await {
            error!(
                event_name = "recommendations.persistence.save_failed",
                correlation_id,
                user_id = %user_id,
                error = %store_error,
                "failed to persist recommendation batch"
            );
            return Err(store_error.into());
        }

        let totals = RecommendationTotals::from_recommendations(&outcome.recommendations);
        Ok(HybridOutcome {
            recommendations: outcome.recommendations,
            ai_available,
            suppressed: outcome.suppressed,
            totals,
        })
    }
}
