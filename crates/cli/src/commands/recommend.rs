use std::path::Path;
use std::sync::Arc;

use greenpath_agent::build_ai_source;
use greenpath_core::{ApplicationError, HybridOutcome, RecommendationService, RuleEngine, UserId};
use greenpath_db::InMemoryRecommendationStore;

use crate::commands::{build_runtime, load_config, read_profile, CommandResult};

const COMMAND: &str = "recommend";

pub fn run(profile_path: &Path, user_id: &str, json: bool) -> CommandResult {
    match generate(profile_path, user_id) {
        Ok(outcome) if json => {
            let message = format!("{} recommendations", outcome.recommendations.len());
            match serde_json::to_value(&outcome) {
                Ok(data) => CommandResult::success_with_data(COMMAND, message, Some(data)),
                Err(error) => {
                    CommandResult::failure(COMMAND, "serialization", error.to_string(), 1)
                }
            }
        }
        Ok(outcome) => CommandResult::text(render(&outcome)),
        Err(result) => result,
    }
}

fn generate(profile_path: &Path, user_id: &str) -> Result<HybridOutcome, CommandResult> {
    let config = load_config(COMMAND)?;
    let input = read_profile(COMMAND, profile_path)?;
    let ai_source = build_ai_source(&config.ai)
        .map_err(|error| CommandResult::failure(COMMAND, "ai_config", error.to_string(), 2))?;
    let runtime = build_runtime(COMMAND)?;

    let service = RecommendationService::new(
        Arc::new(RuleEngine::from_config(&config.engine)),
        ai_source,
        Arc::new(InMemoryRecommendationStore::default()),
    );
    let correlation_id = format!("cli-{}", uuid::Uuid::new_v4());

    runtime
        .block_on(service.generate(&UserId(user_id.to_string()), input, &correlation_id))
        .map_err(|error| match error {
            ApplicationError::Domain(error) => {
                CommandResult::failure(COMMAND, "validation", error.to_string(), 2)
            }
            other => CommandResult::failure(COMMAND, "recommendation", other.to_string(), 1),
        })
}

fn render(outcome: &HybridOutcome) -> String {
    let mut lines = vec![format!(
        "{} recommendations (ai {}), potential savings ${:.2}/yr, co2 reduction {:.2}",
        outcome.recommendations.len(),
        if outcome.ai_available { "available" } else { "unavailable" },
        outcome.totals.total_potential_savings,
        outcome.totals.total_co2_reduction,
    )];
    for (index, recommendation) in outcome.recommendations.iter().enumerate() {
        lines.push(format!(
            "{:>2}. [{:.2}] {} ({}, {}) ${:.0}/yr, payback {} months",
            index + 1,
            recommendation.priority_score,
            recommendation.title,
            recommendation.category,
            recommendation.source.as_str(),
            recommendation.estimated_cost_savings,
            recommendation.roi_months,
        ));
    }
    lines.join("\n")
}
