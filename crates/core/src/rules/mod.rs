//! Conditional recommendation rules and the deterministic rule engine.

pub mod catalog;
pub mod fallback;
pub mod matcher;

use crate::calculator::rule_path::RulePathCalculator;
use crate::classifier::{CompanySize, GoalCategory, IndustryType};
use crate::config::EngineConfig;
use crate::domain::profile::BusinessProfile;
use crate::domain::recommendation::{
    Difficulty, Recommendation, RecommendationId, RecommendationSource,
};
use crate::scoring::{PriorityScorer, ScoreInput};

pub use catalog::RuleCatalog;
pub use matcher::ClassifiedProfile;

/// Default cap on rule-engine output.
pub const DEFAULT_MAX_RULE_RECOMMENDATIONS: usize = 8;
/// Confidence attached to every rule-engine recommendation.
pub const RULE_CONFIDENCE: f64 = 0.9;

/// Optional monthly usage bounds. An absent bound is a wildcard.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UsageBounds {
    pub min_kwh: Option<f64>,
    pub max_kwh: Option<f64>,
    pub min_therms: Option<f64>,
    pub max_therms: Option<f64>,
}

impl UsageBounds {
    pub const NONE: Self =
        Self { min_kwh: None, max_kwh: None, min_therms: None, max_therms: None };

    pub fn is_unbounded(&self) -> bool {
        self.min_kwh.is_none()
            && self.max_kwh.is_none()
            && self.min_therms.is_none()
            && self.max_therms.is_none()
    }
}

/// A static recommendation rule. Empty applicability slices are wildcards.
#[derive(Clone, Debug, PartialEq)]
pub struct RecommendationRule {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub difficulty: Difficulty,
    pub bounds: UsageBounds,
    pub industries: &'static [IndustryType],
    pub sizes: &'static [CompanySize],
    pub required_goals: &'static [GoalCategory],
    pub cost_savings_factor: f64,
    pub co2_reduction_factor: f64,
    pub base_roi_months: u32,
    pub implementation_cost_factor: f64,
    pub base_priority: f64,
}

/// Rule matching, calculation and scoring over a shared, immutable catalog.
#[derive(Clone, Debug)]
pub struct RuleEngine {
    catalog: RuleCatalog,
    calculator: RulePathCalculator,
    scorer: PriorityScorer,
    max_recommendations: usize,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(RuleCatalog::standard(), PriorityScorer::default())
    }
}

impl RuleEngine {
    pub fn new(catalog: RuleCatalog, scorer: PriorityScorer) -> Self {
        Self {
            catalog,
            calculator: RulePathCalculator::default(),
            scorer,
            max_recommendations: DEFAULT_MAX_RULE_RECOMMENDATIONS,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(RuleCatalog::standard(), PriorityScorer::new(config.scoring_variant))
            .with_max_recommendations(config.max_rule_recommendations)
    }

    pub fn with_max_recommendations(mut self, max_recommendations: usize) -> Self {
        self.max_recommendations =
            max_recommendations.clamp(1, crate::config::MAX_RULE_RECOMMENDATIONS_LIMIT);
        self
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn calculator(&self) -> &RulePathCalculator {
        &self.calculator
    }

    /// Rules applicable to the profile, in catalog declaration order.
    pub fn applicable_rules<'a>(
        &'a self,
        profile: &BusinessProfile,
    ) -> impl Iterator<Item = &'a RecommendationRule> + 'a {
        let classified = ClassifiedProfile::classify(profile);
        let kwh = profile.monthly_kwh;
        let therms = profile.monthly_therms;
        self.catalog
            .rules()
            .iter()
            .filter(move |rule| matcher::is_applicable(rule, kwh, therms, &classified))
    }

    /// Scored rule recommendations, best first, capped at the configured maximum.
    ///
    /// Ties keep catalog order, so identical profiles always yield identical output.
    pub fn generate(&self, profile: &BusinessProfile) -> Vec<Recommendation> {
        let mut recommendations = self
            .applicable_rules(profile)
            .map(|rule| self.recommendation_from_rule(rule, profile))
            .collect::<Vec<_>>();

        // `sort_by` is stable.
        recommendations.sort_by(|left, right| right.priority_score.total_cmp(&left.priority_score));
        recommendations.truncate(self.max_recommendations);
        recommendations
    }

    /// Rule output, or the fixed fallback set when no rule applies.
    pub fn generate_or_fallback(&self, profile: &BusinessProfile) -> Vec<Recommendation> {
        let recommendations = self.generate(profile);
        if recommendations.is_empty() {
            tracing::info!(
                event_name = "recommendations.rules.fallback",
                monthly_kwh = profile.monthly_kwh,
                "no catalog rule applied; using fallback recommendations"
            );
            return fallback::fallback_recommendations(profile);
        }
        recommendations
    }

    fn recommendation_from_rule(
        &self,
        rule: &RecommendationRule,
        profile: &BusinessProfile,
    ) -> Recommendation {
        let impact = self.calculator.estimate(rule, profile);
        // The rule path computes pounds; recommendations carry tons like every other source.
        let co2_reduction_tons = impact.estimated_co2_reduction / crate::calculator::LBS_PER_TON;
        let priority_score = self.scorer.score(&ScoreInput {
            base_priority: rule.base_priority,
            roi_months: impact.roi_months,
            estimated_savings: impact.estimated_savings,
            co2_reduction_tons,
            difficulty: rule.difficulty,
            monthly_kwh: profile.monthly_kwh,
        });

        Recommendation {
            id: RecommendationId(rule.id.to_owned()),
            title: rule.title.to_owned(),
            description: rule.description.to_owned(),
            category: rule.category.to_owned(),
            estimated_cost_savings: crate::calculator::round_to(impact.estimated_savings, 2),
            estimated_co2_reduction: crate::calculator::round_to(co2_reduction_tons, 3),
            roi_months: impact.roi_months,
            difficulty: rule.difficulty,
            priority_score,
            source: RecommendationSource::Rules,
            confidence: RULE_CONFIDENCE,
            implementation_steps: Vec::new(),
            reasoning: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RuleCatalog, RuleEngine};
    use crate::domain::profile::BusinessProfile;
    use crate::scoring::{PriorityScorer, ScoringVariant};

    fn tech_profile() -> BusinessProfile {
        BusinessProfile::new("Technology", "51-200 employees", "", 8_500.0, 0.0).expect("profile")
    }

    #[test]
    fn technology_profile_matches_lighting_and_server_rules() {
        let engine = RuleEngine::default();
        let recommendations = engine.generate(&tech_profile());
        let ids = recommendations.iter().map(|rec| rec.id.0.as_str()).collect::<Vec<_>>();

        let led = ids.iter().position(|id| *id == "led_retrofit_basic").expect("led rule");
        let server =
            ids.iter().position(|id| *id == "server_efficiency_tech").expect("server rule");
        assert!(led < server, "equal scores keep catalog order: {ids:?}");
    }

    #[test]
    fn output_is_capped_and_sorted() {
        let engine = RuleEngine::default();
        let recommendations = engine.generate(&tech_profile());

        assert!(recommendations.len() <= 8);
        assert!(recommendations
            .windows(2)
            .all(|pair| pair[0].priority_score >= pair[1].priority_score));
    }

    #[test]
    fn configured_cap_is_respected() {
        let engine = RuleEngine::default().with_max_recommendations(3);
        assert_eq!(engine.generate(&tech_profile()).len(), 3);
    }

    #[test]
    fn cap_never_exceeds_eight() {
        let engine = RuleEngine::default().with_max_recommendations(30);
        let matched = engine.applicable_rules(&tech_profile()).count();
        assert_eq!(engine.generate(&tech_profile()).len(), matched.min(8));
    }

    #[test]
    fn low_usage_profile_only_matches_unbounded_rules() {
        let engine = RuleEngine::default();
        let profile = BusinessProfile::new("", "", "", 100.0, 0.0).expect("profile");

        let matched = engine.applicable_rules(&profile).collect::<Vec<_>>();
        assert!(matched.iter().any(|rule| rule.id == "energy_audit_comprehensive"));
        assert!(matched.iter().all(|rule| rule.bounds.min_kwh.is_none()));
        assert!(matched.len() < engine.catalog().len());
    }

    #[test]
    fn fallback_applies_only_when_nothing_matches() {
        let empty = RuleEngine::new(RuleCatalog::new(Vec::new()), PriorityScorer::default());
        let profile = BusinessProfile::new("Retail", "small", "", 1_000.0, 0.0).expect("profile");

        let recommendations = empty.generate_or_fallback(&profile);
        assert_eq!(recommendations.len(), 2);
        assert!(!RuleEngine::default().generate_or_fallback(&profile).is_empty());
    }

    #[test]
    fn scoring_variant_does_not_change_matches() {
        let basic = RuleEngine::default();
        let extended =
            RuleEngine::new(RuleCatalog::standard(), PriorityScorer::new(ScoringVariant::Extended));
        let profile = BusinessProfile::new("Manufacturing", "large", "Ohio", 4_000.0, 300.0)
            .expect("profile");

        let basic_ids = basic.applicable_rules(&profile).map(|rule| rule.id).collect::<Vec<_>>();
        let extended_ids =
            extended.applicable_rules(&profile).map(|rule| rule.id).collect::<Vec<_>>();
        assert_eq!(basic_ids, extended_ids);
    }
}
