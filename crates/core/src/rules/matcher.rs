use std::collections::BTreeSet;

use crate::classifier::{
    categorize_company_size, categorize_goals, categorize_industry, CompanySize, GoalCategory,
    IndustryType,
};
use crate::domain::profile::BusinessProfile;
use crate::rules::{RecommendationRule, UsageBounds};

/// Closed-enum view of a profile's free-text fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedProfile {
    pub industry: IndustryType,
    pub size: CompanySize,
    pub goals: BTreeSet<GoalCategory>,
}

impl ClassifiedProfile {
    pub fn classify(profile: &BusinessProfile) -> Self {
        Self {
            industry: categorize_industry(&profile.industry),
            size: categorize_company_size(&profile.company_size),
            goals: categorize_goals(&profile.sustainability_goals),
        }
    }
}

/// Conjunction of every constraint present on the rule.
pub fn is_applicable(
    rule: &RecommendationRule,
    monthly_kwh: f64,
    monthly_therms: f64,
    classified: &ClassifiedProfile,
) -> bool {
    within_bounds(&rule.bounds, monthly_kwh, monthly_therms)
        && (rule.industries.is_empty() || rule.industries.contains(&classified.industry))
        && (rule.sizes.is_empty() || rule.sizes.contains(&classified.size))
        && (rule.required_goals.is_empty()
            || rule.required_goals.iter().any(|goal| classified.goals.contains(goal)))
}

fn within_bounds(bounds: &UsageBounds, monthly_kwh: f64, monthly_therms: f64) -> bool {
    bounds.min_kwh.map_or(true, |min| monthly_kwh >= min)
        && bounds.max_kwh.map_or(true, |max| monthly_kwh <= max)
        && bounds.min_therms.map_or(true, |min| monthly_therms >= min)
        && bounds.max_therms.map_or(true, |max| monthly_therms <= max)
}
