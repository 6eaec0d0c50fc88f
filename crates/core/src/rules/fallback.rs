use crate::calculator::{round_to, LBS_PER_TON, RULE_PATH_ELECTRICITY_LBS_PER_KWH};
use crate::domain::profile::BusinessProfile;
use crate::domain::recommendation::{
    Difficulty, Recommendation, RecommendationId, RecommendationSource,
};
use crate::rules::RULE_CONFIDENCE;

const FALLBACK_ELECTRICITY_RATE: f64 = 0.12;
const LED_FALLBACK_MIN_KWH: f64 = 800.0;

/// Minimal recommendation set used when the catalog produces nothing.
pub fn fallback_recommendations(profile: &BusinessProfile) -> Vec<Recommendation> {
    let kwh = profile.monthly_kwh;
    let mut recommendations = Vec::with_capacity(2);

    if kwh > LED_FALLBACK_MIN_KWH {
        recommendations.push(fallback(
            "led-retrofit-fallback",
            "LED Lighting Retrofit",
            "Replace traditional lighting with energy-efficient LED bulbs",
            "Energy Efficiency",
            kwh * 0.25,
            18,
            0.8,
        ));
    }

    recommendations.push(fallback(
        "energy-audit-fallback",
        "Professional Energy Audit",
        "Comprehensive assessment to identify energy savings opportunities",
        "Assessment",
        kwh * 0.10,
        6,
        0.9,
    ));

    recommendations
}

fn fallback(
    id: &str,
    title: &str,
    description: &str,
    category: &str,
    monthly_kwh_saved: f64,
    roi_months: u32,
    priority_score: f64,
) -> Recommendation {
    Recommendation {
        id: RecommendationId(id.to_owned()),
        title: title.to_owned(),
        description: description.to_owned(),
        category: category.to_owned(),
        estimated_cost_savings: round_to(monthly_kwh_saved * FALLBACK_ELECTRICITY_RATE * 12.0, 2),
        estimated_co2_reduction: round_to(
            monthly_kwh_saved * RULE_PATH_ELECTRICITY_LBS_PER_KWH * 12.0 / LBS_PER_TON,
            3,
        ),
        roi_months,
        difficulty: Difficulty::Easy,
        priority_score,
        source: RecommendationSource::Rules,
        confidence: RULE_CONFIDENCE,
        implementation_steps: Vec::new(),
        reasoning: None,
    }
}

#[cfg(test)]
mod tests {
    use super::fallback_recommendations;
    use crate::domain::profile::BusinessProfile;

    #[test]
    fn low_usage_gets_only_the_audit() {
        let profile = BusinessProfile::new("", "", "", 500.0, 0.0).expect("profile");
        let recommendations = fallback_recommendations(&profile);

        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].title, "Professional Energy Audit");
        assert_eq!(recommendations[0].estimated_cost_savings, 72.0);
    }

    #[test]
    fn led_fallback_uses_rule_path_constants() {
        let profile = BusinessProfile::new("", "", "", 1_000.0, 0.0).expect("profile");
        let recommendations = fallback_recommendations(&profile);

        assert_eq!(recommendations.len(), 2);
        assert_eq!(recommendations[0].estimated_cost_savings, 360.0);
        assert_eq!(recommendations[0].estimated_co2_reduction, 1.38);
    }
}
