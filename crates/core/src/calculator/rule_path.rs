use serde::{Deserialize, Serialize};

use crate::calculator::{
    net_present_value, roi_months, RULE_PATH_ELECTRICITY_LBS_PER_KWH,
    RULE_PATH_GAS_LBS_PER_THERM, RULE_PATH_GAS_RATE_PER_THERM,
};
use crate::domain::profile::BusinessProfile;
use crate::rules::RecommendationRule;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleFactorKind {
    ElectricityRate,
    SolarPotential,
    HeatingFactor,
}

type RegionTable = &'static [(&'static str, f64)];

const ELECTRICITY_RATE: RegionTable = &[
    ("california", 0.20),
    ("new york", 0.18),
    ("massachusetts", 0.22),
    ("texas", 0.12),
    ("florida", 0.11),
    ("illinois", 0.13),
];

const SOLAR_POTENTIAL: RegionTable = &[
    ("arizona", 1.4),
    ("california", 1.3),
    ("nevada", 1.3),
    ("texas", 1.2),
    ("florida", 1.1),
    ("north carolina", 1.0),
    ("new york", 0.8),
    ("washington", 0.7),
];

const HEATING_FACTOR: RegionTable = &[
    ("alaska", 2.0),
    ("minnesota", 1.8),
    ("wisconsin", 1.6),
    ("michigan", 1.5),
    ("new york", 1.3),
    ("illinois", 1.3),
    ("california", 0.6),
    ("florida", 0.3),
    ("texas", 0.7),
];

/// Rule-path regional adjustment tables with their `default` values.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleRegionalFactors {
    electricity_rate: (RegionTable, f64),
    solar_potential: (RegionTable, f64),
    heating_factor: (RegionTable, f64),
}

impl Default for RuleRegionalFactors {
    fn default() -> Self {
        Self {
            electricity_rate: (ELECTRICITY_RATE, 0.12),
            solar_potential: (SOLAR_POTENTIAL, 1.0),
            heating_factor: (HEATING_FACTOR, 1.0),
        }
    }
}

impl RuleRegionalFactors {
    /// First region whose name is a substring of the lower-cased location, else the default.
    pub fn factor(&self, kind: RuleFactorKind, location: &str) -> f64 {
        let (table, default) = match kind {
            RuleFactorKind::ElectricityRate => self.electricity_rate,
            RuleFactorKind::SolarPotential => self.solar_potential,
            RuleFactorKind::HeatingFactor => self.heating_factor,
        };
        let location = location.to_lowercase();
        table
            .iter()
            .find(|(region, _)| location.contains(region))
            .map_or(default, |(_, factor)| *factor)
    }
}

/// Unrounded outputs of pricing a single rule against a profile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleImpact {
    pub annual_electricity_cost: f64,
    pub annual_gas_cost: f64,
    pub estimated_savings: f64,
    /// Pounds of CO2 per year.
    pub estimated_co2_reduction: f64,
    pub implementation_cost: f64,
    pub roi_months: u32,
    pub net_present_value: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RulePathCalculator {
    regions: RuleRegionalFactors,
}

impl RulePathCalculator {
    pub fn new(regions: RuleRegionalFactors) -> Self {
        Self { regions }
    }

    pub fn regions(&self) -> &RuleRegionalFactors {
        &self.regions
    }

    pub fn annual_electricity_cost(&self, profile: &BusinessProfile) -> f64 {
        let rate = self.regions.factor(RuleFactorKind::ElectricityRate, &profile.location);
        profile.monthly_kwh * 12.0 * rate
    }

    pub fn annual_gas_cost(&self, profile: &BusinessProfile) -> f64 {
        profile.monthly_therms * 12.0 * RULE_PATH_GAS_RATE_PER_THERM
    }

    pub fn annual_co2_lbs(&self, profile: &BusinessProfile) -> f64 {
        (profile.monthly_kwh * RULE_PATH_ELECTRICITY_LBS_PER_KWH
            + profile.monthly_therms * RULE_PATH_GAS_LBS_PER_THERM)
            * 12.0
    }

    pub fn estimate(&self, rule: &RecommendationRule, profile: &BusinessProfile) -> RuleImpact {
        let annual_electricity_cost = self.annual_electricity_cost(profile);
        let annual_gas_cost = self.annual_gas_cost(profile);
        let estimated_savings =
            (annual_electricity_cost + annual_gas_cost) * rule.cost_savings_factor;
        let estimated_co2_reduction = self.annual_co2_lbs(profile) * rule.co2_reduction_factor;
        let implementation_cost = estimated_savings * rule.implementation_cost_factor;

        RuleImpact {
            annual_electricity_cost,
            annual_gas_cost,
            estimated_savings,
            estimated_co2_reduction,
            implementation_cost,
            roi_months: roi_months(implementation_cost, estimated_savings, rule.base_roi_months),
            net_present_value: net_present_value(implementation_cost, estimated_savings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RuleFactorKind, RulePathCalculator, RuleRegionalFactors};
    use crate::domain::profile::BusinessProfile;
    use crate::rules::RuleCatalog;

    #[test]
    fn regional_lookup_uses_first_substring_match() {
        let factors = RuleRegionalFactors::default();
        assert_eq!(factors.factor(RuleFactorKind::ElectricityRate, "Oakland, California"), 0.20);
        assert_eq!(factors.factor(RuleFactorKind::ElectricityRate, "Boise, Idaho"), 0.12);
        assert_eq!(factors.factor(RuleFactorKind::HeatingFactor, "Buffalo, New York"), 1.3);
        assert_eq!(factors.factor(RuleFactorKind::SolarPotential, "PHOENIX, ARIZONA"), 1.4);
        assert_eq!(factors.factor(RuleFactorKind::SolarPotential, ""), 1.0);
    }

    #[test]
    fn led_rule_in_texas() {
        let catalog = RuleCatalog::standard();
        let rule = catalog.get("led_retrofit_basic").expect("led rule");
        let profile = BusinessProfile::new("Retail", "small", "Austin, Texas", 2_000.0, 100.0)
            .expect("profile");

        let impact = RulePathCalculator::default().estimate(rule, &profile);

        // (2000 * 12 * 0.12 + 100 * 12 * 1.20) * 0.25
        assert!((impact.estimated_savings - 1_080.0).abs() < 1e-9);
        // (2000 * 0.92 + 100 * 11.7) * 12 * 0.25
        assert!((impact.estimated_co2_reduction - 9_030.0).abs() < 1e-9);
        assert_eq!(impact.roi_months, 12);
        assert!(impact.net_present_value > 0.0);
    }

    #[test]
    fn zero_usage_falls_back_to_base_roi() {
        let catalog = RuleCatalog::standard();
        let rule = catalog.get("solar_installation").expect("solar rule");
        let profile = BusinessProfile::new("", "", "", 0.0, 0.0).expect("profile");

        let impact = RulePathCalculator::default().estimate(rule, &profile);
        assert_eq!(impact.estimated_savings, 0.0);
        assert_eq!(impact.roi_months, 60);
    }
}
