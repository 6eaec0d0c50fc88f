//! Absolute footprint, cost and investment reporting with regional data.

use serde::{Deserialize, Serialize};

use crate::calculator::{net_present_value, round_to, LBS_PER_TON};
use crate::domain::recommendation::Difficulty;

/// kBtu per therm, used to put gas on the same footing as kWh for the blended rate.
const THERM_TO_KWH_EQUIVALENT: f64 = 3.412;
/// Installed photovoltaic density, watts per square foot of usable roof.
const SOLAR_WATTS_PER_SQFT: f64 = 7.0;
const SOLAR_INSTALLED_COST_PER_KW: f64 = 2_500.0;
pub const DEFAULT_ROOF_FRACTION: f64 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionalFactors {
    /// $/kWh
    pub electricity_rate: f64,
    /// $/therm
    pub gas_rate: f64,
    /// lbs CO2/kWh
    pub co2_emission_factor: f64,
    /// lbs CO2/therm
    pub gas_emission_factor: f64,
    /// kWh per installed kW per year
    pub solar_potential: f64,
    pub heating_degree_days: f64,
    pub cooling_degree_days: f64,
    pub utility_rebate_multiplier: f64,
    pub labor_cost_multiplier: f64,
}

const REGIONS: &[(&str, RegionalFactors)] = &[
    (
        "california",
        RegionalFactors {
            electricity_rate: 0.2245,
            gas_rate: 1.35,
            co2_emission_factor: 0.651,
            gas_emission_factor: 11.7,
            solar_potential: 1_850.0,
            heating_degree_days: 1_500.0,
            cooling_degree_days: 1_200.0,
            utility_rebate_multiplier: 1.4,
            labor_cost_multiplier: 1.3,
        },
    ),
    (
        "texas",
        RegionalFactors {
            electricity_rate: 0.1189,
            gas_rate: 1.12,
            co2_emission_factor: 0.995,
            gas_emission_factor: 11.7,
            solar_potential: 1_650.0,
            heating_degree_days: 1_600.0,
            cooling_degree_days: 2_800.0,
            utility_rebate_multiplier: 0.8,
            labor_cost_multiplier: 0.9,
        },
    ),
    (
        "new york",
        RegionalFactors {
            electricity_rate: 0.1825,
            gas_rate: 1.48,
            co2_emission_factor: 0.578,
            gas_emission_factor: 11.7,
            solar_potential: 1_300.0,
            heating_degree_days: 4_800.0,
            cooling_degree_days: 900.0,
            utility_rebate_multiplier: 1.2,
            labor_cost_multiplier: 1.4,
        },
    ),
    (
        "florida",
        RegionalFactors {
            electricity_rate: 0.1147,
            gas_rate: 1.25,
            co2_emission_factor: 0.892,
            gas_emission_factor: 11.7,
            solar_potential: 1_800.0,
            heating_degree_days: 600.0,
            cooling_degree_days: 3_500.0,
            utility_rebate_multiplier: 0.9,
            labor_cost_multiplier: 0.95,
        },
    ),
];

/// US averages.
const DEFAULT_REGION: RegionalFactors = RegionalFactors {
    electricity_rate: 0.1378,
    gas_rate: 1.28,
    co2_emission_factor: 0.855,
    gas_emission_factor: 11.7,
    solar_potential: 1_500.0,
    heating_degree_days: 3_000.0,
    cooling_degree_days: 1_500.0,
    utility_rebate_multiplier: 1.0,
    labor_cost_multiplier: 1.0,
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndustryFactors {
    /// kWh per square foot per year
    pub energy_intensity: f64,
    pub hvac_share: f64,
    pub lighting_share: f64,
    pub equipment_share: f64,
    pub typical_utilization: f64,
    pub peak_demand_factor: f64,
    pub seasonal_variation: f64,
}

const INDUSTRIES: &[(&str, IndustryFactors)] = &[
    (
        "technology",
        IndustryFactors {
            energy_intensity: 15.2,
            hvac_share: 0.45,
            lighting_share: 0.25,
            equipment_share: 0.30,
            typical_utilization: 0.65,
            peak_demand_factor: 0.7,
            seasonal_variation: 0.15,
        },
    ),
    (
        "manufacturing",
        IndustryFactors {
            energy_intensity: 28.5,
            hvac_share: 0.25,
            lighting_share: 0.15,
            equipment_share: 0.60,
            typical_utilization: 0.85,
            peak_demand_factor: 0.9,
            seasonal_variation: 0.10,
        },
    ),
    (
        "retail",
        IndustryFactors {
            energy_intensity: 14.1,
            hvac_share: 0.40,
            lighting_share: 0.35,
            equipment_share: 0.25,
            typical_utilization: 0.55,
            peak_demand_factor: 0.6,
            seasonal_variation: 0.25,
        },
    ),
    (
        "healthcare",
        IndustryFactors {
            energy_intensity: 31.8,
            hvac_share: 0.50,
            lighting_share: 0.20,
            equipment_share: 0.30,
            typical_utilization: 0.95,
            peak_demand_factor: 0.85,
            seasonal_variation: 0.05,
        },
    ),
];

const DEFAULT_INDUSTRY: IndustryFactors = IndustryFactors {
    energy_intensity: 18.5,
    hvac_share: 0.40,
    lighting_share: 0.25,
    equipment_share: 0.35,
    typical_utilization: 0.70,
    peak_demand_factor: 0.75,
    seasonal_variation: 0.20,
};

/// Metered usage plus optional tariff overrides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyUsage {
    pub monthly_kwh: f64,
    pub monthly_therms: f64,
    /// $/kWh, overrides the regional rate
    #[serde(default)]
    pub electricity_rate: Option<f64>,
    /// $/therm, overrides the regional rate
    #[serde(default)]
    pub gas_rate: Option<f64>,
    /// $/kW
    #[serde(default)]
    pub demand_charge: Option<f64>,
    #[serde(default)]
    pub peak_demand_kw: Option<f64>,
}

impl EnergyUsage {
    pub fn new(monthly_kwh: f64, monthly_therms: f64) -> Self {
        Self { monthly_kwh, monthly_therms, ..Self::default() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarbonFootprint {
    pub annual_co2_tons: f64,
    pub monthly_co2_tons: f64,
    /// Monthly electricity emissions, lbs.
    pub electricity_co2_lbs: f64,
    /// Monthly gas emissions, lbs.
    pub gas_co2_lbs: f64,
    pub total_co2_lbs: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnergyCosts {
    pub annual_electricity_cost: f64,
    pub annual_gas_cost: f64,
    pub annual_demand_cost: f64,
    pub total_annual_cost: f64,
    pub monthly_electricity_cost: f64,
    pub monthly_gas_cost: f64,
    /// Blended $/kWh-equivalent; zero when there is no usage.
    pub average_rate: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvestmentReturn {
    pub annual_savings: f64,
    /// `None` when the measure never pays back.
    pub payback_months: Option<f64>,
    pub net_present_value: f64,
    /// Simplified first-year return, percent.
    pub internal_rate_of_return: f64,
    pub break_even_year: Option<f64>,
    pub co2_reduction_tons: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentalEquivalents {
    pub trees_planted: u64,
    pub cars_off_road: u64,
    pub homes_powered: u64,
    pub gallons_gasoline_saved: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolarPotential {
    pub system_size_kw: f64,
    pub annual_generation_kwh: f64,
    pub annual_savings: f64,
    pub estimated_cost: f64,
    pub payback_years: Option<f64>,
    pub co2_offset_tons: f64,
}

/// Input to [`RegionalCalculator::priority_score`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FootprintPriorityInput {
    pub roi_months: f64,
    pub annual_savings: f64,
    pub co2_reduction_tons: f64,
    pub difficulty: Difficulty,
    pub monthly_kwh: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegionalCalculator;

impl RegionalCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn regional_factors(&self, location: &str) -> &'static RegionalFactors {
        let location = location.to_lowercase();
        REGIONS
            .iter()
            .find(|(region, _)| location.contains(region))
            .map_or(&DEFAULT_REGION, |(_, factors)| factors)
    }

    pub fn industry_factors(&self, industry: &str) -> &'static IndustryFactors {
        let industry = industry.to_lowercase();
        INDUSTRIES
            .iter()
            .find(|(name, _)| industry.contains(name))
            .map_or(&DEFAULT_INDUSTRY, |(_, factors)| factors)
    }

    pub fn carbon_footprint(&self, usage: &EnergyUsage, location: &str) -> CarbonFootprint {
        let factors = self.regional_factors(location);
        let electricity_lbs = usage.monthly_kwh * factors.co2_emission_factor;
        let gas_lbs = usage.monthly_therms * factors.gas_emission_factor;
        let monthly_lbs = electricity_lbs + gas_lbs;

        CarbonFootprint {
            annual_co2_tons: round_to(monthly_lbs * 12.0 / LBS_PER_TON, 2),
            monthly_co2_tons: round_to(monthly_lbs / LBS_PER_TON, 2),
            electricity_co2_lbs: round_to(electricity_lbs, 2),
            gas_co2_lbs: round_to(gas_lbs, 2),
            total_co2_lbs: round_to(monthly_lbs * 12.0, 2),
        }
    }

    pub fn energy_costs(&self, usage: &EnergyUsage, location: &str) -> EnergyCosts {
        let factors = self.regional_factors(location);
        let electricity_rate = usage.electricity_rate.unwrap_or(factors.electricity_rate);
        let gas_rate = usage.gas_rate.unwrap_or(factors.gas_rate);

        let monthly_electricity = usage.monthly_kwh * electricity_rate;
        let monthly_gas = usage.monthly_therms * gas_rate;
        let monthly_demand = match (usage.demand_charge, usage.peak_demand_kw) {
            (Some(charge), Some(peak)) => charge * peak,
            _ => 0.0,
        };
        let total_annual = (monthly_electricity + monthly_gas + monthly_demand) * 12.0;
        let annual_equivalent_kwh =
            (usage.monthly_kwh + usage.monthly_therms * THERM_TO_KWH_EQUIVALENT) * 12.0;
        let average_rate =
            if annual_equivalent_kwh > 0.0 { total_annual / annual_equivalent_kwh } else { 0.0 };

        EnergyCosts {
            annual_electricity_cost: round_to(monthly_electricity * 12.0, 2),
            annual_gas_cost: round_to(monthly_gas * 12.0, 2),
            annual_demand_cost: round_to(monthly_demand * 12.0, 2),
            total_annual_cost: round_to(total_annual, 2),
            monthly_electricity_cost: round_to(monthly_electricity, 2),
            monthly_gas_cost: round_to(monthly_gas, 2),
            average_rate: round_to(average_rate, 4),
        }
    }

    /// Return on a measure that saves `savings_fraction` of the total energy bill.
    pub fn recommendation_roi(
        &self,
        savings_fraction: f64,
        implementation_cost: f64,
        usage: &EnergyUsage,
        location: &str,
        maintenance_savings: f64,
    ) -> InvestmentReturn {
        let costs = self.energy_costs(usage, location);
        let footprint = self.carbon_footprint(usage, location);

        let annual_savings = costs.total_annual_cost * savings_fraction + maintenance_savings;
        let payback_months =
            (annual_savings > 0.0).then(|| implementation_cost / (annual_savings / 12.0));
        let internal_rate_of_return = if implementation_cost > 0.0 {
            annual_savings / implementation_cost - 1.0
        } else {
            0.0
        };

        InvestmentReturn {
            annual_savings: round_to(annual_savings, 2),
            payback_months: payback_months.map(|months| round_to(months, 1)),
            net_present_value: round_to(net_present_value(implementation_cost, annual_savings), 2),
            internal_rate_of_return: round_to(internal_rate_of_return * 100.0, 2),
            break_even_year: payback_months.map(|months| round_to(months / 12.0, 1)),
            co2_reduction_tons: round_to(footprint.annual_co2_tons * savings_fraction, 2),
        }
    }

    /// EPA equivalency factors per ton of CO2 avoided.
    pub fn environmental_equivalents(&self, co2_reduction_tons: f64) -> EnvironmentalEquivalents {
        let scaled = |factor: f64| (co2_reduction_tons.max(0.0) * factor).round() as u64;
        EnvironmentalEquivalents {
            trees_planted: scaled(16.5),
            cars_off_road: scaled(0.22),
            homes_powered: scaled(0.18),
            gallons_gasoline_saved: scaled(113.0),
        }
    }

    pub fn solar_potential(
        &self,
        facility_sqft: f64,
        location: &str,
        roof_fraction: f64,
    ) -> SolarPotential {
        let factors = self.regional_factors(location);
        let system_size_kw = facility_sqft * roof_fraction * SOLAR_WATTS_PER_SQFT / 1_000.0;
        let annual_generation_kwh = system_size_kw * factors.solar_potential;
        let annual_savings = annual_generation_kwh * factors.electricity_rate;
        let estimated_cost = system_size_kw * SOLAR_INSTALLED_COST_PER_KW;
        let payback_years = (annual_savings > 0.0).then(|| estimated_cost / annual_savings);

        SolarPotential {
            system_size_kw: round_to(system_size_kw, 1),
            annual_generation_kwh: annual_generation_kwh.round(),
            annual_savings: round_to(annual_savings, 2),
            estimated_cost: round_to(estimated_cost, 2),
            payback_years: payback_years.map(|years| round_to(years, 1)),
            co2_offset_tons: round_to(
                annual_generation_kwh * factors.co2_emission_factor / LBS_PER_TON,
                2,
            ),
        }
    }

    /// Reporting-side priority heuristic; independent of the rule-engine scorer.
    pub fn priority_score(&self, input: &FootprintPriorityInput) -> f64 {
        let mut score = 0.5;

        score += match input.roi_months {
            months if months <= 12.0 => 0.25,
            months if months <= 24.0 => 0.15,
            months if months <= 36.0 => 0.05,
            months if months > 60.0 => -0.15,
            _ => 0.0,
        };

        score += match input.annual_savings {
            savings if savings > 20_000.0 => 0.20,
            savings if savings > 10_000.0 => 0.15,
            savings if savings > 5_000.0 => 0.10,
            savings if savings > 2_000.0 => 0.05,
            _ => 0.0,
        };

        score += match input.co2_reduction_tons {
            tons if tons > 50.0 => 0.15,
            tons if tons > 25.0 => 0.10,
            tons if tons > 10.0 => 0.05,
            _ => 0.0,
        };

        score += match input.difficulty {
            Difficulty::Easy => 0.10,
            Difficulty::Medium => 0.0,
            Difficulty::Hard => -0.10,
        };

        if input.monthly_kwh > 10_000.0 {
            score += 0.10;
        }

        round_to(score, 2).clamp(0.1, 1.0)
    }
}
