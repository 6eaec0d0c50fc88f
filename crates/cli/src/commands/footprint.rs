use std::path::Path;

use greenpath_core::calculator::regional::{
    CarbonFootprint, EnergyCosts, EnvironmentalEquivalents, SolarPotential,
};
use greenpath_core::{EnergyUsage, RegionalCalculator, SimpleFootprint};
use serde::Serialize;

use crate::commands::{read_profile, CommandResult};

const COMMAND: &str = "footprint";
/// Share of the floor area assumed usable for panels.
const ROOF_FRACTION: f64 = 0.6;

#[derive(Debug, Serialize)]
struct FootprintReport {
    location: String,
    baseline: SimpleFootprint,
    regional: CarbonFootprint,
    costs: EnergyCosts,
    equivalents: EnvironmentalEquivalents,
    #[serde(skip_serializing_if = "Option::is_none")]
    solar: Option<SolarPotential>,
}

pub fn run(profile_path: &Path, facility_sqft: Option<f64>) -> CommandResult {
    let input = match read_profile(COMMAND, profile_path) {
        Ok(input) => input,
        Err(result) => return result,
    };
    let profile = match input.validate() {
        Ok(profile) => profile,
        Err(error) => return CommandResult::failure(COMMAND, "validation", error.to_string(), 2),
    };

    if let Some(sqft) = facility_sqft {
        if !sqft.is_finite() || sqft <= 0.0 {
            return CommandResult::failure(
                COMMAND,
                "validation",
                format!("facility_sqft must be a positive number (got {sqft})"),
                2,
            );
        }
    }

    let calculator = RegionalCalculator::new();
    let usage = EnergyUsage::new(profile.monthly_kwh, profile.monthly_therms);
    let regional = calculator.carbon_footprint(&usage, &profile.location);
    let report = FootprintReport {
        location: profile.location.clone(),
        baseline: SimpleFootprint::calculate(profile.monthly_kwh, profile.monthly_therms),
        regional,
        costs: calculator.energy_costs(&usage, &profile.location),
        equivalents: calculator.environmental_equivalents(regional.annual_co2_tons),
        solar: facility_sqft
            .map(|sqft| calculator.solar_potential(sqft, &profile.location, ROOF_FRACTION)),
    };

    let message = format!("annual footprint {:.2} tons co2", report.regional.annual_co2_tons);
    match serde_json::to_value(&report) {
        Ok(data) => CommandResult::success_with_data(COMMAND, message, Some(data)),
        Err(error) => CommandResult::failure(COMMAND, "serialization", error.to_string(), 1),
    }
}
