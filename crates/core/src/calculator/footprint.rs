use serde::{Deserialize, Serialize};

use crate::calculator::{
    round_to, LBS_PER_TON, RULE_PATH_ELECTRICITY_LBS_PER_KWH, RULE_PATH_GAS_LBS_PER_THERM,
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FootprintBreakdown {
    pub electricity_co2_lbs: f64,
    pub gas_co2_lbs: f64,
}

/// Baseline footprint with the fixed rule-path emission factors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimpleFootprint {
    pub monthly_co2_lbs: f64,
    pub annual_co2_lbs: f64,
    pub annual_co2_tons: f64,
    pub breakdown: FootprintBreakdown,
}

impl SimpleFootprint {
    pub fn calculate(monthly_kwh: f64, monthly_therms: f64) -> Self {
        let electricity = monthly_kwh * RULE_PATH_ELECTRICITY_LBS_PER_KWH;
        let gas = monthly_therms * RULE_PATH_GAS_LBS_PER_THERM;
        let monthly = electricity + gas;
        let annual = monthly * 12.0;

        Self {
            monthly_co2_lbs: round_to(monthly, 2),
            annual_co2_lbs: round_to(annual, 2),
            annual_co2_tons: round_to(annual / LBS_PER_TON, 2),
            breakdown: FootprintBreakdown {
                electricity_co2_lbs: round_to(electricity, 2),
                gas_co2_lbs: round_to(gas, 2),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SimpleFootprint;

    #[test]
    fn footprint_from_electricity_and_gas() {
        let footprint = SimpleFootprint::calculate(1_000.0, 100.0);

        assert_eq!(footprint.breakdown.electricity_co2_lbs, 920.0);
        assert_eq!(footprint.breakdown.gas_co2_lbs, 1_170.0);
        assert_eq!(footprint.monthly_co2_lbs, 2_090.0);
        assert_eq!(footprint.annual_co2_lbs, 25_080.0);
        assert_eq!(footprint.annual_co2_tons, 12.54);
    }

    #[test]
    fn zero_usage_has_zero_footprint() {
        let footprint = SimpleFootprint::calculate(0.0, 0.0);
        assert_eq!(footprint.annual_co2_tons, 0.0);
    }
}
