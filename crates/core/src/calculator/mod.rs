//! Financial and carbon modelling.
//!
//! Two deliberately separate paths exist:
//!
//! - [`rule_path`] prices rule deltas with a regional electricity rate, a fixed
//!   $1.20/therm gas rate and fixed emission factors (0.92 lb/kWh, 11.7 lb/therm).
//! - [`regional`] reports absolute footprints, costs and ROI with per-region gas
//!   rates and grid emission factors.
//!
//! The two disagree on gas cost and grid emissions; rule scores depend on the
//! rule-path constants and must not pick up regional values.

pub mod footprint;
pub mod incentives;
pub mod regional;
pub mod rule_path;

pub const LBS_PER_TON: f64 = 2_000.0;
pub const RULE_PATH_GAS_RATE_PER_THERM: f64 = 1.20;
pub const RULE_PATH_ELECTRICITY_LBS_PER_KWH: f64 = 0.92;
pub const RULE_PATH_GAS_LBS_PER_THERM: f64 = 11.7;
pub const MIN_ROI_MONTHS: u32 = crate::domain::recommendation::MIN_ROI_MONTHS;

pub const NPV_DISCOUNT_RATE: f64 = 0.07;
pub const NPV_ANALYSIS_YEARS: u32 = 10;

/// `-cost + sum(annual_savings / (1 + 7%)^t)` for `t` in 1..=10.
pub fn net_present_value(implementation_cost: f64, annual_savings: f64) -> f64 {
    discounted_cash_flows(implementation_cost, &[annual_savings; NPV_ANALYSIS_YEARS as usize])
}

/// NPV of an arbitrary yearly cash-flow series; the first entry is discounted one period.
pub fn discounted_cash_flows(initial_investment: f64, cash_flows: &[f64]) -> f64 {
    cash_flows.iter().enumerate().fold(-initial_investment, |npv, (index, cash_flow)| {
        npv + cash_flow / (1.0 + NPV_DISCOUNT_RATE).powi(index as i32 + 1)
    })
}

/// Rule-path payback: `max(6, round(cost / savings * 12))`, or `fallback_months`
/// when there are no savings to recoup the cost with.
pub fn roi_months(implementation_cost: f64, estimated_savings: f64, fallback_months: u32) -> u32 {
    if estimated_savings <= 0.0 || !estimated_savings.is_finite() {
        return fallback_months.max(MIN_ROI_MONTHS);
    }
    let months = (implementation_cost / estimated_savings * 12.0).round();
    if !months.is_finite() || months <= 0.0 {
        return MIN_ROI_MONTHS;
    }
    (months.min(u32::MAX as f64) as u32).max(MIN_ROI_MONTHS)
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10_f64.powi(places);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::{discounted_cash_flows, net_present_value, roi_months, round_to};

    #[test]
    fn npv_discounts_ten_years_at_seven_percent() {
        let npv = net_present_value(10_000.0, 2_000.0);
        // Annuity factor for 10 years at 7% is 7.0236.
        assert!((npv - 4_047.16).abs() < 0.01, "npv = {npv}");
    }

    #[test]
    fn npv_of_explicit_cash_flows() {
        let npv = discounted_cash_flows(1_000.0, &[1_070.0]);
        assert!(npv.abs() < 1e-9);
    }

    #[test]
    fn roi_has_a_six_month_floor() {
        assert_eq!(roi_months(500.0, 4_000.0, 18), 6);
        assert_eq!(roi_months(3_000.0, 1_000.0, 18), 36);
    }

    #[test]
    fn roi_falls_back_without_savings() {
        assert_eq!(roi_months(1_000.0, 0.0, 18), 18);
        assert_eq!(roi_months(1_000.0, -5.0, 2), 6);
    }

    #[test]
    fn rounding_to_cents() {
        assert_eq!(round_to(1_234.5678, 2), 1_234.57);
        assert_eq!(round_to(0.125, 1), 0.1);
    }
}
