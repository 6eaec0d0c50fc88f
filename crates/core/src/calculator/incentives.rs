use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculator::round_to;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncentiveKind {
    TaxCredit,
    Rebate,
    Grant,
    Loan,
    Deduction,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IncentiveValue {
    PercentOfCost { percent: f64, cap: Option<f64> },
    Flat { amount: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Incentive {
    pub kind: IncentiveKind,
    pub name: &'static str,
    pub value: IncentiveValue,
    pub description: &'static str,
    pub eligibility: &'static [&'static str],
    pub expires_on: Option<NaiveDate>,
    pub application_process: &'static str,
}

impl Incentive {
    /// Eligible when a keyword occurs in the category or the category occurs in a keyword.
    pub fn is_eligible(&self, category: &str) -> bool {
        let category = normalize_category(category);
        !category.is_empty()
            && self
                .eligibility
                .iter()
                .any(|keyword| category.contains(keyword) || keyword.contains(category.as_str()))
    }

    /// Programs without an expiry date never lapse; the expiry day itself still counts.
    pub fn is_active_on(&self, as_of: NaiveDate) -> bool {
        self.expires_on.map_or(true, |expires_on| expires_on >= as_of)
    }

    fn amount(&self, implementation_cost: f64) -> f64 {
        match self.value {
            IncentiveValue::PercentOfCost { percent, cap } => {
                let value = implementation_cost * percent / 100.0;
                cap.map_or(value, |cap| value.min(cap))
            }
            IncentiveValue::Flat { amount } => amount,
        }
    }
}

fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase().replace([' ', '-'], "_")
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IncentiveOptimization {
    pub applicable: Vec<Incentive>,
    pub total_incentive_value: f64,
    pub post_incentive_cost: f64,
    /// Share of the implementation cost covered by incentives, percent.
    pub payback_reduction_percent: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IncentiveTable {
    federal: Vec<Incentive>,
    jurisdictions: Vec<(&'static str, Vec<Incentive>)>,
}

impl Default for IncentiveTable {
    fn default() -> Self {
        Self {
            federal: federal_incentives(),
            jurisdictions: vec![
                ("california", california_incentives()),
                ("texas", texas_incentives()),
            ],
        }
    }
}

impl IncentiveTable {
    /// Federal programs plus those of the first jurisdiction named in `location`,
    /// minus anything that expired before `as_of`.
    pub fn available(&self, location: &str, as_of: NaiveDate) -> impl Iterator<Item = &Incentive> {
        let location = location.to_lowercase();
        let local = self
            .jurisdictions
            .iter()
            .find(|(jurisdiction, _)| location.contains(jurisdiction))
            .map(|(_, incentives)| incentives.as_slice())
            .unwrap_or_default();
        self.federal
            .iter()
            .chain(local.iter())
            .filter(move |incentive| incentive.is_active_on(as_of))
    }

    pub fn optimize(
        &self,
        category: &str,
        implementation_cost: f64,
        location: &str,
        as_of: NaiveDate,
    ) -> IncentiveOptimization {
        let applicable = self
            .available(location, as_of)
            .filter(|incentive| incentive.is_eligible(category))
            .cloned()
            .collect::<Vec<_>>();
        let total =
            applicable.iter().map(|incentive| incentive.amount(implementation_cost)).sum::<f64>();
        let payback_reduction =
            if implementation_cost > 0.0 { total / implementation_cost * 100.0 } else { 0.0 };

        IncentiveOptimization {
            applicable,
            total_incentive_value: round_to(total, 2),
            post_incentive_cost: round_to(implementation_cost - total, 2),
            payback_reduction_percent: round_to(payback_reduction, 1),
        }
    }
}

fn federal_incentives() -> Vec<Incentive> {
    vec![
        Incentive {
            kind: IncentiveKind::TaxCredit,
            name: "Commercial Solar Investment Tax Credit",
            value: IncentiveValue::PercentOfCost { percent: 30.0, cap: None },
            description: "30% federal tax credit for commercial solar installations",
            eligibility: &["solar", "renewable_energy"],
            expires_on: NaiveDate::from_ymd_opt(2032, 12, 31),
            application_process: "File IRS Form 3468 with tax return",
        },
        Incentive {
            kind: IncentiveKind::Deduction,
            name: "Section 179D Energy Efficient Commercial Building Deduction",
            // Listed at $1.88/sqft; without a floor area it counts as that flat amount.
            value: IncentiveValue::Flat { amount: 1.88 },
            description: "Tax deduction for energy-efficient building improvements",
            eligibility: &["hvac", "lighting", "building_envelope"],
            expires_on: None,
            application_process: "IRS Form 3468 with energy certification",
        },
        Incentive {
            kind: IncentiveKind::TaxCredit,
            name: "Commercial Energy Efficiency Tax Credit",
            value: IncentiveValue::PercentOfCost { percent: 25.0, cap: None },
            description: "25% credit for qualifying energy efficiency improvements",
            eligibility: &["hvac", "lighting", "building_systems"],
            expires_on: NaiveDate::from_ymd_opt(2024, 12, 31),
            application_process: "IRS Form 3468",
        },
    ]
}

fn california_incentives() -> Vec<Incentive> {
    vec![
        Incentive {
            kind: IncentiveKind::Rebate,
            name: "Self-Generation Incentive Program (SGIP)",
            value: IncentiveValue::Flat { amount: 150.0 },
            description: "Rebate for energy storage and fuel cell systems",
            eligibility: &["battery_storage", "fuel_cells"],
            expires_on: None,
            application_process: "Apply through approved installers",
        },
        Incentive {
            kind: IncentiveKind::Rebate,
            name: "Energy Efficiency Rebates",
            value: IncentiveValue::Flat { amount: 500.0 },
            description: "Utility rebates for lighting, HVAC, and motor upgrades",
            eligibility: &["led_lighting", "hvac", "motors"],
            expires_on: None,
            application_process: "Utility pre-approval required",
        },
    ]
}

fn texas_incentives() -> Vec<Incentive> {
    vec![Incentive {
        kind: IncentiveKind::Loan,
        name: "Texas LoanSTAR Revolving Loan Program",
        value: IncentiveValue::Flat { amount: 0.0 },
        description: "Below-market rate loans for energy efficiency projects",
        eligibility: &["energy_efficiency", "renewable_energy"],
        expires_on: None,
        application_process: "Apply through State Energy Conservation Office",
    }]
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::IncentiveTable;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn solar_in_california_gets_the_federal_credit() {
        let table = IncentiveTable::default();
        let result = table.optimize("Solar", 100_000.0, "Fresno, California", date(2025, 1, 1));

        assert_eq!(result.applicable.len(), 1);
        assert_eq!(result.total_incentive_value, 30_000.0);
        assert_eq!(result.post_incentive_cost, 70_000.0);
        assert_eq!(result.payback_reduction_percent, 30.0);
    }

    #[test]
    fn hvac_in_california_stacks_percentage_and_flat_incentives() {
        let result =
            IncentiveTable::default().optimize("HVAC", 20_000.0, "California", date(2024, 6, 1));

        // 179D flat 1.88 + 25% credit + $500 utility rebate
        assert_eq!(result.applicable.len(), 3);
        assert_eq!(result.total_incentive_value, 5_501.88);
        assert_eq!(result.post_incentive_cost, 14_498.12);
        assert_eq!(result.payback_reduction_percent, 27.5);
    }

    #[test]
    fn expired_credit_is_excluded() {
        let table = IncentiveTable::default();
        let credit = "Commercial Energy Efficiency Tax Credit";

        let last_day = table.optimize("HVAC", 20_000.0, "California", date(2024, 12, 31));
        assert!(last_day.applicable.iter().any(|incentive| incentive.name == credit));

        let result = table.optimize("HVAC", 20_000.0, "California", date(2025, 1, 1));
        assert_eq!(result.applicable.len(), 2);
        assert!(result.applicable.iter().all(|incentive| incentive.name != credit));
        assert_eq!(result.total_incentive_value, 501.88);
        assert_eq!(result.payback_reduction_percent, 2.5);
    }

    #[test]
    fn section_179d_counts_without_a_floor_area() {
        let result =
            IncentiveTable::default().optimize("Lighting", 1_000.0, "Ohio", date(2025, 1, 1));

        assert_eq!(result.applicable.len(), 1);
        assert_eq!(result.total_incentive_value, 1.88);
    }

    #[test]
    fn multi_word_categories_match_underscored_keywords() {
        let result = IncentiveTable::default().optimize(
            "Renewable Energy",
            10_000.0,
            "Austin, Texas",
            date(2025, 1, 1),
        );
        // Solar ITC plus the LoanSTAR program, which carries no cash value.
        assert_eq!(result.applicable.len(), 2);
        assert_eq!(result.total_incentive_value, 3_000.0);
    }

    #[test]
    fn no_eligible_incentives() {
        let table = IncentiveTable::default();
        let result = table.optimize("Water Conservation", 5_000.0, "Ohio", date(2025, 1, 1));
        assert!(result.applicable.is_empty());
        assert_eq!(result.post_incentive_cost, 5_000.0);
        assert_eq!(result.payback_reduction_percent, 0.0);
    }

    #[test]
    fn zero_cost_has_no_payback_reduction() {
        let result = IncentiveTable::default().optimize("Solar", 0.0, "", date(2025, 1, 1));
        assert_eq!(result.payback_reduction_percent, 0.0);
    }
}
