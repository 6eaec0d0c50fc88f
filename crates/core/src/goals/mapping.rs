//! Which goal categories an implementation category contributes to, and how much.

use serde::Serialize;

use crate::domain::implementation::Implementation;

/// $/kWh used to express cost savings as avoided consumption.
pub const ASSUMED_ELECTRICITY_RATE: f64 = 0.12;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ImpactValue {
    pub value: f64,
    pub unit: &'static str,
}

#[derive(Clone, Copy)]
pub struct GoalContribution {
    pub goal_category: &'static str,
    pub compute: fn(&Implementation) -> ImpactValue,
}

#[derive(Clone, Copy)]
pub struct CategoryImpactMapping {
    /// Normalized implementation category.
    pub category: &'static str,
    pub contributions: &'static [GoalContribution],
}

impl CategoryImpactMapping {
    pub fn goal_categories(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.contributions.iter().map(|contribution| contribution.goal_category)
    }

    pub fn contribution_for(&self, goal_category: &str) -> Option<&GoalContribution> {
        let goal_category = normalize_category(goal_category);
        self.contributions.iter().find(|contribution| contribution.goal_category == goal_category)
    }
}

fn cost_savings(implementation: &Implementation) -> ImpactValue {
    ImpactValue { value: implementation.estimated_cost_savings, unit: "usd" }
}

fn carbon_reduction(implementation: &Implementation) -> ImpactValue {
    ImpactValue { value: implementation.estimated_co2_reduction, unit: "tons_co2" }
}

fn energy_reduction(implementation: &Implementation) -> ImpactValue {
    ImpactValue {
        value: implementation.estimated_cost_savings / ASSUMED_ELECTRICITY_RATE,
        unit: "kwh",
    }
}

// Diverted waste is approximated by the reported CO2 reduction.
fn waste_diverted(implementation: &Implementation) -> ImpactValue {
    ImpactValue { value: implementation.estimated_co2_reduction, unit: "tons" }
}

const COST: GoalContribution =
    GoalContribution { goal_category: "cost_savings", compute: cost_savings };
const CARBON: GoalContribution =
    GoalContribution { goal_category: "carbon_reduction", compute: carbon_reduction };
const ENERGY: GoalContribution =
    GoalContribution { goal_category: "energy_reduction", compute: energy_reduction };
const RENEWABLE: GoalContribution =
    GoalContribution { goal_category: "renewable_energy", compute: energy_reduction };
const WASTE: GoalContribution =
    GoalContribution { goal_category: "waste_reduction", compute: waste_diverted };

const STANDARD_MAPPINGS: &[CategoryImpactMapping] = &[
    CategoryImpactMapping { category: "energy_efficiency", contributions: &[COST, CARBON, ENERGY] },
    CategoryImpactMapping {
        category: "renewable_energy",
        contributions: &[RENEWABLE, CARBON, COST],
    },
    CategoryImpactMapping { category: "carbon_reduction", contributions: &[CARBON, COST] },
    CategoryImpactMapping { category: "waste_reduction", contributions: &[WASTE, COST, CARBON] },
    CategoryImpactMapping { category: "water_conservation", contributions: &[COST, CARBON] },
    CategoryImpactMapping { category: "transportation", contributions: &[CARBON, COST] },
    CategoryImpactMapping { category: "green_building", contributions: &[ENERGY, CARBON, COST] },
    CategoryImpactMapping { category: "supply_chain", contributions: &[CARBON, COST] },
];

/// Immutable lookup built once and shared by reference.
#[derive(Clone)]
pub struct ImpactMappingTable {
    mappings: Vec<CategoryImpactMapping>,
}

impl Default for ImpactMappingTable {
    fn default() -> Self {
        Self::new(STANDARD_MAPPINGS.to_vec())
    }
}

impl ImpactMappingTable {
    pub fn new(mappings: Vec<CategoryImpactMapping>) -> Self {
        Self { mappings }
    }

    pub fn lookup(&self, implementation_category: &str) -> Option<&CategoryImpactMapping> {
        let key = normalize_category(implementation_category);
        self.mappings.iter().find(|mapping| mapping.category == key)
    }
}

/// "Energy Efficiency" and "energy-efficiency" both become "energy_efficiency".
pub fn normalize_category(category: &str) -> String {
    category.trim().to_ascii_lowercase().replace([' ', '-'], "_")
}
