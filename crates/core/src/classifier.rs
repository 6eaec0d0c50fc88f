//! Free-text profile classification.
//!
//! Every classifier is an ordered list of `(keywords, variant)` pairs evaluated
//! first-match-wins against the lower-cased input. All functions are total.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndustryType {
    Technology,
    Manufacturing,
    Retail,
    Healthcare,
    Hospitality,
    Education,
    Financial,
    Logistics,
    Construction,
    Agriculture,
    Other,
}

impl IndustryType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Technology => "Technology",
            Self::Manufacturing => "Manufacturing",
            Self::Retail => "Retail",
            Self::Healthcare => "Healthcare",
            Self::Hospitality => "Hospitality",
            Self::Education => "Education",
            Self::Financial => "Financial Services",
            Self::Logistics => "Logistics & Transportation",
            Self::Construction => "Construction",
            Self::Agriculture => "Agriculture",
            Self::Other => "Other",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanySize {
    Small,
    Medium,
    Large,
    Enterprise,
}

impl CompanySize {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Small => "1-50 employees",
            Self::Medium => "51-200 employees",
            Self::Large => "201-1000 employees",
            Self::Enterprise => "1000+ employees",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    EnergyEfficiency,
    RenewableEnergy,
    CarbonReduction,
    WasteReduction,
    WaterConservation,
    Transportation,
    GreenBuilding,
    SupplyChain,
}

impl GoalCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::EnergyEfficiency => "Energy Efficiency",
            Self::RenewableEnergy => "Renewable Energy",
            Self::CarbonReduction => "Carbon Footprint Reduction",
            Self::WasteReduction => "Waste Reduction",
            Self::WaterConservation => "Water Conservation",
            Self::Transportation => "Sustainable Transportation",
            Self::GreenBuilding => "Green Building",
            Self::SupplyChain => "Sustainable Supply Chain",
        }
    }
}

type KeywordTable<T> = &'static [(&'static [&'static str], T)];

// Substring match, except the short "it" which must stand alone as a word.
const WORD_ONLY_KEYWORDS: &[&str] = &["it"];

const INDUSTRY_KEYWORDS: KeywordTable<IndustryType> = &[
    (&["tech", "software", "it", "computer"], IndustryType::Technology),
    (&["manufacturing", "factory", "production"], IndustryType::Manufacturing),
    (&["retail", "store", "shopping"], IndustryType::Retail),
    (&["health", "medical", "hospital"], IndustryType::Healthcare),
    (&["hotel", "restaurant", "hospitality"], IndustryType::Hospitality),
    (&["education", "school", "university"], IndustryType::Education),
    (&["financial", "bank", "finance"], IndustryType::Financial),
    (&["logistics", "transport", "shipping"], IndustryType::Logistics),
    (&["construction", "building"], IndustryType::Construction),
    (&["agriculture", "farming"], IndustryType::Agriculture),
];

const SIZE_KEYWORDS: KeywordTable<CompanySize> = &[
    (&["small", "1-50", "startup"], CompanySize::Small),
    (&["medium", "51-200", "mid"], CompanySize::Medium),
    (&["large", "201-1000"], CompanySize::Large),
    (&["enterprise", "1000+", "corporation"], CompanySize::Enterprise),
];

const GOAL_KEYWORDS: KeywordTable<GoalCategory> = &[
    (&["energy", "efficiency"], GoalCategory::EnergyEfficiency),
    (&["renewable", "solar", "wind"], GoalCategory::RenewableEnergy),
    (&["carbon", "emissions", "co2"], GoalCategory::CarbonReduction),
    (&["waste", "recycling"], GoalCategory::WasteReduction),
    (&["water", "conservation"], GoalCategory::WaterConservation),
    (&["transport", "fleet", "commute"], GoalCategory::Transportation),
    (&["building", "leed", "green"], GoalCategory::GreenBuilding),
    (&["supply", "vendor", "procurement"], GoalCategory::SupplyChain),
];

fn keyword_matches(lowered: &str, keyword: &str) -> bool {
    if WORD_ONLY_KEYWORDS.contains(&keyword) {
        lowered.split(|c: char| !c.is_alphanumeric()).any(|word| word == keyword)
    } else {
        lowered.contains(keyword)
    }
}

fn first_match<T: Copy>(table: KeywordTable<T>, text: &str) -> Option<T> {
    let lowered = text.to_lowercase();
    table
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| keyword_matches(&lowered, keyword)))
        .map(|(_, value)| *value)
}

pub fn categorize_industry(text: &str) -> IndustryType {
    first_match(INDUSTRY_KEYWORDS, text).unwrap_or(IndustryType::Other)
}

pub fn categorize_company_size(text: &str) -> CompanySize {
    first_match(SIZE_KEYWORDS, text).unwrap_or(CompanySize::Medium)
}

/// Unrecognised goal text is dropped.
pub fn categorize_goals<S: AsRef<str>>(goals: &[S]) -> BTreeSet<GoalCategory> {
    goals.iter().filter_map(|goal| first_match(GOAL_KEYWORDS, goal.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::{
        categorize_company_size, categorize_goals, categorize_industry, CompanySize, GoalCategory,
        IndustryType,
    };

    #[test]
    fn industry_matches_case_insensitively() {
        assert_eq!(categorize_industry("Technology"), IndustryType::Technology);
        assert_eq!(categorize_industry("SOFTWARE consulting"), IndustryType::Technology);
        assert_eq!(categorize_industry("Boutique Hotel"), IndustryType::Hospitality);
        assert_eq!(categorize_industry("Restaurant"), IndustryType::Hospitality);
        assert_eq!(categorize_industry("Regional bank"), IndustryType::Financial);
    }

    #[test]
    fn industry_first_match_wins() {
        // Matches both the healthcare and construction keyword sets.
        assert_eq!(categorize_industry("Hospital building services"), IndustryType::Healthcare);
        // "hospitality" contains "hospital" and healthcare is checked first.
        assert_eq!(categorize_industry("Hospitality"), IndustryType::Healthcare);
    }

    #[test]
    fn it_keyword_matches_only_as_a_word() {
        assert_eq!(categorize_industry("IT Services"), IndustryType::Technology);
        assert_eq!(categorize_industry("Managed IT/cloud"), IndustryType::Technology);
        assert_eq!(categorize_industry("Public utilities"), IndustryType::Other);
        assert_eq!(
            categorize_industry("Boutique hotel with spa facilities"),
            IndustryType::Hospitality
        );
    }

    #[test]
    fn unknown_industry_defaults_to_other() {
        assert_eq!(categorize_industry(""), IndustryType::Other);
        assert_eq!(categorize_industry("Mining"), IndustryType::Other);
    }

    #[test]
    fn size_defaults_to_medium() {
        assert_eq!(categorize_company_size("1-50 employees"), CompanySize::Small);
        assert_eq!(categorize_company_size("51-200 employees"), CompanySize::Medium);
        assert_eq!(categorize_company_size("201-1000 employees"), CompanySize::Large);
        assert_eq!(categorize_company_size("1000+ employees"), CompanySize::Enterprise);
        assert_eq!(categorize_company_size("unknown"), CompanySize::Medium);
    }

    #[test]
    fn goals_are_deduplicated_and_unmatched_dropped() {
        let goals = categorize_goals(&[
            "Improve energy efficiency",
            "Energy Efficiency",
            "Install solar panels",
            "be nicer",
        ]);

        assert_eq!(goals.len(), 2);
        assert!(goals.contains(&GoalCategory::EnergyEfficiency));
        assert!(goals.contains(&GoalCategory::RenewableEnergy));
    }

    #[test]
    fn energy_is_checked_before_renewable() {
        let goals = categorize_goals(&["Renewable Energy"]);

        assert_eq!(goals.into_iter().collect::<Vec<_>>(), vec![GoalCategory::EnergyEfficiency]);
        assert!(categorize_goals(&["Wind power"]).contains(&GoalCategory::RenewableEnergy));
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(IndustryType::Logistics.label(), "Logistics & Transportation");
        assert_eq!(GoalCategory::CarbonReduction.label(), "Carbon Footprint Reduction");
    }
}
