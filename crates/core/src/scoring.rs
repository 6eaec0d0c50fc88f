//! Rule-engine priority scoring.

use serde::{Deserialize, Serialize};

use crate::calculator::round_to;
use crate::domain::recommendation::{Difficulty, MAX_PRIORITY_SCORE, MIN_PRIORITY_SCORE};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringVariant {
    /// ROI, savings and high-usage tiers.
    #[default]
    Basic,
    /// Basic tiers plus CO2 and difficulty adjustments.
    Extended,
}

impl ScoringVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Extended => "extended",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "basic" => Some(Self::Basic),
            "extended" => Some(Self::Extended),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreInput {
    pub base_priority: f64,
    pub roi_months: u32,
    pub estimated_savings: f64,
    pub co2_reduction_tons: f64,
    pub difficulty: Difficulty,
    pub monthly_kwh: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PriorityScorer {
    variant: ScoringVariant,
}

impl PriorityScorer {
    pub fn new(variant: ScoringVariant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> ScoringVariant {
        self.variant
    }

    /// Additive tiers over the rule's base priority, clamped to [0.1, 1.0].
    pub fn score(&self, input: &ScoreInput) -> f64 {
        let mut priority = input.base_priority;

        priority += match input.roi_months {
            0..=12 => 0.2,
            13..=24 => 0.1,
            25..=48 => 0.0,
            _ => -0.1,
        };

        priority += match input.estimated_savings {
            savings if savings > 10_000.0 => 0.15,
            savings if savings > 5_000.0 => 0.10,
            savings if savings > 2_000.0 => 0.05,
            _ => 0.0,
        };

        if input.monthly_kwh > 5_000.0 {
            priority += 0.1;
        }

        if self.variant == ScoringVariant::Extended {
            priority += match input.co2_reduction_tons {
                tons if tons > 50.0 => 0.15,
                tons if tons > 25.0 => 0.10,
                tons if tons > 10.0 => 0.05,
                _ => 0.0,
            };
            priority += match input.difficulty {
                Difficulty::Easy => 0.10,
                Difficulty::Medium => 0.0,
                Difficulty::Hard => -0.10,
            };
        }

        clamp_priority(round_to(priority, 2))
    }
}

pub fn clamp_priority(score: f64) -> f64 {
    if score.is_nan() {
        return MIN_PRIORITY_SCORE;
    }
    score.clamp(MIN_PRIORITY_SCORE, MAX_PRIORITY_SCORE)
}
