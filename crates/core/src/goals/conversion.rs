//! Fixed unit conversion table used when propagating impact onto goals.

/// (from, to, factor): `value_in_to = value_in_from * factor`. Inverses are derived.
const CONVERSIONS: &[(&str, &str, f64)] = &[
    ("usd", "thousand_usd", 0.001),
    ("tons_co2", "lbs_co2", 2_000.0),
    ("tons", "kg", 907.185),
    ("kwh", "mwh", 0.001),
];

#[derive(Clone, Debug, PartialEq)]
pub struct Conversion {
    pub value: f64,
    pub unit: String,
    /// False when no table entry existed and the value was passed through unchanged.
    pub converted: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnitConverter;

impl UnitConverter {
    pub fn new() -> Self {
        Self
    }

    pub fn factor(&self, from: &str, to: &str) -> Option<f64> {
        let from = normalize_unit(from);
        let to = normalize_unit(to);
        if from == to {
            return Some(1.0);
        }

        CONVERSIONS.iter().find_map(|&(source, target, factor)| {
            if source == from && target == to {
                Some(factor)
            } else if source == to && target == from {
                Some(1.0 / factor)
            } else {
                None
            }
        })
    }

    /// Converts between units; unknown pairs pass the value through unmodified.
    pub fn convert(&self, value: f64, from: &str, to: &str) -> Conversion {
        match self.factor(from, to) {
            Some(factor) => {
                Conversion { value: value * factor, unit: normalize_unit(to), converted: true }
            }
            None => Conversion { value, unit: normalize_unit(from), converted: false },
        }
    }
}

pub fn normalize_unit(unit: &str) -> String {
    unit.trim().to_ascii_lowercase().replace([' ', '-'], "_")
}
