use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Business profile exactly as submitted by the onboarding layer.
///
/// Usage fields are optional here so that a missing value can be reported as a
/// validation error instead of a deserialization failure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileInput {
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default, alias = "size")]
    pub company_size: String,
    #[serde(default)]
    pub location: String,
    pub monthly_kwh: Option<f64>,
    pub monthly_therms: Option<f64>,
    #[serde(default)]
    pub sustainability_goals: Vec<String>,
    #[serde(default)]
    pub current_challenges: Vec<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
}

/// Validated, immutable profile consumed by the rule engine and the AI collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub business_name: String,
    pub industry: String,
    pub company_size: String,
    pub location: String,
    pub monthly_kwh: f64,
    pub monthly_therms: f64,
    pub sustainability_goals: Vec<String>,
    pub current_challenges: Vec<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
}

impl ProfileInput {
    pub fn validate(self) -> Result<BusinessProfile, DomainError> {
        let monthly_kwh = usage_value("monthly_kwh", self.monthly_kwh)?;
        let monthly_therms = usage_value("monthly_therms", self.monthly_therms)?;

        Ok(BusinessProfile {
            business_name: self.business_name.trim().to_owned(),
            industry: self.industry.trim().to_owned(),
            company_size: self.company_size.trim().to_owned(),
            location: self.location.trim().to_owned(),
            monthly_kwh,
            monthly_therms,
            sustainability_goals: self.sustainability_goals,
            current_challenges: self.current_challenges,
            budget: self.budget,
            timeline: self.timeline,
        })
    }
}

fn usage_value(field: &'static str, value: Option<f64>) -> Result<f64, DomainError> {
    let Some(value) = value else {
        return Err(DomainError::validation(field, "is required"));
    };
    if !value.is_finite() {
        return Err(DomainError::validation(field, "must be a finite number"));
    }
    if value < 0.0 {
        let message = format!("must be zero or greater (got {value})");
        return Err(DomainError::validation(field, message));
    }
    Ok(value)
}

impl BusinessProfile {
    /// Convenience constructor for callers that already hold validated values.
    pub fn new(
        industry: impl Into<String>,
        company_size: impl Into<String>,
        location: impl Into<String>,
        monthly_kwh: f64,
        monthly_therms: f64,
    ) -> Result<Self, DomainError> {
        ProfileInput {
            industry: industry.into(),
            company_size: company_size.into(),
            location: location.into(),
            monthly_kwh: Some(monthly_kwh),
            monthly_therms: Some(monthly_therms),
            ..ProfileInput::default()
        }
        .validate()
    }

    pub fn with_goals(mut self, goals: Vec<String>) -> Self {
        self.sustainability_goals = goals;
        self
    }
}
