use greenpath_core::classifier::{
    categorize_company_size, categorize_industry, CompanySize, IndustryType,
};
use greenpath_core::AiRecommendationRequest;

use crate::llm::{ChatMessage, ChatRequest};

pub const TEMPERATURE: f32 = 0.3;
pub const MAX_TOKENS: u32 = 3000;

const SYSTEM_PROMPT: &str = "You are a sustainability consultant for small and \
mid-sized businesses. Recommend measurable, implementable improvements with realistic \
costs and savings. Prefer payback periods under three years and account for available incentives. \
Answer with a single JSON object and nothing else.";

const RESPONSE_SHAPE: &str = r#"Respond with JSON shaped exactly like:
{"recommendations": [{"title": "...", "description": "...", "category": "Energy Efficiency",
  "estimated_cost_savings": 12000, "estimated_co2_reduction": 8.5, "roi_months": 18,
  "difficulty": "Easy|Medium|Hard", "priority_score": 0.8,
  "implementation_steps": ["..."], "reasoning": "..."}]}
Savings are USD per year. CO2 reduction is tons per year. Provide 4 to 6 recommendations."#;

/// Focus line by precedence: goal wording, then industry, then company size.
pub fn focus(request: &AiRecommendationRequest) -> Option<&'static str> {
    let profile = &request.profile;
    let goals = profile.sustainability_goals.join(" ").to_lowercase();
    if goals.contains("carbon neutral") || goals.contains("net zero") {
        return Some(
            "Prioritize the fastest credible path to carbon neutrality, \
             including renewable procurement and offsets as a last step.",
        );
    }
    if ["cost", "savings", "budget"].iter().any(|needle| goals.contains(needle)) {
        return Some("Prioritize the shortest payback periods and lowest upfront costs.");
    }

    let industry_focus = match categorize_industry(&profile.industry) {
        IndustryType::Technology => Some(
            "Focus on server utilization, data center cooling and sustainable IT procurement.",
        ),
        IndustryType::Manufacturing => Some(
            "Focus on motors and drives, compressed air, process heat recovery \
             and avoiding production downtime.",
        ),
        IndustryType::Retail => {
            Some("Focus on lighting, refrigeration, HVAC scheduling and store-level behavior.")
        }
        IndustryType::Healthcare => Some(
            "Focus on 24/7 HVAC loads, medical equipment power management and regulated waste.",
        ),
        _ => None,
    };
    if industry_focus.is_some() {
        return industry_focus;
    }

    match categorize_company_size(&profile.company_size) {
        CompanySize::Small => {
            Some("Keep recommendations affordable for a small business with limited staff.")
        }
        CompanySize::Enterprise => {
            Some("Include portfolio-wide programs suitable for an enterprise with many sites.")
        }
        _ => None,
    }
}

pub fn user_prompt(request: &AiRecommendationRequest) -> String {
    let profile = &request.profile;
    let mut lines = vec![
        format!("Business: {}", display_or(&profile.business_name, "Unnamed business")),
        format!("Industry: {}", display_or(&profile.industry, "Unspecified")),
        format!("Size: {}", display_or(&profile.company_size, "Unspecified")),
        format!("Location: {}", display_or(&profile.location, "Unspecified")),
        format!(
            "Energy: {} kWh/month electricity, {} therms/month natural gas",
            profile.monthly_kwh, profile.monthly_therms
        ),
        format!("Goals: {}", display_or(&profile.sustainability_goals.join(", "), "None stated")),
    ];
    if !profile.current_challenges.is_empty() {
        lines.push(format!("Current challenges: {}", profile.current_challenges.join(", ")));
    }
    if let Some(budget) = profile.budget.as_deref().filter(|budget| !budget.trim().is_empty()) {
        lines.push(format!("Budget: {budget}"));
    }
    let timeline = profile.timeline.as_deref().filter(|timeline| !timeline.trim().is_empty());
    if let Some(timeline) = timeline {
        lines.push(format!("Timeline: {timeline}"));
    }
    if !request.previous_recommendations.is_empty() {
        lines.push(format!(
            "Do not repeat these existing recommendations: {}",
            request.previous_recommendations.join("; ")
        ));
    }
    if let Some(focus) = focus(request) {
        lines.push(focus.to_string());
    }
    lines.push(String::new());
    lines.push(RESPONSE_SHAPE.to_string());
    lines.join("\n")
}

pub fn build_chat_request(request: &AiRecommendationRequest) -> ChatRequest {
    ChatRequest {
        messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user_prompt(request))],
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    }
}

fn display_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}
