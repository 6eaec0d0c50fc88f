//! Tolerant decoding of model output.
//!
//! Models drift from the requested shape, so every field has an alias and a
//! default. Only a payload with no recommendations list at all is an error.

use greenpath_core::errors::AiSourceError;
use greenpath_core::AiRecommendation;
use serde_json::{Map, Value};

pub const DEFAULT_TITLE: &str = "Sustainability Recommendation";
pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_DIFFICULTY: &str = "Medium";
pub const DEFAULT_ROI_MONTHS: i64 = 24;
pub const DEFAULT_PRIORITY: f64 = 0.5;

pub fn decode_recommendations(content: &str) -> Result<Vec<AiRecommendation>, AiSourceError> {
    let payload: Value = serde_json::from_str(strip_code_fence(content))
        .map_err(|error| AiSourceError::Decode(format!("invalid JSON: {error}")))?;

    let items = match &payload {
        Value::Array(items) => items,
        Value::Object(object) => match object.get("recommendations") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(AiSourceError::Decode(
                    "response has no `recommendations` array".to_string(),
                ))
            }
        },
        _ => return Err(AiSourceError::Decode("response is not a JSON object".to_string())),
    };

    Ok(items.iter().filter_map(Value::as_object).map(decode_one).collect())
}

fn decode_one(item: &Map<String, Value>) -> AiRecommendation {
    AiRecommendation {
        id: text(item, &["id"]),
        title: text(item, &["title", "recommendation"])
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        description: text(item, &["description", "details"]).unwrap_or_default(),
        category: text(item, &["category"]).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        estimated_cost_savings: number(item, &["estimated_cost_savings", "savings"]).unwrap_or(0.0),
        estimated_co2_reduction: number(item, &["estimated_co2_reduction", "co2_reduction"])
            .unwrap_or(0.0),
        roi_months: number(item, &["roi_months", "payback_months"])
            .map(|months| months.round() as i64)
            .unwrap_or(DEFAULT_ROI_MONTHS),
        difficulty: text(item, &["difficulty"]).unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
        priority_score: number(item, &["priority_score", "priority"]).unwrap_or(DEFAULT_PRIORITY),
        implementation_steps: steps(item),
        reasoning: text(item, &["reasoning", "explanation"]).unwrap_or_default(),
    }
}

fn first<'a>(item: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|key| item.get(*key)).find(|value| !value.is_null())
}

fn text(item: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match first(item, keys)? {
        Value::String(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

/// Accepts numbers and numeric strings such as `"12,000"` or `"$4500"`.
fn number(item: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    let value = match first(item, keys)? {
        Value::Number(value) => value.as_f64(),
        Value::String(value) => {
            let cleaned =
                value.chars().filter(|ch| !matches!(ch, ',' | '$' | ' ')).collect::<String>();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

fn steps(item: &Map<String, Value>) -> Vec<String> {
    match first(item, &["implementation_steps", "steps"]) {
        Some(Value::Array(steps)) => steps
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|step| !step.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(step)) if !step.trim().is_empty() => vec![step.trim().to_string()],
        _ => Vec::new(),
    }
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use greenpath_core::errors::AiSourceError;

    use super::{decode_recommendations, DEFAULT_CATEGORY, DEFAULT_PRIORITY, DEFAULT_ROI_MONTHS};

    #[test]
    fn canonical_fields_decode_verbatim() {
        let decoded = decode_recommendations(
            r#"{"recommendations": [{"id": "vfd-1", "title": "VFD Installation",
                "description": "Install drives", "category": "Energy Efficiency",
                "estimated_cost_savings": 42000, "estimated_co2_reduction": 78.5,
                "roi_months": 16, "difficulty": "Medium", "priority_score": 0.95,
                "implementation_steps": ["Audit motors", "Install"], "reasoning": "Motor load"}]}"#,
        )
        .expect("decode");

        assert_eq!(decoded.len(), 1);
        let vfd = &decoded[0];
        assert_eq!(vfd.id.as_deref(), Some("vfd-1"));
        assert_eq!(vfd.estimated_cost_savings, 42_000.0);
        assert_eq!(vfd.roi_months, 16);
        assert_eq!(vfd.implementation_steps, vec!["Audit motors", "Install"]);
    }

    #[test]
    fn aliases_and_defaults_fill_missing_fields() {
        let decoded = decode_recommendations(
            r#"{"recommendations": [{"recommendation": "Smart Thermostats",
                "details": "Schedule HVAC", "savings": "1,800", "co2_reduction": 2.1,
                "payback_months": 9.6, "priority": 0.7, "steps": ["Buy", "Install"],
                "explanation": "Idle hours"},
                {"title": "Bare minimum"}]}"#,
        )
        .expect("decode");

        let thermostat = &decoded[0];
        assert_eq!(thermostat.title, "Smart Thermostats");
        assert_eq!(thermostat.description, "Schedule HVAC");
        assert_eq!(thermostat.estimated_cost_savings, 1_800.0);
        assert_eq!(thermostat.roi_months, 10);
        assert_eq!(thermostat.priority_score, 0.7);
        assert_eq!(thermostat.reasoning, "Idle hours");

        let bare = &decoded[1];
        assert_eq!(bare.category, DEFAULT_CATEGORY);
        assert_eq!(bare.difficulty, "Medium");
        assert_eq!(bare.roi_months, DEFAULT_ROI_MONTHS);
        assert_eq!(bare.priority_score, DEFAULT_PRIORITY);
        assert!(bare.id.is_none());
        assert!(bare.implementation_steps.is_empty());
    }

    #[test]
    fn fenced_and_bare_array_payloads_are_accepted() {
        let fenced = "```json\n{\"recommendations\": [{\"title\": \"Solar PPA\"}]}\n```";
        assert_eq!(decode_recommendations(fenced).expect("fenced")[0].title, "Solar PPA");

        let array = r#"[{"title": "Heat Pump"}, "ignored"]"#;
        assert_eq!(decode_recommendations(array).expect("array").len(), 1);
    }

    #[test]
    fn missing_list_is_a_decode_error() {
        let error = decode_recommendations(r#"{"advice": "insulate"}"#).expect_err("no list");
        assert!(matches!(error, AiSourceError::Decode(_)));
        assert!(matches!(decode_recommendations("not json"), Err(AiSourceError::Decode(_))));
    }
}
