//! AI recommendation collaborator.
//!
//! The model is only a candidate generator. Every candidate it returns is
//! normalized and merged by `greenpath-core`, which owns scoring bounds,
//! de-duplication and persistence.
//!
//! - `llm` sends chat completions to an OpenAI-compatible endpoint
//! - `prompt` turns a business profile into the chat messages
//! - `decode` tolerantly reads the JSON the model returns
//! - `source` ties the three together behind `AiRecommendationSource`

pub mod decode;
pub mod llm;
pub mod prompt;
pub mod source;

use std::sync::Arc;

use greenpath_core::config::AiConfig;
use greenpath_core::errors::AiSourceError;
use greenpath_core::AiRecommendationSource;

pub use llm::{ChatMessage, ChatRequest, HttpLlmClient, LlmClient};
pub use source::{DisabledAiSource, LlmRecommendationSource};

/// Builds the configured source, or a disabled one when AI is switched off.
pub fn build_ai_source(
    config: &AiConfig,
) -> Result<Arc<dyn AiRecommendationSource>, AiSourceError> {
    if !config.enabled {
        return Ok(Arc::new(DisabledAiSource::new(config.provider.as_str())));
    }

    let client = HttpLlmClient::from_config(config)?;
    Ok(Arc::new(LlmRecommendationSource::new(
        client,
        config.provider.as_str(),
        config.model.clone(),
        config.max_retries,
    )))
}
