use async_trait::async_trait;
use greenpath_core::errors::AiSourceError;
use greenpath_core::{
    AiRecommendation, AiRecommendationRequest, AiRecommendationSource, AiSourceStatus,
};
use tracing::{debug, warn};

use crate::decode::decode_recommendations;
use crate::llm::LlmClient;
use crate::prompt::build_chat_request;

pub struct LlmRecommendationSource<C> {
    client: C,
    provider: String,
    model: String,
    max_retries: u32,
}

impl<C: LlmClient> LlmRecommendationSource<C> {
    pub fn new(
        client: C,
        provider: impl Into<String>,
        model: impl Into<String>,
        max_retries: u32,
    ) -> Self {
        Self { client, provider: provider.into(), model: model.into(), max_retries }
    }
}

#[async_trait]
impl<C: LlmClient> AiRecommendationSource for LlmRecommendationSource<C> {
    async fn recommend(
        &self,
        request: &AiRecommendationRequest,
    ) -> Result<Vec<AiRecommendation>, AiSourceError> {
        let chat = build_chat_request(request);
        let mut attempt = 0;
        let content = loop {
            match self.client.complete(&chat).await {
                Ok(content) => break content,
                // Only transport failures are retried; a bad payload will not improve.
                Err(AiSourceError::Transport(message)) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        event_name = "agent.llm.retry",
                        provider = %self.provider,
                        attempt,
                        error = %message,
                        "completion request failed, retrying"
                    );
                }
                Err(error) => return Err(error),
            }
        };

        let recommendations = decode_recommendations(&content)?;
        debug!(
            event_name = "agent.llm.decoded",
            provider = %self.provider,
            count = recommendations.len(),
            "decoded ai recommendations"
        );
        Ok(recommendations)
    }

    fn status(&self) -> AiSourceStatus {
        AiSourceStatus {
            configured: true,
            provider: self.provider.clone(),
            model: Some(self.model.clone()),
        }
    }
}

/// Stand-in when AI is disabled; every call reports the source as unavailable.
pub struct DisabledAiSource {
    provider: String,
}

impl DisabledAiSource {
    pub fn new(provider: impl Into<String>) -> Self {
        Self { provider: provider.into() }
    }
}

#[async_trait]
impl AiRecommendationSource for DisabledAiSource {
    async fn recommend(
        &self,
        _request: &AiRecommendationRequest,
    ) -> Result<Vec<AiRecommendation>, AiSourceError> {
        Err(AiSourceError::Unavailable("ai recommendations are disabled".to_string()))
    }

    fn status(&self) -> AiSourceStatus {
        AiSourceStatus { configured: false, provider: self.provider.clone(), model: None }
    }
}
