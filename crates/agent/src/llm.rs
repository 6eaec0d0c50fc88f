use std::time::Duration;

use async_trait::async_trait;
use greenpath_core::config::{AiConfig, AiProvider};
use greenpath_core::errors::AiSourceError;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system", content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user", content: content.into() }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the text content of the first completion choice.
    async fn complete(&self, request: &ChatRequest) -> Result<String, AiSourceError>;
}

/// OpenAI-compatible `/chat/completions` client (OpenRouter, OpenAI, Ollama).
pub struct HttpLlmClient {
    client: Client,
    endpoint: String,
    provider: AiProvider,
    model: String,
    api_key: Option<SecretString>,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

impl HttpLlmClient {
    pub fn from_config(config: &AiConfig) -> Result<Self, AiSourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|error| AiSourceError::Unavailable(format!("http client: {error}")))?;

        Ok(Self {
            client,
            endpoint: completions_endpoint(&config.effective_base_url()),
            provider: config.provider,
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn completions_endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, AiSourceError> {
        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let mut builder = self.client.post(&self.endpoint).json(&body);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }
        if self.provider == AiProvider::OpenRouter {
            builder = builder.header("X-Title", "Greenpath");
        }

        let response = builder
            .send()
            .await
            .map_err(|error| AiSourceError::Transport(error.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AiSourceError::Transport(format!(
                "completion endpoint returned {status}: {}",
                detail.chars().take(200).collect::<String>()
            )));
        }

        let payload: CompletionResponse =
            response.json().await.map_err(|error| AiSourceError::Decode(error.to_string()))?;
        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AiSourceError::Decode("completion contained no content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use greenpath_core::config::{AiConfig, AppConfig, AiProvider};

    use super::{completions_endpoint, HttpLlmClient};

    fn ai_config(provider: AiProvider, base_url: Option<&str>) -> AiConfig {
        let mut config = AppConfig::default().ai;
        config.provider = provider;
        config.base_url = base_url.map(str::to_string);
        config
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            completions_endpoint("https://openrouter.ai/api/v1/"),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn endpoint_defaults_to_provider_base_url() {
        let client =
            HttpLlmClient::from_config(&ai_config(AiProvider::Ollama, None)).expect("client");
        assert_eq!(client.endpoint(), "http://localhost:11434/v1/chat/completions");

        let client = HttpLlmClient::from_config(&ai_config(
            AiProvider::OpenAi,
            Some("http://proxy.internal:8080/v1"),
        ))
        .expect("client");
        assert_eq!(client.endpoint(), "http://proxy.internal:8080/v1/chat/completions");
    }
}
