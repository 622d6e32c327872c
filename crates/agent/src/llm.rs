use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use synthai_core::config::{LlmConfig, LlmProvider};
use thiserror::Error;
use tracing::warn;

#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Error)]
pub enum TextGenerationError {
    #[error("text generation is not configured")]
    Unavailable,
    #[error("text generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("text generation transport failure: {0}")]
    Http(String),
    #[error("text generation returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("text generation returned no content")]
    EmptyResponse,
}

/// Per-call generation limits shared by every prompt the agent sends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationSettings {
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl GenerationSettings {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn request(&self, system_prompt: String, user_prompt: String) -> CompletionRequest {
        CompletionRequest {
            system_prompt,
            user_prompt,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default())
    }
}

/// External text-generation collaborator.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, TextGenerationError>;
}

/// Bounds a completion by `timeout` and rejects blank output.
pub async fn complete_within(
    generator: &dyn TextGenerator,
    request: &CompletionRequest,
    timeout: Duration,
) -> Result<String, TextGenerationError> {
    let text = tokio::time::timeout(timeout, generator.complete(request))
        .await
        .map_err(|_| TextGenerationError::Timeout(timeout))??;

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TextGenerationError::EmptyResponse);
    }
    Ok(trimmed.to_string())
}

#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableTextGenerator;

#[async_trait::async_trait]
impl TextGenerator for UnavailableTextGenerator {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, TextGenerationError> {
        Err(TextGenerationError::Unavailable)
    }
}

/// Chat-completions client for OpenAI and OpenAI-compatible servers such as Ollama.
#[derive(Clone, Debug)]
pub struct OpenAiCompatibleClient {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
}

impl OpenAiCompatibleClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<SecretString>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TextGenerationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| TextGenerationError::Http(error.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiCompatibleClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, TextGenerationError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.user_prompt },
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        let mut builder = self.client.post(self.endpoint()).json(&body);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response =
            builder.send().await.map_err(|error| TextGenerationError::Http(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TextGenerationError::Status { status: status.as_u16(), body });
        }

        let raw = response
            .json::<Value>()
            .await
            .map_err(|error| TextGenerationError::Http(error.to_string()))?;

        raw["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .map(str::to_string)
            .ok_or(TextGenerationError::EmptyResponse)
    }
}

/// Builds the configured generator, or an unavailable one when disabled or misconfigured.
pub fn text_generator_from_config(config: &LlmConfig) -> Arc<dyn TextGenerator> {
    if config.provider == LlmProvider::Disabled {
        return Arc::new(UnavailableTextGenerator);
    }

    let Some(base_url) = config.effective_base_url() else {
        return Arc::new(UnavailableTextGenerator);
    };

    match OpenAiCompatibleClient::new(
        base_url,
        config.api_key.clone(),
        config.model.clone(),
        Duration::from_secs(config.timeout_secs),
    ) {
        Ok(client) => Arc::new(client),
        Err(error) => {
            warn!(
                event_name = "llm.client_unavailable",
                provider = ?config.provider,
                error = %error,
                "could not build text generation client; replies will use local fallbacks"
            );
            Arc::new(UnavailableTextGenerator)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use synthai_core::config::{LlmConfig, LlmProvider};

    use super::{
        complete_within, text_generator_from_config, CompletionRequest, GenerationSettings,
        OpenAiCompatibleClient, TextGenerationError, TextGenerator, UnavailableTextGenerator,
    };

    struct SlowGenerator;

    #[async_trait::async_trait]
    impl TextGenerator for SlowGenerator {
        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<String, TextGenerationError> {
            tokio::time::sleep(Duration::from_secs(3_600)).await;
            Ok("too late".to_string())
        }
    }

    struct BlankGenerator;

    #[async_trait::async_trait]
    impl TextGenerator for BlankGenerator {
        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<String, TextGenerationError> {
            Ok("   \n".to_string())
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            system_prompt: "system".to_string(),
            user_prompt: "user".to_string(),
            max_tokens: 50,
            temperature: 0.7,
        }
    }

    #[tokio::test]
    async fn slow_generators_are_cut_off() {
        let result = complete_within(&SlowGenerator, &request(), Duration::from_millis(20)).await;
        assert!(matches!(result, Err(TextGenerationError::Timeout(_))));
    }

    #[tokio::test]
    async fn blank_completions_are_rejected() {
        let result = complete_within(&BlankGenerator, &request(), Duration::from_secs(1)).await;
        assert!(matches!(result, Err(TextGenerationError::EmptyResponse)));
    }

    #[tokio::test]
    async fn unavailable_generator_always_fails() {
        let result = UnavailableTextGenerator.complete(&request()).await;
        assert!(matches!(result, Err(TextGenerationError::Unavailable)));
    }

    #[tokio::test]
    async fn disabled_provider_yields_unavailable_generator() {
        let generator = text_generator_from_config(&LlmConfig::default());
        let result = generator.complete(&request()).await;
        assert!(matches!(result, Err(TextGenerationError::Unavailable)));
    }

    #[tokio::test]
    async fn unreachable_server_reports_http_failure() {
        let client = OpenAiCompatibleClient::new(
            "http://127.0.0.1:9/v1/",
            None,
            "llama3",
            Duration::from_secs(2),
        )
        .expect("client builds");
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/v1/chat/completions");

        let result = client.complete(&request()).await;
        assert!(matches!(result, Err(TextGenerationError::Http(_))));
    }

    #[test]
    fn generation_settings_follow_config() {
        let config = LlmConfig { max_tokens: 120, timeout_secs: 4, ..LlmConfig::default() };
        let settings = GenerationSettings::from_config(&config);
        let request = settings.request("s".to_string(), "u".to_string());

        assert_eq!(settings.timeout, Duration::from_secs(4));
        assert_eq!(request.max_tokens, 120);
        assert_eq!(request.temperature, config.temperature);
    }

    #[test]
    fn ollama_uses_local_default_endpoint() {
        let config = LlmConfig { provider: LlmProvider::Ollama, ..LlmConfig::default() };
        assert_eq!(config.effective_base_url().as_deref(), Some("http://localhost:11434/v1"));
    }
}
