// External dependencies
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

// Internal dependencies
use crate::ai::response::{ChatCompletion, ResponseParser};
use crate::kernel::{ChatCompletionService, ExecutionSettings};

// ============================================================================
// Chat Completion API Structures
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<ModelEntry>,
}

/// Client for any server speaking the OpenAI chat-completion API, such as
/// Ollama's `/v1` compatibility layer.
pub struct OpenAiChatClient {
    client: Client,
    base_url: Url,
    api_key: String,
    model_id: String,
}

// ============================================================================
// Client Implementation
// ============================================================================

impl OpenAiChatClient {
    pub fn new(base_url: &str, api_key: &str, model_id: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid endpoint URL: {base_url}"))?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
            model_id: model_id.to_string(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Joins `path` onto the base URL, keeping any path prefix such as `/v1`.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path)
            .with_context(|| format!("Failed to build {path} URL"))
    }

    // ========================================================================
    // Connection and Model Management
    // ========================================================================

    /// Lists model ids served by the endpoint.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = self.endpoint("models")?;
        debug!("Listing models from {url}");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .context("Failed to connect to the model endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error("Failed to list models", status, &body));
        }

        let models: ModelsResponse = response
            .json()
            .await
            .context("Failed to parse models response")?;

        let ids: Vec<String> = models.data.into_iter().map(|m| m.id).collect();
        debug!("Found {} models", ids.len());
        Ok(ids)
    }

    /// Checks that the configured model is among `models`.
    pub fn require_model(&self, models: &[String]) -> Result<()> {
        if models.iter().any(|m| m == &self.model_id) {
            info!("Model {} available", self.model_id);
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "Model {} not listed (run: ollama pull {})",
                self.model_id,
                self.model_id
            ))
        }
    }

    // ========================================================================
    // Chat Completion
    // ========================================================================

    pub fn build_request(&self, prompt: &str, settings: &ExecutionSettings) -> ChatRequest {
        ChatRequest {
            model: self.model_id.clone(),
            messages: vec![ChatMessage::user(prompt)],
            stream: false,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }

    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let url = self.endpoint("chat/completions")?;

        debug!(
            "Sending chat completion to {url}, model {}, {} message(s)",
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .context("Failed to send chat completion request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read chat completion response")?;

        if !status.is_success() {
            return Err(Self::status_error(
                "Chat completion request failed",
                status,
                &body,
            ));
        }

        let completion = ResponseParser::parse_completion(&body)
            .context("Failed to parse chat completion response")?;

        if let Some(reason) = completion.finish_reason() {
            if reason != "stop" {
                warn!("Completion finished early: {reason}");
            }
        }
        if let Some(usage) = completion.usage {
            debug!(
                "Token usage: prompt {}, completion {}, total {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        Ok(completion)
    }

    fn status_error(what: &str, status: reqwest::StatusCode, body: &str) -> anyhow::Error {
        match ResponseParser::error_message(body) {
            Some(message) => anyhow::anyhow!("{what}: {status}: {message}"),
            None => anyhow::anyhow!("{what}: {status}"),
        }
    }
}

#[async_trait]
impl ChatCompletionService for OpenAiChatClient {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn complete(&self, prompt: &str, settings: &ExecutionSettings) -> Result<String> {
        let request = self.build_request(prompt, settings);
        let completion = OpenAiChatClient::complete(self, &request).await?;
        Ok(completion.text()?.to_string())
    }
}
