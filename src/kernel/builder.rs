use anyhow::Result;
use log::debug;
use std::sync::Arc;
use std::time::Duration;

use crate::ai::OpenAiChatClient;
use crate::config::defaults::DEFAULT_TIMEOUT_SECS;
use crate::config::Settings;
use crate::kernel::{ChatCompletionService, ExecutionSettings, Kernel};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

#[derive(Default)]
pub struct KernelBuilder {
    service: Option<Arc<dyn ChatCompletionService>>,
    settings: ExecutionSettings,
    timeout: Option<Duration>,
}

impl KernelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn execution_settings(mut self, settings: ExecutionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Registers an OpenAI-compatible chat-completion endpoint.
    pub fn add_openai_chat_completion(
        self,
        model_id: &str,
        endpoint: &str,
        api_key: &str,
    ) -> Result<Self> {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = OpenAiChatClient::new(endpoint, api_key, model_id, timeout)?;
        debug!("Registered chat completion for {model_id} at {endpoint}");
        Ok(self.with_chat_completion(Arc::new(client)))
    }

    pub fn with_chat_completion(mut self, service: Arc<dyn ChatCompletionService>) -> Self {
        self.service = Some(service);
        self
    }

    /// Applies endpoint, model and sampling options from `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new()
            .timeout(settings.endpoint.timeout())
            .execution_settings(ExecutionSettings {
                temperature: settings.model.temperature,
                max_tokens: settings.model.max_tokens,
            })
            .add_openai_chat_completion(
                &settings.model.model_id,
                &settings.endpoint.base_url,
                &settings.endpoint.api_key,
            )
    }

    pub fn build(self) -> Result<Kernel> {
        let service = self
            .service
            .ok_or_else(|| anyhow::anyhow!("No chat completion service registered"))?;

        Ok(Kernel::new(service, self.settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_without_service_fails() {
        assert!(KernelBuilder::new().build().is_err());
    }

    #[test]
    fn fallback_timeout_matches_config_default() {
        assert_eq!(DEFAULT_TIMEOUT, Settings::default().endpoint.timeout());
    }

    #[test]
    fn settings_flow_into_kernel() {
        let mut settings = Settings::default();
        settings.model.model_id = "qwen2".to_string();
        settings.model.temperature = Some(0.3);

        let kernel = KernelBuilder::from_settings(&settings).unwrap().build().unwrap();

        assert_eq!(kernel.model_id(), "qwen2");
        assert_eq!(kernel.execution_settings().temperature, Some(0.3));
        assert_eq!(kernel.execution_settings().max_tokens, None);
    }
}
