//! Minimal orchestration layer: a [`Kernel`] owns one registered
//! [`ChatCompletionService`] and runs [`PromptFunction`]s against it.

pub mod builder;
pub mod function;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;

pub use builder::KernelBuilder;
pub use function::{FunctionResult, PromptFunction};

use crate::ai::PromptArguments;

/// Sampling options forwarded with each completion request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExecutionSettings {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// A backend that turns a rendered prompt into generated text.
#[async_trait]
pub trait ChatCompletionService: Send + Sync {
    fn model_id(&self) -> &str;

    async fn complete(&self, prompt: &str, settings: &ExecutionSettings) -> Result<String>;
}

pub struct Kernel {
    service: Arc<dyn ChatCompletionService>,
    settings: ExecutionSettings,
}

impl Kernel {
    pub fn builder() -> KernelBuilder {
        KernelBuilder::new()
    }

    pub(crate) fn new(service: Arc<dyn ChatCompletionService>, settings: ExecutionSettings) -> Self {
        Self { service, settings }
    }

    pub fn model_id(&self) -> &str {
        self.service.model_id()
    }

    pub fn execution_settings(&self) -> &ExecutionSettings {
        &self.settings
    }

    pub fn create_function_from_prompt(&self, template: &str) -> Result<PromptFunction> {
        PromptFunction::from_template(template)
    }

    /// Renders `function` with `args` and awaits a single completion.
    pub async fn invoke(
        &self,
        function: &PromptFunction,
        args: PromptArguments,
    ) -> Result<FunctionResult> {
        let prompt = function.render(&args)?;
        debug!(
            "Invoking prompt function against {}, prompt length: {}",
            self.model_id(),
            prompt.len()
        );

        let text = self.service.complete(&prompt, &self.settings).await?;

        info!("Received {} bytes from {}", text.len(), self.model_id());
        Ok(FunctionResult::new(text, self.model_id()))
    }
}
