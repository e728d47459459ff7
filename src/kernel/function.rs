use anyhow::Result;
use std::fmt;

use crate::ai::{PromptArguments, PromptTemplate};

/// A prompt template ready to be invoked through a [`crate::kernel::Kernel`].
#[derive(Debug, Clone)]
pub struct PromptFunction {
    template: PromptTemplate,
}

impl PromptFunction {
    pub fn from_template(template: &str) -> Result<Self> {
        Ok(Self {
            template: PromptTemplate::parse(template)?,
        })
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn render(&self, args: &PromptArguments) -> Result<String> {
        self.template.render(args)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionResult {
    text: String,
    model_id: String,
}

impl FunctionResult {
    pub fn new(text: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model_id: model_id.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

impl fmt::Display for FunctionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
