use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::ai::{OpenAiChatClient, PromptArguments, PromptTemplate};
use crate::cli::{wait_for_key_press, OutputFormatter, Spinner};
use crate::config::{DefaultConfig, Settings};
use crate::kernel::{Kernel, KernelBuilder};

pub struct CommandHandler {
    settings: Settings,
    config_path: PathBuf,
    formatter: OutputFormatter,
}

impl CommandHandler {
    pub fn new(settings: Settings, config_path: PathBuf) -> Self {
        let formatter = OutputFormatter::new(settings.output.use_colors);

        Self {
            settings,
            config_path,
            formatter,
        }
    }

    /// Configures the kernel, invokes the prompt once and prints the reply.
    pub async fn handle_run<W: Write>(&self, out: &mut W) -> Result<()> {
        self.settings.validate()?;

        writeln!(out, "{}", self.formatter.format_calling())?;
        let kernel = KernelBuilder::from_settings(&self.settings)?.build()?;
        writeln!(
            out,
            "{}",
            self.formatter.format_configured(kernel.model_id())
        )?;

        self.invoke_prompt(&kernel, out).await?;

        if self.settings.output.wait_for_key {
            out.flush()?;
            if let Err(e) = wait_for_key_press() {
                warn!("Failed to wait for key press: {e}");
            }
        }

        Ok(())
    }

    /// Builds the prompt function from the configured template, awaits one
    /// invocation and writes the framed reply.
    pub async fn invoke_prompt<W: Write>(&self, kernel: &Kernel, out: &mut W) -> Result<()> {
        let function = kernel.create_function_from_prompt(&self.settings.prompt.template)?;
        let args = PromptArguments::new().with("input", self.settings.prompt.input.as_str());

        writeln!(out, "{}", self.formatter.format_invoking())?;
        out.flush()?;

        let spinner = Spinner::new("Waiting for the model...");
        let result = kernel.invoke(&function, args).await;
        spinner.stop();
        let result = result?;

        writeln!(out, "{}", self.formatter.format_response(result.text()))?;
        Ok(())
    }

    pub fn handle_init(&self, force: bool) -> Result<String> {
        info!("Writing default config to {}", self.config_path.display());

        if self.config_path.exists() && !force {
            return Ok(self.formatter.format_warning(&format!(
                "Config already exists at {} (use --force to overwrite)",
                self.config_path.display()
            )));
        }

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&self.config_path, DefaultConfig::create_default_config_file())
            .with_context(|| format!("Failed to write {}", self.config_path.display()))?;

        Ok(self.formatter.format_success(&format!(
            "Wrote default config to {}",
            self.config_path.display()
        )))
    }

    pub fn handle_config(&self) -> Result<String> {
        let model = &self.settings.model;
        let optional = |v: Option<String>| v.unwrap_or_else(|| "server default".to_string());

        Ok(format!(
            "DreamWorld Configuration:\n\
            - Config file: {}{}\n\
            - Endpoint: {}\n\
            - Model: {}\n\
            - Temperature: {}\n\
            - Max tokens: {}\n\
            - Timeout: {}s\n\
            - Input: {}\n\
            - Wait for key: {}\n\n\
            Prompt template:\n{}",
            self.config_path.display(),
            if self.config_path.exists() { "" } else { " (not found, using defaults)" },
            self.settings.endpoint.base_url,
            model.model_id,
            optional(model.temperature.map(|t| t.to_string())),
            optional(model.max_tokens.map(|t| t.to_string())),
            self.settings.endpoint.timeout_secs,
            self.settings.prompt.input,
            self.settings.output.wait_for_key,
            self.settings.prompt.template.trim_end(),
        ))
    }

    pub async fn handle_doctor(&self) -> Result<String> {
        let spinner = Spinner::new("Running diagnostics...");
        let mut diagnostics = Vec::new();

        match self.settings.validate() {
            Ok(()) => diagnostics.push(self.formatter.format_success("Configuration valid")),
            Err(e) => {
                diagnostics.push(self.formatter.format_failure(&format!("Configuration: {e}")));
                spinner.stop();
                return Ok(format!("DreamWorld Health Check:\n{}", diagnostics.join("\n")));
            }
        }

        let client = OpenAiChatClient::new(
            &self.settings.endpoint.base_url,
            &self.settings.endpoint.api_key,
            &self.settings.model.model_id,
            self.settings.endpoint.timeout(),
        )?;

        match client.list_models().await {
            Ok(models) => {
                diagnostics.push(self.formatter.format_success(&format!(
                    "Endpoint reachable at {} ({} models)",
                    client.base_url(),
                    models.len()
                )));
                debug!("Models: {}", models.join(", "));
                match client.require_model(&models) {
                    Ok(()) => diagnostics.push(
                        self.formatter
                            .format_success(&format!("Model {} available", client.model_id())),
                    ),
                    Err(e) => diagnostics.push(self.formatter.format_failure(&e.to_string())),
                }
            }
            Err(e) => diagnostics.push(self.formatter.format_failure(&format!("Endpoint: {e}"))),
        }

        match PromptTemplate::parse(&self.settings.prompt.template) {
            Ok(_) => diagnostics.push(self.formatter.format_success("Prompt template parses")),
            Err(e) => diagnostics.push(self.formatter.format_failure(&format!("Prompt: {e}"))),
        }

        spinner.stop();
        Ok(format!("DreamWorld Health Check:\n{}", diagnostics.join("\n")))
    }

    pub fn handle_version(&self) -> Result<String> {
        Ok(version_info())
    }
}

pub fn version_info() -> String {
    format!(
        "dreamworld {}\nRust version: {}\nTarget: {}",
        env!("CARGO_PKG_VERSION"),
        env!("DREAMWORLD_RUSTC_VERSION"),
        env!("DREAMWORLD_BUILD_TARGET"),
    )
}
