use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "dreamworld")]
#[command(about = "Prompt a local Ollama model through its OpenAI-compatible endpoint")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the config file [default: ~/.dreamworld/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// OpenAI-compatible base URL, e.g. http://localhost:11434/v1
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Model id served by the endpoint
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Value substituted for {{$input}} in the prompt template
    #[arg(short, long, global = true)]
    pub input: Option<String>,

    /// Exit right after printing the response
    #[arg(long, global = true)]
    pub no_wait: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Render the prompt, invoke the model and print the reply (default)
    Run,
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Show the effective configuration
    Config,
    /// Check the endpoint and model availability
    Doctor,
    /// Show version information
    Version,
}

impl Cli {
    /// Layers command-line flags over file settings.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(endpoint) = &self.endpoint {
            settings.endpoint.base_url = endpoint.clone();
        }
        if let Some(model) = &self.model {
            settings.model.model_id = model.clone();
        }
        if let Some(input) = &self.input {
            settings.prompt.input = input.clone();
        }
        if self.no_wait {
            settings.output.wait_for_key = false;
        }
        if self.no_color {
            settings.output.use_colors = false;
        }
    }
}
