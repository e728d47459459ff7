use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::config::defaults::{
    DEFAULT_API_KEY, DEFAULT_BASE_URL, DEFAULT_INPUT, DEFAULT_MODEL_ID, DEFAULT_TEMPLATE,
    DEFAULT_TIMEOUT_SECS,
};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub endpoint: EndpointConfig,
    pub model: ModelConfig,
    pub prompt: PromptConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    pub model_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PromptConfig {
    pub template: String,
    pub input: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub use_colors: bool,
    pub wait_for_key: bool,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            input: DEFAULT_INPUT.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_colors: true,
            wait_for_key: true,
        }
    }
}

impl EndpointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    /// Loads settings from `path`, or from `~/.dreamworld/config.toml` when
    /// no path is given. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
            let settings: Settings = toml::from_str(&content)
                .with_context(|| format!("Invalid config file {}", config_path.display()))?;
            Ok(settings)
        } else {
            debug!("No config at {}, using defaults", config_path.display());
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let home_dir =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;

        Ok(home_dir.join(".dreamworld").join("config.toml"))
    }

    /// Checks the invariants every run depends on: non-empty strings and an
    /// absolute http(s) base URL.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("endpoint.base_url", &self.endpoint.base_url),
            ("endpoint.api_key", &self.endpoint.api_key),
            ("model.model_id", &self.model.model_id),
            ("prompt.template", &self.prompt.template),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                anyhow::bail!("Configuration value `{name}` must not be empty");
            }
        }

        let url = Url::parse(&self.endpoint.base_url)
            .with_context(|| format!("Invalid endpoint URL: {}", self.endpoint.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!(
                "Endpoint URL must use http or https, got `{}`",
                url.scheme()
            );
        }

        if self.endpoint.timeout_secs == 0 {
            anyhow::bail!("Configuration value `endpoint.timeout_secs` must be positive");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_local_ollama_setup() {
        let settings = Settings::default();
        assert_eq!(settings.endpoint.base_url, "http://localhost:57572");
        assert_eq!(settings.endpoint.api_key, "ollama");
        assert_eq!(settings.model.model_id, "gpt-oss:20b");
        assert_eq!(settings.prompt.input, "AI驱动的无限流世界");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load(Some(dir.path().join("absent.toml").as_path())).unwrap();
        assert_eq!(settings.model.model_id, DEFAULT_MODEL_ID);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[model]\nmodel_id = \"qwen2\"\ntemperature = 0.2\n").unwrap();

        let settings = Settings::load(Some(path.as_path())).unwrap();
        assert_eq!(settings.model.model_id, "qwen2");
        assert_eq!(settings.model.temperature, Some(0.2));
        assert_eq!(settings.endpoint.base_url, DEFAULT_BASE_URL);
        assert!(settings.output.wait_for_key);
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.endpoint.base_url = "http://127.0.0.1:11434/v1".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load(Some(path.as_path())).unwrap();
        assert_eq!(loaded.endpoint.base_url, "http://127.0.0.1:11434/v1");
        assert_eq!(loaded.prompt.template, DEFAULT_TEMPLATE);
    }

    #[test]
    fn rejects_malformed_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[model\nmodel_id = ").unwrap();

        assert!(Settings::load(Some(path.as_path())).is_err());
    }

    #[test]
    fn validate_rejects_empty_model_id() {
        let mut settings = Settings::default();
        settings.model.model_id = "  ".to_string();

        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("model.model_id"));
    }

    #[test]
    fn validate_rejects_non_http_endpoint() {
        let mut settings = Settings::default();
        settings.endpoint.base_url = "ftp://localhost:57572".to_string();
        assert!(settings.validate().is_err());

        settings.endpoint.base_url = "localhost:57572/no-scheme".to_string();
        assert!(settings.validate().is_err());
    }
}
