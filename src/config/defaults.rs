use crate::config::Settings;

pub const DEFAULT_BASE_URL: &str = "http://localhost:57572";
pub const DEFAULT_API_KEY: &str = "ollama";
pub const DEFAULT_MODEL_ID: &str = "gpt-oss:20b";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_INPUT: &str = "AI驱动的无限流世界";

pub const DEFAULT_TEMPLATE: &str = "
你是一个充满激情的游戏开发者，你的项目DreamWorld刚刚启动。
请为你的项目写一句充满力量和梦想的开场白。
主题是：{{$input}}
";

pub struct DefaultConfig;

impl DefaultConfig {
    pub fn create_default_config_file() -> String {
        format!(
            r#"# dreamworld configuration

[endpoint]
# OpenAI-compatible base URL; requests go to <base_url>/chat/completions.
# A stock Ollama install serves this API at http://localhost:11434/v1
base_url = "{DEFAULT_BASE_URL}"
# Ollama ignores the key, but it must be non-empty
api_key = "{DEFAULT_API_KEY}"
timeout_secs = {DEFAULT_TIMEOUT_SECS}

[model]
# Must already be pulled with `ollama pull`
model_id = "{DEFAULT_MODEL_ID}"
# temperature = 0.7
# max_tokens = 256

[prompt]
# The newline after the opening quotes is dropped by TOML
template = """
{DEFAULT_TEMPLATE}"""
input = "{DEFAULT_INPUT}"

[output]
use_colors = true
wait_for_key = true
"#
        )
    }

    pub fn get_default_settings() -> Settings {
        Settings::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_matches_default_settings() {
        let parsed: Settings = toml::from_str(&DefaultConfig::create_default_config_file())
            .expect("default config file is valid TOML");
        let defaults = DefaultConfig::get_default_settings();

        assert_eq!(parsed.endpoint.base_url, defaults.endpoint.base_url);
        assert_eq!(parsed.model.model_id, defaults.model.model_id);
        assert_eq!(parsed.prompt.input, defaults.prompt.input);
        assert_eq!(parsed.prompt.template, DEFAULT_TEMPLATE);
        assert!(parsed.model.temperature.is_none());
    }
}
