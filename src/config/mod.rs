pub mod defaults;
pub mod settings;

pub use defaults::DefaultConfig;
pub use settings::{EndpointConfig, ModelConfig, OutputConfig, PromptConfig, Settings};
