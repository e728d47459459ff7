pub mod ai;
pub mod cli;
pub mod config;
pub mod kernel;

pub use cli::{Cli, CommandHandler, Commands};
pub use config::Settings;
pub use kernel::{ChatCompletionService, Kernel, KernelBuilder};
