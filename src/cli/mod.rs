pub mod args;
pub mod commands;
pub mod output;

pub use args::{Cli, Commands};
pub use commands::{version_info, CommandHandler};
pub use output::{wait_for_key_press, OutputFormatter, Spinner};
