use anyhow::Result;
use clap::Parser;
use log::error;
use std::io;

use dreamworld::cli::{version_info, OutputFormatter};
use dreamworld::{Cli, CommandHandler, Commands, Settings};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Errors only, unless --verbose; RUST_LOG still wins
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Error
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    // Handle version early
    if matches!(cli.command, Some(Commands::Version)) {
        println!("{}", version_info());
        return;
    }

    if let Err(e) = run(cli).await {
        error!("dreamworld failed: {e:#}");
        eprintln!("{}", OutputFormatter::default().format_error(&format!("{e:#}")));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Settings::default_config_path()?,
    };

    let mut settings = Settings::load(Some(config_path.as_path()))?;
    cli.apply_overrides(&mut settings);

    let handler = CommandHandler::new(settings, config_path);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let mut stdout = io::stdout().lock();
            handler.handle_run(&mut stdout).await?;
        }
        Commands::Init { force } => println!("{}", handler.handle_init(force)?),
        Commands::Config => println!("{}", handler.handle_config()?),
        Commands::Doctor => println!("{}", handler.handle_doctor().await?),
        Commands::Version => println!("{}", handler.handle_version()?),
    }

    Ok(())
}
