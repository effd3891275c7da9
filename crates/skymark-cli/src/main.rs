//! Skymark CLI - Read capture time and station location from weather-photo watermarks.

use clap::Parser;
use skymark_cli::commands;
use skymark_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays parseable in json/quiet mode
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> skymark_cli::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Extract(args) => {
            commands::execute_extract(args, config.extractor_config(), &formatter).await?;
        }
        Command::Normalize(args) => {
            commands::execute_normalize(args, &formatter).await?;
        }
        Command::Status => {
            commands::execute_status(&config.extractor_config(), &formatter).await?;
        }
    }

    Ok(())
}
