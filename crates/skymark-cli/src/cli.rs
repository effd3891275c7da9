//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use skymark_extractor::ProviderKind;
use std::path::PathBuf;

/// Skymark CLI - Read capture time and station location from weather-photo watermarks.
#[derive(Debug, Parser)]
#[command(name = "skymark")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SKYMARK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (one tab-separated line per image)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract time and location from one or more images
    Extract(ExtractArgs),

    /// Normalize a raw timestamp (or clean a location)
    Normalize(NormalizeArgs),

    /// Show which provider is selected and whether it is configured
    Status,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Image files to process
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Override the configured provider
    #[arg(short, long, value_enum)]
    pub provider: Option<ProviderArg>,
}

/// Arguments for the normalize command.
#[derive(Debug, Parser)]
pub struct NormalizeArgs {
    /// Raw text as read from a watermark
    pub text: String,

    /// Treat the text as a location instead of a timestamp
    #[arg(short, long)]
    pub location: bool,
}

/// Provider argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ProviderArg {
    /// Vision-language model
    Vlm,
    /// Cloud OCR with layout heuristics
    Ocr,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<ProviderArg> for ProviderKind {
    fn from(provider: ProviderArg) -> Self {
        match provider {
            ProviderArg::Vlm => ProviderKind::Vlm,
            ProviderArg::Ocr => ProviderKind::Ocr,
        }
    }
}
