//! Captioner CLI - Image captioning service built on a CNN encoder and a
//! greedy sequence decoder.
//!
//! Models and vocabulary are loaded once at startup; every request then runs
//! one feature extraction and up to `max_length` next-token predictions.
//!
//! # Usage
//!
//! ```bash
//! # Serve the HTTP API
//! captioner serve --port 8000
//!
//! # Caption a single image
//! captioner caption dog.jpg
//!
//! # View configuration
//! captioner config show
//!
//! # Check model artifacts
//! captioner models list
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cli;
mod logging;
mod server;

/// Captioner - Generate natural-language captions for images.
#[derive(Parser, Debug)]
#[command(name = "captioner")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "CAPTIONER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the captioning HTTP API
    Serve(cli::serve::ServeArgs),

    /// Caption a single image file
    Caption(cli::caption::CaptionArgs),

    /// Inspect model artifacts
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref().map(cli::expand_path);

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match cli::load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `captioner config path`."
            );
            captioner_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Captioner v{}", captioner_core::VERSION);

    let config_path = config_path.as_deref();
    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config_path).await,
        Commands::Caption(args) => cli::caption::execute(args, config_path).await,
        Commands::Models(args) => cli::models::execute(args, config_path).await,
        Commands::Config(args) => cli::config::execute(args, config_path).await,
    }
}
