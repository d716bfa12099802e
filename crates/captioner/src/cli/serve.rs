//! The `captioner serve` command.

use std::path::Path;

use anyhow::Context;
use captioner_core::Captioner;
use clap::Args;

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind address (overrides [server] host)
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port (overrides [server] port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Execute the serve command.
///
/// Models are loaded before the listener binds; a missing or corrupt
/// artifact ends the process with an error instead of serving.
pub async fn execute(args: ServeArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Loading models from {}", config.model_dir().display());
    let captioner = Captioner::load(&config).context("Failed to load captioning models")?;
    tracing::info!(
        "Ready: {} vocabulary tokens, max caption length {}",
        captioner.vocabulary().len(),
        captioner.max_length()
    );

    crate::server::run(captioner, &config).await
}
