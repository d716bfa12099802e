//! The `captioner caption` command for one-off captioning of a local file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use captioner_core::{CaptionOutcome, Captioner};
use clap::Args;

/// Arguments for the `caption` command.
#[derive(Args, Debug)]
pub struct CaptionArgs {
    /// Image file to caption
    pub path: PathBuf,

    /// Print the full outcome (tokens, stop reason, timings) as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the caption command.
pub async fn execute(args: CaptionArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let captioner = Captioner::load(&config).context("Failed to load captioning models")?;

    let outcome = captioner
        .caption_file(&args.path)
        .await
        .with_context(|| format!("Failed to caption {}", args.path.display()))?;

    tracing::info!(
        "Captioned {:?} in {}ms ({} steps, {:?})",
        args.path,
        outcome.timings.total_ms,
        outcome.steps,
        outcome.stop_reason
    );

    println!("{}", render(&outcome, args.json)?);
    Ok(())
}

fn render(outcome: &CaptionOutcome, json: bool) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(outcome)?)
    } else {
        Ok(outcome.caption.clone())
    }
}
