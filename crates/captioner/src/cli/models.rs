//! The `captioner models` command for inspecting model artifacts.

use std::path::{Path, PathBuf};

use captioner_core::{Config, Vocabulary};
use clap::{Args, Subcommand};

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for model management.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// List expected artifacts and whether they are present
    List,

    /// Show model directory path
    Path,
}

/// One artifact the service needs at startup.
struct Artifact {
    role: &'static str,
    path: PathBuf,
}

/// Artifacts named by the config, in load order.
fn artifacts(config: &Config) -> Vec<Artifact> {
    vec![
        Artifact {
            role: "vocabulary",
            path: config.vocabulary_path(),
        },
        Artifact {
            role: "feature extractor",
            path: config.extractor_model_path(),
        },
        Artifact {
            role: "caption model",
            path: config.decoder_model_path(),
        },
    ]
}

fn status(path: &Path) -> String {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => {
            format!("ready ({:.1} MB)", meta.len() as f64 / (1024.0 * 1024.0))
        }
        Ok(_) => "not a file".to_string(),
        Err(_) => "not installed".to_string(),
    }
}

/// Short summary of the vocabulary artifact, or why it failed to load.
fn describe_vocabulary(config: &Config) -> String {
    match Vocabulary::load(
        &config.vocabulary_path(),
        &config.decoder.start_token,
        &config.decoder.end_token,
    ) {
        Ok(vocab) => format!(
            "{} tokens, hash {}",
            vocab.len(),
            &vocab.content_hash()[..16]
        ),
        Err(e) => format!("unusable: {e}"),
    }
}

/// Execute the models command.
pub async fn execute(args: ModelsArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    match args.command {
        ModelsCommand::List => {
            let model_dir = config.model_dir();

            println!("Model artifacts:");
            println!("  Directory: {}\n", model_dir.display());

            let artifacts = artifacts(&config);
            for artifact in &artifacts {
                println!(
                    "    - {:18} {:40} {}",
                    artifact.role,
                    artifact.path.display(),
                    status(&artifact.path)
                );
            }

            if config.vocabulary_path().is_file() {
                println!("\n  Vocabulary: {}", describe_vocabulary(&config));
            }

            if artifacts.iter().any(|a| !a.path.is_file()) {
                println!(
                    "\nPlace the missing files in the model directory, or point \
                     [extractor] model / [decoder] model / [vocabulary] file at them."
                );
            }
        }

        ModelsCommand::Path => {
            println!("{}", config.model_dir().display());
        }
    }

    Ok(())
}
