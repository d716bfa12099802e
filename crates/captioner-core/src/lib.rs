//! Captioner Core - Embeddable image captioning library.
//!
//! Turns an image into a natural-language caption with a pre-trained CNN
//! feature extractor feeding a next-token predictor, decoded greedily.
//!
//! # Architecture
//!
//! ```text
//! Bytes → Validate → Decode → Preprocess → Extract (CNN) → Greedy decode → Caption
//! ```
//!
//! Models and vocabulary are loaded once into a [`Captioner`], which is then
//! shared read-only by every request.
//!
//! # Usage
//!
//! ```rust,ignore
//! use captioner_core::{Captioner, Config};
//!
//! #[tokio::main]
//! async fn main() -> captioner_core::Result<()> {
//!     let config = Config::load()?;
//!     let captioner = Captioner::load(&config)?;
//!
//!     let outcome = captioner.caption_file("./dog.jpg".as_ref()).await?;
//!     println!("{}", outcome.caption);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod caption;
pub mod config;
pub mod embedding;
pub mod error;
pub mod math;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use caption::{CaptionDecoder, DecodedCaption, SequencePredictor, StopReason, Vocabulary};
pub use config::Config;
pub use embedding::{FeatureExtractor, ImageEmbedding};
pub use error::{CaptionError, ConfigError, PipelineError, PipelineResult, Result};
pub use pipeline::Captioner;
pub use types::{CaptionOutcome, CaptionTimings};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
