//! Image captioning pipeline components.
//!
//! - **validate**: Pre-decode checks on uploaded bytes
//! - **decode**: Decode images from various formats with limits and timeout
//! - **captioner**: Orchestrates validate → decode → extract → generate

pub mod captioner;
pub mod decode;
pub mod validate;

// Re-exports for convenient access
pub use captioner::Captioner;
pub use decode::{DecodedImage, ImageDecoder};
pub use validate::UploadValidator;
