//! Image feature extraction.
//!
//! A CNN encoder turns a preprocessed image tensor into a fixed-size
//! [`ImageEmbedding`] that conditions every caption decoding step. The model
//! itself is opaque: anything implementing [`FeatureExtractor`] will do, and
//! [`OnnxFeatureExtractor`] runs an exported network via ONNX Runtime.
//!
//! # Usage
//!
//! ```rust,ignore
//! use captioner_core::embedding::{preprocess, FeatureExtractor, OnnxFeatureExtractor};
//! use captioner_core::Config;
//!
//! let config = Config::default();
//! let extractor = OnnxFeatureExtractor::load(&config.extractor_model_path(), None)?;
//! let tensor = preprocess(
//!     &image,
//!     config.extractor.image_size,
//!     config.extractor.resize_filter.into(),
//!     config.extractor.layout,
//! );
//! let embedding = extractor.extract(&tensor)?;
//! ```

pub(crate) mod mobilenet;
pub(crate) mod preprocess;

use ndarray::Array4;

use crate::error::PipelineResult;

pub use self::mobilenet::OnnxFeatureExtractor;
pub use self::preprocess::preprocess;

/// Fixed-size image feature vector. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEmbedding {
    values: Vec<f32>,
}

impl ImageEmbedding {
    /// Wrap extracted feature values.
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Feature values.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the embedding holds no features.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Maps a preprocessed image tensor to an embedding.
///
/// Implementations must be pure from the caller's point of view: the same
/// tensor yields the same embedding.
pub trait FeatureExtractor: Send + Sync {
    /// Extract features from a `[1, ...]` image tensor.
    fn extract(&self, tensor: &Array4<f32>) -> PipelineResult<ImageEmbedding>;
}
