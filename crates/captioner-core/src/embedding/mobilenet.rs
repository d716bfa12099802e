//! ONNX Runtime session for the CNN feature extractor.
//!
//! Loads an image classifier truncated at its pooling layer (e.g. MobileNetV2,
//! 1280 features) and turns a preprocessed tensor into an [`ImageEmbedding`].

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::error::{PipelineError, PipelineResult};

use super::{FeatureExtractor, ImageEmbedding};

/// Wraps an ONNX Runtime session for image feature extraction.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct OnnxFeatureExtractor {
    session: Mutex<Session>,
    /// Name of the input tensor (detected from model metadata).
    input_name: String,
    /// Output tensor to read; first output when `None`.
    output_name: Option<String>,
}

impl OnnxFeatureExtractor {
    /// Load a feature extractor from an ONNX file.
    pub fn load(model_path: &Path, output_name: Option<String>) -> PipelineResult<Self> {
        if !model_path.exists() {
            return Err(PipelineError::Model {
                path: model_path.to_path_buf(),
                message: "Feature extractor model not found".to_string(),
            });
        }

        let session = Session::builder()
            .map_err(|e| PipelineError::Model {
                path: model_path.to_path_buf(),
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(model_path)
            .map_err(|e| PipelineError::Model {
                path: model_path.to_path_buf(),
                message: format!("Failed to load ONNX model: {e}"),
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .ok_or_else(|| PipelineError::Model {
                path: model_path.to_path_buf(),
                message: "Model declares no inputs".to_string(),
            })?;

        tracing::info!(
            "Loaded feature extractor from {:?} (input: {:?}, outputs: {:?})",
            model_path,
            input_name,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }
}

impl FeatureExtractor for OnnxFeatureExtractor {
    fn extract(&self, tensor: &Array4<f32>) -> PipelineResult<ImageEmbedding> {
        let shape: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = tensor.iter().copied().collect();

        let input_value =
            Value::from_array((shape, flat_data)).map_err(|e| PipelineError::Extract {
                message: format!("Failed to create input tensor: {e}"),
            })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self.session.lock().map_err(|e| PipelineError::Extract {
            message: format!("Session lock poisoned: {e}"),
        })?;

        let outputs = session.run(inputs).map_err(|e| PipelineError::Extract {
            message: format!("ONNX inference failed: {e}"),
        })?;

        let output = match &self.output_name {
            Some(name) => outputs.iter().find(|(n, _)| *n == name.as_str()),
            None => outputs.iter().next(),
        }
        .ok_or_else(|| PipelineError::Extract {
            message: format!(
                "Model did not produce output {:?}",
                self.output_name.as_deref().unwrap_or("<first>")
            ),
        })?;

        let (shape, data) =
            output
                .1
                .try_extract_tensor::<f32>()
                .map_err(|e| PipelineError::Extract {
                    message: format!("Failed to extract feature tensor: {e}"),
                })?;

        // Pooled features come out as [1, D], or [1, 1, 1, D] when the export
        // keeps spatial dims. Only a batch of one is accepted.
        let features = match shape.len() {
            1 => data.to_vec(),
            n if n > 1 && shape[0] == 1 => data.to_vec(),
            _ => {
                return Err(PipelineError::Extract {
                    message: format!("Unexpected feature tensor shape: {:?}", shape),
                });
            }
        };

        if features.is_empty() {
            return Err(PipelineError::Extract {
                message: "Feature tensor is empty".to_string(),
            });
        }

        Ok(ImageEmbedding::new(features))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_model_is_model_error() {
        let err = OnnxFeatureExtractor::load(Path::new("/nonexistent/mobilenet_v2.onnx"), None)
            .err()
            .unwrap();
        match err {
            PipelineError::Model { path, message } => {
                assert!(path.ends_with("mobilenet_v2.onnx"));
                assert!(message.contains("not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
