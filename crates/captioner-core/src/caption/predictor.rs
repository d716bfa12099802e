//! Next-token prediction over the caption vocabulary.
//!
//! The predictor is an opaque collaborator: given the image embedding and the
//! padded index sequence decoded so far, it scores every vocabulary index.
//! [`OnnxSequencePredictor`] runs an exported two-input model; any closure
//! with the right signature also works.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::{DynValue, Value};

use crate::config::{DecoderConfig, SequenceDtype};
use crate::embedding::ImageEmbedding;
use crate::error::{PipelineError, PipelineResult};

/// Scores the next token given an embedding and a padded sequence.
pub trait SequencePredictor: Send + Sync {
    /// Return one score per vocabulary index.
    fn predict(&self, embedding: &ImageEmbedding, sequence: &[i64]) -> PipelineResult<Vec<f32>>;
}

impl<F> SequencePredictor for F
where
    F: Fn(&ImageEmbedding, &[i64]) -> PipelineResult<Vec<f32>> + Send + Sync,
{
    fn predict(&self, embedding: &ImageEmbedding, sequence: &[i64]) -> PipelineResult<Vec<f32>> {
        self(embedding, sequence)
    }
}

/// Wraps an ONNX Runtime session for the caption model.
///
/// Same `Mutex<Session>` pattern as the feature extractor.
pub struct OnnxSequencePredictor {
    session: Mutex<Session>,
    image_input: String,
    sequence_input: String,
    output_name: Option<String>,
    sequence_dtype: SequenceDtype,
}

impl OnnxSequencePredictor {
    /// Load the caption model from an ONNX file.
    ///
    /// Input names default to the model's first two inputs, in
    /// `[image features, sequence]` order.
    pub fn load(model_path: &Path, config: &DecoderConfig) -> PipelineResult<Self> {
        if !model_path.exists() {
            return Err(PipelineError::Model {
                path: model_path.to_path_buf(),
                message: "Caption model not found".to_string(),
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

        let declared: Vec<String> = session
            .inputs()
            .iter()
            .map(|i| i.name().to_string())
            .collect();

        let pick = |configured: &Option<String>, position: usize| {
            configured
                .clone()
                .or_else(|| declared.get(position).cloned())
                .ok_or_else(|| PipelineError::Model {
                    path: model_path.to_path_buf(),
                    message: format!(
                        "Caption model needs two inputs (image features, sequence); found {:?}",
                        declared
                    ),
                })
        };
        let image_input = pick(&config.image_input, 0)?;
        let sequence_input = pick(&config.sequence_input, 1)?;

        tracing::info!(
            "Loaded caption model from {:?} (image input: {:?}, sequence input: {:?}, outputs: {:?})",
            model_path,
            image_input,
            sequence_input,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            image_input,
            sequence_input,
            output_name: config.output.clone(),
            sequence_dtype: config.sequence_dtype,
        })
    }

    fn sequence_value(&self, sequence: &[i64]) -> PipelineResult<DynValue> {
        let shape = vec![1_i64, sequence.len() as i64];
        let value = match self.sequence_dtype {
            SequenceDtype::Float32 => {
                let data: Vec<f32> = sequence.iter().map(|&i| i as f32).collect();
                Value::from_array((shape, data)).map(|v| v.into_dyn())
            }
            SequenceDtype::Int64 => {
                Value::from_array((shape, sequence.to_vec())).map(|v| v.into_dyn())
            }
        };
        value.map_err(|e| PipelineError::Predict {
            message: format!("Failed to create sequence tensor: {e}"),
        })
    }
}

impl SequencePredictor for OnnxSequencePredictor {
    fn predict(&self, embedding: &ImageEmbedding, sequence: &[i64]) -> PipelineResult<Vec<f32>> {
        let image_value = Value::from_array((
            vec![1_i64, embedding.len() as i64],
            embedding.as_slice().to_vec(),
        ))
        .map_err(|e| PipelineError::Predict {
            message: format!("Failed to create image feature tensor: {e}"),
        })?;
        let sequence_value = self.sequence_value(sequence)?;

        let inputs = ort::inputs![
            self.image_input.as_str() => image_value,
            self.sequence_input.as_str() => sequence_value
        ];

        let mut session = self.session.lock().map_err(|e| PipelineError::Predict {
            message: format!("Session lock poisoned: {e}"),
        })?;

        let outputs = session.run(inputs).map_err(|e| PipelineError::Predict {
            message: format!("ONNX inference failed: {e}"),
        })?;

        let output = match &self.output_name {
            Some(name) => outputs.iter().find(|(n, _)| *n == name.as_str()),
            None => outputs.iter().next(),
        }
        .ok_or_else(|| PipelineError::Predict {
            message: format!(
                "Model did not produce output {:?}",
                self.output_name.as_deref().unwrap_or("<first>")
            ),
        })?;

        let (shape, data) =
            output
                .1
                .try_extract_tensor::<f32>()
                .map_err(|e| PipelineError::Predict {
                    message: format!("Failed to extract score tensor: {e}"),
                })?;

        score_row(shape, data)
    }
}

/// Scores are `[vocab_size]` or `[1, vocab_size]`; take the single row.
fn score_row(shape: &[i64], data: &[f32]) -> PipelineResult<Vec<f32>> {
    let row = match shape {
        [_] => Some(data),
        [_, dim] => usize::try_from(*dim).ok().and_then(|dim| data.get(..dim)),
        _ => None,
    };
    row.map(<[f32]>::to_vec).ok_or_else(|| PipelineError::Predict {
        message: format!(
            "Unexpected score tensor shape {:?} ({} values)",
            shape,
            data.len()
        ),
    })
}
