//! Pipeline orchestration - wires validation, decoding, feature extraction
//! and caption generation together.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::DynamicImage;
use tokio::time::timeout;

use crate::caption::{
    CaptionDecoder, DecodedCaption, OnnxSequencePredictor, SequencePredictor, Vocabulary,
};
use crate::config::{Config, ExtractorConfig, LimitsConfig};
use crate::embedding::{preprocess, FeatureExtractor, OnnxFeatureExtractor};
use crate::error::{PipelineError, PipelineResult, Result};
use crate::types::{CaptionOutcome, CaptionTimings};

use super::decode::{format_to_string, ImageDecoder};
use super::validate::UploadValidator;

/// Loaded models and settings shared by every request.
///
/// Built once at startup and never mutated; cloning is cheap.
#[derive(Clone)]
pub struct Captioner {
    inner: Arc<Inner>,
}

struct Inner {
    vocabulary: Vocabulary,
    extractor: Arc<dyn FeatureExtractor>,
    predictor: Arc<dyn SequencePredictor>,
    decoder: CaptionDecoder,
    image_decoder: ImageDecoder,
    validator: UploadValidator,
    extractor_config: ExtractorConfig,
    limits: LimitsConfig,
}

struct Inference {
    caption: DecodedCaption,
    extract_time: Duration,
    generate_time: Duration,
}

impl Captioner {
    /// Load the vocabulary and both models named by `config`.
    ///
    /// Any missing or corrupt artifact is an error; there is no fallback.
    pub fn load(config: &Config) -> Result<Self> {
        let vocabulary = Vocabulary::load(
            &config.vocabulary_path(),
            &config.decoder.start_token,
            &config.decoder.end_token,
        )?;
        let extractor = OnnxFeatureExtractor::load(
            &config.extractor_model_path(),
            config.extractor.output.clone(),
        )?;
        let predictor = OnnxSequencePredictor::load(&config.decoder_model_path(), &config.decoder)?;

        Ok(Self::from_parts(
            config,
            vocabulary,
            Arc::new(extractor),
            Arc::new(predictor),
        ))
    }

    /// Assemble a captioner from already-built collaborators.
    pub fn from_parts(
        config: &Config,
        vocabulary: Vocabulary,
        extractor: Arc<dyn FeatureExtractor>,
        predictor: Arc<dyn SequencePredictor>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                vocabulary,
                extractor,
                predictor,
                decoder: CaptionDecoder::from_config(&config.decoder),
                image_decoder: ImageDecoder::new(config.limits.clone()),
                validator: UploadValidator::new(config.limits.clone()),
                extractor_config: config.extractor.clone(),
                limits: config.limits.clone(),
            }),
        }
    }

    /// The loaded vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.inner.vocabulary
    }

    /// Decoding step bound.
    pub fn max_length(&self) -> usize {
        self.inner.decoder.max_length()
    }

    /// Upload size limit in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.inner.limits.max_file_size_bytes()
    }

    /// Caption an uploaded image.
    ///
    /// `name` is the client-supplied file name, used for logging and errors.
    pub async fn caption_bytes(
        &self,
        bytes: Vec<u8>,
        name: &str,
    ) -> PipelineResult<CaptionOutcome> {
        let start = Instant::now();
        tracing::debug!("Captioning: {:?} ({} bytes)", name, bytes.len());

        self.inner.validator.validate(&bytes, name)?;
        let decoded = self.inner.image_decoder.decode_bytes(bytes, name).await?;
        let decode_time = start.elapsed();
        tracing::trace!("  Decode: {:?}", decode_time);

        let width = decoded.width;
        let height = decoded.height;
        let format = format_to_string(decoded.format);
        let file_size = decoded.file_size;
        let image = decoded.image;

        let inner = Arc::clone(&self.inner);
        let timeout_ms = self.inner.limits.caption_timeout_ms;
        let result = timeout(Duration::from_millis(timeout_ms), async move {
            tokio::task::spawn_blocking(move || inner.infer(&image)).await
        })
        .await;

        let inference = match result {
            Ok(Ok(Ok(inference))) => inference,
            Ok(Ok(Err(e))) => return Err(e),
            Ok(Err(e)) => {
                return Err(PipelineError::Predict {
                    message: format!("Task join error: {}", e),
                })
            }
            Err(_) => {
                return Err(PipelineError::Timeout {
                    name: name.to_string(),
                    stage: "caption".to_string(),
                    timeout_ms,
                })
            }
        };
        tracing::trace!("  Extract: {:?}", inference.extract_time);
        tracing::trace!("  Generate: {:?}", inference.generate_time);

        let total_time = start.elapsed();
        tracing::debug!(
            "Captioned {:?} in {:?} ({}x{}, {} steps)",
            name,
            total_time,
            width,
            height,
            inference.caption.steps
        );

        let DecodedCaption {
            text,
            tokens,
            steps,
            stop_reason,
        } = inference.caption;

        Ok(CaptionOutcome {
            caption: text,
            tokens,
            steps,
            stop_reason,
            width,
            height,
            format,
            file_size,
            timings: CaptionTimings {
                decode_ms: decode_time.as_millis() as u64,
                extract_ms: inference.extract_time.as_millis() as u64,
                generate_ms: inference.generate_time.as_millis() as u64,
                total_ms: total_time.as_millis() as u64,
            },
        })
    }

    /// Caption an image file on disk.
    pub async fn caption_file(&self, path: &Path) -> Result<CaptionOutcome> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        Ok(self.caption_bytes(bytes, &name).await?)
    }
}

impl Inner {
    /// Preprocess, extract features and decode. CPU-bound; runs on the blocking pool.
    fn infer(&self, image: &DynamicImage) -> PipelineResult<Inference> {
        let extract_start = Instant::now();
        let tensor = preprocess(
            image,
            self.extractor_config.image_size,
            self.extractor_config.resize_filter.into(),
            self.extractor_config.layout,
        );
        let embedding = self.extractor.extract(&tensor)?;
        let extract_time = extract_start.elapsed();

        let generate_start = Instant::now();
        let caption = self
            .decoder
            .decode(&embedding, &self.vocabulary, self.predictor.as_ref())?;
        let generate_time = generate_start.elapsed();

        Ok(Inference {
            caption,
            extract_time,
            generate_time,
        })
    }
}
