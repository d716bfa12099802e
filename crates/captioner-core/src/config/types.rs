//! Sub-configuration structs and their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where model and vocabulary artifacts are stored
    pub model_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.captioner/models"),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Allow any origin, method and header (development setting)
    pub cors_allow_any: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_allow_any: true,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upload size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Feature extraction + caption decoding timeout in milliseconds
    pub caption_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
            caption_timeout_ms: 30000,
        }
    }
}

impl LimitsConfig {
    /// Upload size limit in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

/// Memory layout of the image tensor fed to the feature extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// `[batch, height, width, channels]` (Keras / TensorFlow exports)
    Nhwc,
    /// `[batch, channels, height, width]` (PyTorch exports)
    Nchw,
}

/// Resampling filter used when resizing to the extractor input size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl From<ResizeFilter> for image::imageops::FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => image::imageops::FilterType::Nearest,
            ResizeFilter::Triangle => image::imageops::FilterType::Triangle,
            ResizeFilter::CatmullRom => image::imageops::FilterType::CatmullRom,
            ResizeFilter::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Feature extractor (CNN encoder) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// ONNX model file, relative to `general.model_dir` unless absolute
    pub model: PathBuf,

    /// Square input size in pixels
    pub image_size: u32,

    /// Input tensor layout
    pub layout: TensorLayout,

    /// Resize filter. The training-time loader used nearest-neighbour.
    pub resize_filter: ResizeFilter,

    /// Output tensor holding the embedding; first output when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            model: PathBuf::from("mobilenet_v2.onnx"),
            image_size: 224,
            layout: TensorLayout::Nhwc,
            resize_filter: ResizeFilter::Nearest,
            output: None,
        }
    }
}

/// Side on which sequences are padded (and truncated) to `max_length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Padding {
    /// Zeros first; tokens occupy the rightmost positions
    #[default]
    Pre,
    /// Tokens first; zeros fill the tail
    Post,
}

/// Element type of the padded sequence input of the predictor model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceDtype {
    Float32,
    Int64,
}

/// Caption decoder (sequence predictor) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// ONNX model file, relative to `general.model_dir` unless absolute
    pub model: PathBuf,

    /// Upper bound on decoding steps and padded sequence length
    pub max_length: usize,

    /// Padding side; must match how the predictor was trained
    pub padding: Padding,

    /// Element type of the sequence input tensor
    pub sequence_dtype: SequenceDtype,

    /// Start-of-caption marker
    pub start_token: String,

    /// End-of-caption marker
    pub end_token: String,

    /// Name of the image-features input; first model input when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_input: Option<String>,

    /// Name of the sequence input; second model input when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_input: Option<String>,

    /// Name of the score output; first model output when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            model: PathBuf::from("caption_model.onnx"),
            max_length: 34,
            padding: Padding::Pre,
            sequence_dtype: SequenceDtype::Float32,
            start_token: "startseq".to_string(),
            end_token: "endseq".to_string(),
            image_input: None,
            sequence_input: None,
            output: None,
        }
    }
}

/// Vocabulary artifact settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Tokenizer JSON file, relative to `general.model_dir` unless absolute
    pub file: PathBuf,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("tokenizer.json"),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
