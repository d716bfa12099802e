//! Caption generation from image embeddings.
//!
//! - **vocabulary**: token ↔ index mapping with start/end markers
//! - **sequence**: fixed-length padding of the partial caption
//! - **predictor**: next-token scoring (trait + ONNX implementation)
//! - **decoder**: the greedy decoding loop

pub mod decoder;
pub mod predictor;
pub mod sequence;
pub mod vocabulary;

pub use decoder::{decode, CaptionDecoder, DecodedCaption, StopReason};
pub use predictor::{OnnxSequencePredictor, SequencePredictor};
pub use sequence::pad_sequence;
pub use vocabulary::Vocabulary;
