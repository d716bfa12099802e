//! Greedy autoregressive caption decoding.
//!
//! Starting from the start marker, the decoder asks the predictor for the next
//! token, appends the highest-scoring one and repeats until the end marker, an
//! index with no token, or the length bound. No beam search, no sampling.

use serde::{Deserialize, Serialize};

use crate::config::{DecoderConfig, Padding};
use crate::embedding::ImageEmbedding;
use crate::error::{PipelineError, PipelineResult};
use crate::math::argmax;

use super::predictor::SequencePredictor;
use super::sequence::pad_sequence;
use super::vocabulary::Vocabulary;

/// Why decoding ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The predictor selected the end marker.
    EndToken,
    /// The predictor selected an index with no vocabulary entry.
    UnknownIndex,
    /// `max_length` steps ran without an end marker; the caption is truncated.
    MaxLength,
}

/// Result of a single decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedCaption {
    /// Display caption, markers stripped and trimmed.
    pub text: String,
    /// Generated tokens in order, without the leading start marker.
    pub tokens: Vec<String>,
    /// Number of predictor invocations.
    pub steps: usize,
    /// Why decoding ended.
    pub stop_reason: StopReason,
}

/// Greedy caption decoder.
#[derive(Debug, Clone, Copy)]
pub struct CaptionDecoder {
    max_length: usize,
    padding: Padding,
}

impl CaptionDecoder {
    /// Create a decoder bounded to `max_length` steps.
    pub fn new(max_length: usize, padding: Padding) -> Self {
        Self {
            max_length,
            padding,
        }
    }

    /// Create a decoder from the `[decoder]` config section.
    pub fn from_config(config: &DecoderConfig) -> Self {
        Self::new(config.max_length, config.padding)
    }

    /// Step bound and padded sequence length.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Padding side used for predictor input.
    pub fn padding(&self) -> Padding {
        self.padding
    }

    /// Decode a caption for `embedding`.
    ///
    /// Invokes `predictor` at most `max_length` times. Predictor errors are
    /// returned as-is; truncation and unknown indices are not errors.
    pub fn decode<P>(
        &self,
        embedding: &ImageEmbedding,
        vocabulary: &Vocabulary,
        predictor: &P,
    ) -> PipelineResult<DecodedCaption>
    where
        P: SequencePredictor + ?Sized,
    {
        let mut caption: Vec<String> = vec![vocabulary.start_token().to_string()];
        let mut stop_reason = StopReason::MaxLength;
        let mut steps = 0;

        for step in 0..self.max_length {
            let indices = vocabulary.encode(&caption);
            let sequence = pad_sequence(&indices, self.max_length, self.padding);

            let scores = predictor.predict(embedding, &sequence)?;
            steps += 1;

            let predicted = argmax(&scores).ok_or_else(|| PipelineError::Predict {
                message: "Predictor returned an empty score vector".to_string(),
            })?;

            let token = match vocabulary.token_at(predicted) {
                None => {
                    tracing::trace!(step, index = predicted, "No token for predicted index");
                    stop_reason = StopReason::UnknownIndex;
                    break;
                }
                Some(token) if token == vocabulary.end_token() => {
                    stop_reason = StopReason::EndToken;
                    break;
                }
                Some(token) => token,
            };

            tracing::trace!(step, index = predicted, token, "Predicted token");
            caption.push(token.to_string());
        }

        if stop_reason == StopReason::MaxLength {
            tracing::debug!(
                "Caption truncated at {} steps without {:?}",
                self.max_length,
                vocabulary.end_token()
            );
        }

        let text = strip_markers(
            &caption.join(" "),
            vocabulary.start_token(),
            vocabulary.end_token(),
        );
        caption.remove(0);

        Ok(DecodedCaption {
            text,
            tokens: caption,
            steps,
            stop_reason,
        })
    }
}

/// Decode a caption with default (pre) padding and return its display text.
pub fn decode<P>(
    embedding: &ImageEmbedding,
    vocabulary: &Vocabulary,
    predictor: &P,
    max_length: usize,
) -> PipelineResult<String>
where
    P: SequencePredictor + ?Sized,
{
    CaptionDecoder::new(max_length, Padding::default())
        .decode(embedding, vocabulary, predictor)
        .map(|decoded| decoded.text)
}

/// Remove every occurrence of both markers, then trim.
///
/// Repeats until stable, since removing one marker can splice together
/// another (e.g. `"startstartseqseq"`). Empty markers match nothing.
fn strip_markers(text: &str, start: &str, end: &str) -> String {
    let mut out = text.to_string();
    loop {
        let mut stripped = out.clone();
        for marker in [start, end] {
            if !marker.is_empty() {
                stripped = stripped.replace(marker, "");
            }
        }
        if stripped == out {
            break;
        }
        out = stripped;
    }
    out.trim().to_string()
}
