//! Core data types returned by the captioning pipeline.

use serde::{Deserialize, Serialize};

use crate::caption::StopReason;

/// The complete output for a captioned image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionOutcome {
    // === Caption ===
    /// Display caption, markers stripped
    pub caption: String,

    /// Generated tokens in order
    pub tokens: Vec<String>,

    /// Number of predictor invocations
    pub steps: usize,

    /// Why decoding ended
    pub stop_reason: StopReason,

    // === Image Properties ===
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Detected format ("jpeg", "png", "webp", etc.)
    pub format: String,

    /// Upload size in bytes
    pub file_size: u64,

    /// Per-stage timings
    pub timings: CaptionTimings,
}

/// Wall-clock time spent in each stage, in milliseconds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CaptionTimings {
    /// Validation and image decoding
    pub decode_ms: u64,

    /// Preprocessing and feature extraction
    pub extract_ms: u64,

    /// Greedy caption decoding
    pub generate_ms: u64,

    /// End to end
    pub total_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serializes_stop_reason_snake_case() {
        let outcome = CaptionOutcome {
            caption: "a dog running".into(),
            tokens: vec!["a".into(), "dog".into(), "running".into()],
            steps: 4,
            stop_reason: StopReason::EndToken,
            width: 640,
            height: 480,
            format: "jpeg".into(),
            file_size: 1024,
            timings: CaptionTimings::default(),
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["caption"], "a dog running");
        assert_eq!(json["stop_reason"], "end_token");
        assert_eq!(json["timings"]["total_ms"], 0);
    }
}
