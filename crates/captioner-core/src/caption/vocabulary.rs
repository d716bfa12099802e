//! Caption vocabulary: token ↔ index mapping loaded from a tokenizer artifact.
//!
//! Two artifact shapes are accepted:
//! - a plain JSON object `{"token": index, ...}`
//! - a Keras `Tokenizer.to_json()` export, where `config.word_index` is itself
//!   a JSON-encoded string and `num_words` / `oov_token` are optional.
//!
//! The inverse mapping is built once here so decoding never scans the
//! forward map.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{PipelineError, PipelineResult};

#[derive(Deserialize)]
#[serde(untagged)]
enum TokenizerArtifact {
    Keras(KerasTokenizer),
    Plain(HashMap<String, usize>),
}

#[derive(Deserialize)]
struct KerasTokenizer {
    config: KerasTokenizerConfig,
}

#[derive(Deserialize)]
struct KerasTokenizerConfig {
    word_index: String,
    #[serde(default)]
    num_words: Option<usize>,
    #[serde(default)]
    oov_token: Option<String>,
}

/// Bidirectional token ↔ index mapping with start and end markers.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    word_index: HashMap<String, usize>,
    index_word: HashMap<usize, String>,
    start_token: String,
    end_token: String,
    /// Indices at or above this bound are not produced by `encode`.
    num_words: Option<usize>,
    /// Index that unknown (or out-of-bound) tokens encode to.
    oov_index: Option<usize>,
}

impl Vocabulary {
    /// Load a vocabulary from a tokenizer JSON artifact.
    pub fn load(path: &Path, start_token: &str, end_token: &str) -> PipelineResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::Vocabulary {
            message: format!("Failed to read {:?}: {}", path, e),
        })?;
        let artifact: TokenizerArtifact =
            serde_json::from_str(&content).map_err(|e| PipelineError::Vocabulary {
                message: format!("Failed to parse {:?}: {}", path, e),
            })?;

        let vocab = match artifact {
            TokenizerArtifact::Plain(word_index) => {
                Self::from_word_index(word_index, start_token, end_token)?
            }
            TokenizerArtifact::Keras(tokenizer) => {
                let word_index: HashMap<String, usize> =
                    serde_json::from_str(&tokenizer.config.word_index).map_err(|e| {
                        PipelineError::Vocabulary {
                            message: format!("Failed to parse word_index in {:?}: {}", path, e),
                        }
                    })?;
                let mut vocab = Self::from_word_index(word_index, start_token, end_token)?;
                vocab.num_words = tokenizer.config.num_words;
                if let Some(oov) = tokenizer.config.oov_token {
                    vocab = vocab.with_oov_token(&oov)?;
                }
                vocab
            }
        };

        tracing::info!(
            "Loaded vocabulary: {} tokens from {:?} (hash {})",
            vocab.len(),
            path,
            &vocab.content_hash()[..12],
        );

        Ok(vocab)
    }

    /// Build a vocabulary from an in-memory token → index map.
    ///
    /// Fails if two tokens share an index, or a marker is blank, missing, or
    /// equal to the other marker.
    pub fn from_word_index(
        word_index: HashMap<String, usize>,
        start_token: &str,
        end_token: &str,
    ) -> PipelineResult<Self> {
        if start_token.trim().is_empty() || end_token.trim().is_empty() {
            return Err(PipelineError::Vocabulary {
                message: "Start and end markers must not be blank".to_string(),
            });
        }
        if start_token == end_token {
            return Err(PipelineError::Vocabulary {
                message: format!("Start and end markers must differ (both {:?})", start_token),
            });
        }

        let mut index_word = HashMap::with_capacity(word_index.len());
        for (word, &idx) in &word_index {
            if let Some(existing) = index_word.insert(idx, word.clone()) {
                return Err(PipelineError::Vocabulary {
                    message: format!(
                        "Index {} is assigned to both {:?} and {:?}",
                        idx, existing, word
                    ),
                });
            }
        }

        for marker in [start_token, end_token] {
            if !word_index.contains_key(marker) {
                return Err(PipelineError::Vocabulary {
                    message: format!("Marker token {:?} is missing from the vocabulary", marker),
                });
            }
        }

        if index_word.contains_key(&0) {
            tracing::warn!("Vocabulary assigns index 0, which is also the padding value");
        }

        Ok(Self {
            word_index,
            index_word,
            start_token: start_token.to_string(),
            end_token: end_token.to_string(),
            num_words: None,
            oov_index: None,
        })
    }

    /// Limit encoding to indices below `num_words`.
    pub fn with_num_words(mut self, num_words: usize) -> Self {
        self.num_words = Some(num_words);
        self
    }

    /// Encode unknown tokens to the index of `oov_token` instead of dropping them.
    pub fn with_oov_token(mut self, oov_token: &str) -> PipelineResult<Self> {
        let idx = self
            .word_index
            .get(oov_token)
            .copied()
            .ok_or_else(|| PipelineError::Vocabulary {
                message: format!("OOV token {:?} is missing from the vocabulary", oov_token),
            })?;
        self.oov_index = Some(idx);
        Ok(self)
    }

    /// Index of a token, if present.
    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.word_index.get(token).copied()
    }

    /// Token at an index, if any.
    pub fn token_at(&self, index: usize) -> Option<&str> {
        self.index_word.get(&index).map(String::as_str)
    }

    /// Map tokens to indices.
    ///
    /// Unknown tokens are dropped unless an OOV token is configured; indices at
    /// or above `num_words` are treated the same way.
    pub fn encode<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<i64> {
        tokens
            .iter()
            .filter_map(|token| match self.index_of(token.as_ref()) {
                Some(idx) if self.num_words.is_some_and(|n| idx >= n) => self.oov_index,
                Some(idx) => Some(idx),
                None => self.oov_index,
            })
            .map(|idx| idx as i64)
            .collect()
    }

    /// Start-of-caption marker.
    pub fn start_token(&self) -> &str {
        &self.start_token
    }

    /// End-of-caption marker.
    pub fn end_token(&self) -> &str {
        &self.end_token
    }

    /// Number of tokens in the vocabulary.
    pub fn len(&self) -> usize {
        self.word_index.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.word_index.is_empty()
    }

    /// BLAKE3 hash of all `token\tindex` pairs in index order.
    ///
    /// Identifies which tokenizer a running service was started with.
    pub fn content_hash(&self) -> String {
        let mut entries: Vec<(&usize, &String)> = self.index_word.iter().collect();
        entries.sort_unstable_by_key(|(idx, _)| **idx);

        let mut hasher = blake3::Hasher::new();
        for (idx, word) in entries {
            hasher.update(word.as_bytes());
            hasher.update(b"\t");
            hasher.update(idx.to_string().as_bytes());
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_index(pairs: &[(&str, usize)]) -> HashMap<String, usize> {
        pairs.iter().map(|(w, i)| (w.to_string(), *i)).collect()
    }

    fn sample() -> Vocabulary {
        Vocabulary::from_word_index(
            word_index(&[
                ("startseq", 1),
                ("a", 2),
                ("dog", 3),
                ("running", 4),
                ("endseq", 5),
            ]),
            "startseq",
            "endseq",
        )
        .unwrap()
    }

    #[test]
    fn test_bidirectional_lookup() {
        let vocab = sample();
        assert_eq!(vocab.len(), 5);
        assert_eq!(vocab.index_of("dog"), Some(3));
        assert_eq!(vocab.token_at(3), Some("dog"));
        assert_eq!(vocab.token_at(0), None);
        assert_eq!(vocab.token_at(99), None);
    }

    #[test]
    fn test_duplicate_index_rejected() {
        let err = Vocabulary::from_word_index(
            word_index(&[("startseq", 1), ("endseq", 2), ("cat", 2)]),
            "startseq",
            "endseq",
        )
        .unwrap_err();
        assert!(err.to_string().contains("Index 2"));
    }

    #[test]
    fn test_missing_marker_rejected() {
        let err = Vocabulary::from_word_index(
            word_index(&[("startseq", 1), ("cat", 2)]),
            "startseq",
            "endseq",
        )
        .unwrap_err();
        assert!(err.to_string().contains("endseq"));
    }

    #[test]
    fn test_blank_marker_rejected() {
        let err = Vocabulary::from_word_index(
            word_index(&[("", 1), ("a", 2), ("endseq", 3)]),
            "",
            "endseq",
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Vocabulary { .. }));
        assert!(err.to_string().contains("blank"));

        let err = Vocabulary::from_word_index(
            word_index(&[("startseq", 1), (" ", 2)]),
            "startseq",
            " ",
        )
        .unwrap_err();
        assert!(err.to_string().contains("blank"));
    }

    #[test]
    fn test_identical_markers_rejected() {
        let err = Vocabulary::from_word_index(
            word_index(&[("seq", 1), ("a", 2)]),
            "seq",
            "seq",
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Vocabulary { .. }));
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn test_load_rejects_blank_marker_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokenizer.json");
        std::fs::write(&path, r#"{"": 1, "a": 2, "endseq": 3}"#).unwrap();

        let err = Vocabulary::load(&path, "", "endseq").unwrap_err();
        assert!(matches!(err, PipelineError::Vocabulary { .. }));
    }

    #[test]
    fn test_encode_drops_unknown_tokens() {
        let vocab = sample();
        assert_eq!(vocab.encode(&["startseq", "zebra", "dog"]), vec![1, 3]);
    }

    #[test]
    fn test_encode_with_oov_and_num_words() {
        let vocab = Vocabulary::from_word_index(
            word_index(&[("<unk>", 1), ("startseq", 2), ("endseq", 3), ("a", 4), ("rare", 9)]),
            "startseq",
            "endseq",
        )
        .unwrap()
        .with_num_words(5)
        .with_oov_token("<unk>")
        .unwrap();

        assert_eq!(vocab.encode(&["startseq", "zebra", "a", "rare"]), vec![2, 1, 4, 1]);
    }

    #[test]
    fn test_num_words_without_oov_drops() {
        let vocab = sample().with_num_words(3);
        assert_eq!(vocab.encode(&["startseq", "a", "dog"]), vec![1, 2]);
    }

    #[test]
    fn test_load_plain_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.json");
        std::fs::write(&path, r#"{"startseq": 1, "a": 2, "endseq": 3}"#).unwrap();

        let vocab = Vocabulary::load(&path, "startseq", "endseq").unwrap();
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.token_at(2), Some("a"));
    }

    #[test]
    fn test_load_keras_tokenizer_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokenizer.json");
        let word_index = r#"{"startseq": 1, "endseq": 2, "a": 3, "dog": 4}"#;
        let artifact = serde_json::json!({
            "class_name": "Tokenizer",
            "config": {
                "num_words": null,
                "filters": "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n",
                "lower": true,
                "split": " ",
                "char_level": false,
                "oov_token": null,
                "document_count": 2,
                "word_index": word_index,
            }
        });
        std::fs::write(&path, artifact.to_string()).unwrap();

        let vocab = Vocabulary::load(&path, "startseq", "endseq").unwrap();
        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.index_of("dog"), Some(4));
        assert_eq!(vocab.end_token(), "endseq");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Vocabulary::load(Path::new("/nonexistent/tokenizer.json"), "s", "e").unwrap_err();
        assert!(matches!(err, PipelineError::Vocabulary { .. }));
    }

    #[test]
    fn test_content_hash_is_order_independent_of_map() {
        let a = sample();
        let b = sample();
        assert_eq!(a.content_hash(), b.content_hash());

        let c = Vocabulary::from_word_index(
            word_index(&[("startseq", 1), ("a", 2), ("cat", 3), ("endseq", 5)]),
            "startseq",
            "endseq",
        )
        .unwrap();
        assert_ne!(a.content_hash(), c.content_hash());
    }
}
