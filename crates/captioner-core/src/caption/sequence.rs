//! Fixed-length sequence padding for the predictor input.

use crate::config::Padding;

/// Value used for padded positions.
pub const PAD_VALUE: i64 = 0;

/// Pad (or truncate) `indices` to exactly `max_length` entries.
///
/// With [`Padding::Pre`] zeros come first and, when too long, the oldest
/// indices are dropped. [`Padding::Post`] mirrors both choices.
pub fn pad_sequence(indices: &[i64], max_length: usize, padding: Padding) -> Vec<i64> {
    let mut padded = vec![PAD_VALUE; max_length];
    let kept = indices.len().min(max_length);

    match padding {
        Padding::Pre => {
            let src = &indices[indices.len() - kept..];
            padded[max_length - kept..].copy_from_slice(src);
        }
        Padding::Post => {
            padded[..kept].copy_from_slice(&indices[..kept]);
        }
    }

    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pre_padding_right_aligns() {
        assert_eq!(pad_sequence(&[1, 2, 3], 6, Padding::Pre), vec![0, 0, 0, 1, 2, 3]);
    }

    #[test]
    fn test_post_padding_left_aligns() {
        assert_eq!(pad_sequence(&[1, 2, 3], 6, Padding::Post), vec![1, 2, 3, 0, 0, 0]);
    }

    #[test]
    fn test_pre_truncation_keeps_latest() {
        assert_eq!(pad_sequence(&[1, 2, 3, 4, 5], 3, Padding::Pre), vec![3, 4, 5]);
    }

    #[test]
    fn test_post_truncation_keeps_earliest() {
        assert_eq!(pad_sequence(&[1, 2, 3, 4, 5], 3, Padding::Post), vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_sequence_is_all_padding() {
        assert_eq!(pad_sequence(&[], 4, Padding::Pre), vec![0; 4]);
    }

    #[test]
    fn test_exact_length_unchanged() {
        assert_eq!(pad_sequence(&[7, 8], 2, Padding::Pre), vec![7, 8]);
        assert_eq!(pad_sequence(&[7, 8], 2, Padding::Post), vec![7, 8]);
    }
}
