//! Shared math utilities.

/// Index of the largest score, scanning left to right.
///
/// Ties resolve to the lowest index. NaN never compares greater, so it can
/// only be selected when every entry is NaN (index 0). Returns `None` for an
/// empty slice.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let (first, rest) = scores.split_first()?;
    let mut best_idx = 0;
    let mut best = *first;
    for (i, &score) in rest.iter().enumerate() {
        if score > best || (best.is_nan() && !score.is_nan()) {
            best = score;
            best_idx = i + 1;
        }
    }
    Some(best_idx)
}
