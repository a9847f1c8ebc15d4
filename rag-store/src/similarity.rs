/// Cosine similarity of two vectors, in `[-1, 1]`.
///
/// `None` when the lengths differ or the vectors are empty. A zero-norm
/// vector yields `Some(0.0)`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        Some(0.0)
    } else {
        Some((dot / denom).clamp(-1.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_and_opposite() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]), Some(1.0));
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), Some(-1.0));
    }

    #[test]
    fn orthogonal_and_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]), Some(0.0));
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 3.0]), Some(0.0));
    }

    #[test]
    fn dimension_mismatch_is_none() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), None);
        assert_eq!(cosine_similarity(&[], &[]), None);
    }
}
