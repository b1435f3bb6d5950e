use crate::StoreError;

/// Cosine of the angle between `a` and `b`.
///
/// Returns `0.0` when either side has zero magnitude. The result lies in
/// `[-1, 1]` up to floating point rounding.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, StoreError> {
    if a.len() != b.len() {
        return Err(StoreError::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }

    // Accumulate in f64: squares of large f32 components overflow f32.
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())) as f32)
}
