//! Numeric helpers for rate computation and interpolation.

/// Returns `count / total`, or 0 for an empty population.
pub(crate) fn ratio(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Intersects the segment `(prev_a, prev_b) -> (a, b)` of two rate curves.
///
/// Returns the common value at which curve `a` (rising) meets curve `b`
/// (falling) when both are linearly interpolated between the two samples.
pub(crate) fn crossing_point(prev_a: f64, prev_b: f64, a: f64, b: f64) -> f64 {
    (-prev_a * b + prev_b * a) / (prev_b - prev_a - b + a)
}
