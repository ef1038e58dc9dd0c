//! Vertical gradients and the gradient-criterion MLD.
//!
//! Gradients are first differences `Δx/Δp` between consecutive levels, so a
//! profile with `m` levels has `m - 1` slopes. The smoothed gradient is a
//! 3-point running mean of the slopes (`m - 3` values); entry `k` of the
//! smoothed array is centred on level `k + 1`.

/// First differences `Δvalues / Δpressure`.
///
/// Pressures must be strictly increasing.
pub fn slopes(pressure: &[f64], values: &[f64]) -> Vec<f64> {
    pressure
        .windows(2)
        .zip(values.windows(2))
        .map(|(p, v)| (v[1] - v[0]) / (p[1] - p[0]))
        .collect()
}

/// 3-point running mean; the output is two samples shorter than the input.
pub fn smooth3(slopes: &[f64]) -> Vec<f64> {
    slopes
        .windows(3)
        .map(|w| (w[0] + w[1] + w[2]) / 3.0)
        .collect()
}

/// Level index of the gradient-criterion MLD.
///
/// The first slope whose magnitude exceeds `threshold` marks the base of
/// the layer. If none does, the steepest slope is used instead. Slope `k`
/// spans levels `k..=k+1`, and the deeper level is returned.
pub fn gradient_mld_index(slopes: &[f64], threshold: f64) -> usize {
    let k = slopes
        .iter()
        .position(|s| s.abs() > threshold)
        .unwrap_or_else(|| {
            let magnitude: Vec<f64> = slopes.iter().map(|s| s.abs()).collect();
            first_argmax(&magnitude)
        });
    k + 1
}

/// Index of the first occurrence of the maximum.
///
/// Returns 0 for an empty slice.
pub fn first_argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Index of the last occurrence of the maximum.
///
/// Returns 0 for an empty slice.
pub fn last_argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v >= values[best] {
            best = i;
        }
    }
    best
}

/// Index of the last occurrence of the minimum.
pub fn last_argmin(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v <= values[best] {
            best = i;
        }
    }
    best
}
