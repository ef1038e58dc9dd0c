//! Threshold-criterion MLD.
//!
//! The MLD is the depth where a tracer first differs from its value at the
//! reference level by more than a fixed amount (0.03 kg/m³ for potential
//! density, 0.2 °C for temperature). The crossing is refined on a regular
//! pressure grid between the bracketing samples.

/// Threshold MLD (dbar) for one tracer.
///
/// `values[0]` is the reference value. The first level `j` with
/// `|values[0] - values[j]| > threshold` brackets the crossing between
/// `pressure[j-1]` and `pressure[j]`. The difference from the reference is
/// interpolated linearly onto the grid `pressure[j-1] + k * step` running
/// up to `pressure[j] + step` (exclusive), and the deepest grid point still
/// within the threshold is returned. If no level exceeds the threshold the
/// bracket is the deepest pair of samples.
pub fn threshold_mld(pressure: &[f64], values: &[f64], threshold: f64, step: f64) -> f64 {
    let m = pressure.len();
    let reference = values[0];
    let j = values
        .iter()
        .position(|v| (reference - v).abs() > threshold)
        .unwrap_or(m - 1)
        .max(1);

    let (p0, p1) = (pressure[j - 1], pressure[j]);
    let (d0, d1) = (reference - values[j - 1], reference - values[j]);
    let gradient = (d1 - d0) / (p1 - p0);

    let n = interpolation_points(p0, p1 + step, step);
    let mut mld = p0;
    for k in 0..n {
        let p = p0 + k as f64 * step;
        if (d0 + gradient * (p - p0)).abs() < threshold {
            mld = p;
        }
    }
    mld
}

/// Number of points in `start, start + step, ...` strictly below `stop`.
fn interpolation_points(start: f64, stop: f64, step: f64) -> usize {
    let n = ((stop - start) / step).ceil();
    if n.is_finite() && n > 0.0 { n as usize } else { 0 }
}
