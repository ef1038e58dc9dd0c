//! Piecewise straight-line fits to the mixed layer and the thermocline.
//!
//! # Mathematical Background
//!
//! Each tracer profile x(p) is approximated by two lines:
//!
//! ```text
//! mixed layer:  x ≈ a₁ + b₁ p   fitted on the near-surface samples
//! thermocline:  x ≈ a₂ + b₂ p   fitted on three samples around max |∂x/∂p|
//! ```
//!
//! The mixed-layer window grows from two samples one level at a time. The
//! squared-residual error of every window is normalised by the sum over all
//! windows, and the deepest window whose normalised error stays below the
//! tolerance defines the mixed segment. The pressure where the two lines
//! come closest is a candidate MLD.
//!
//! Fits use the normal equations on coordinates shifted to the first sample,
//! so a tracer that is constant over a window has exactly zero residual.

use faer::{Mat, linalg::solvers::Solve};

use super::error::NumericalFailure;
use super::gradient::{last_argmax, last_argmin};

/// A fitted line `y = y0 + offset + slope * (x - x0)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineFit {
    x0: f64,
    y0: f64,
    /// Intercept relative to (x0, y0)
    pub offset: f64,
    /// dy/dx
    pub slope: f64,
}

impl LineFit {
    /// Evaluate the line at `x`.
    #[inline]
    pub fn evaluate(&self, x: f64) -> f64 {
        self.y0 + self.offset + self.slope * (x - self.x0)
    }

    /// Intercept at x = 0.
    pub fn intercept(&self) -> f64 {
        self.evaluate(0.0)
    }

    /// Sum of squared residuals over the given samples.
    pub fn squared_error(&self, x: &[f64], y: &[f64]) -> f64 {
        x.iter()
            .zip(y.iter())
            .map(|(&xi, &yi)| {
                let r = (yi - self.y0) - (self.offset + self.slope * (xi - self.x0));
                r * r
            })
            .sum()
    }
}

/// Least-squares straight line through `(x, y)`.
///
/// # Errors
/// `NumericalFailure::DegenerateFit` if fewer than two distinct `x` values are given.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LineFit, NumericalFailure> {
    let n = x.len().min(y.len());
    if n == 0 {
        return Err(NumericalFailure::DegenerateFit { samples: 0 });
    }

    let x0 = x[0];
    let y0 = y[0];
    if x[..n].iter().all(|&xi| xi == x0) {
        return Err(NumericalFailure::DegenerateFit { samples: 1 });
    }

    // Normal equations (A'A) β = A'y with A = [1, x - x0]
    let mut ata = Mat::<f64>::zeros(2, 2);
    let mut aty = Mat::<f64>::zeros(2, 1);
    for k in 0..n {
        let dx = x[k] - x0;
        let dy = y[k] - y0;
        ata[(0, 0)] += 1.0;
        ata[(0, 1)] += dx;
        ata[(1, 0)] += dx;
        ata[(1, 1)] += dx * dx;
        aty[(0, 0)] += dy;
        aty[(1, 0)] += dx * dy;
    }

    let lu = ata.as_ref().full_piv_lu();
    let beta = lu.solve(&aty);

    let offset = beta[(0, 0)];
    let slope = beta[(1, 0)];
    if !offset.is_finite() || !slope.is_finite() {
        return Err(NumericalFailure::DegenerateFit { samples: n });
    }

    Ok(LineFit {
        x0,
        y0,
        offset,
        slope,
    })
}

/// Deepest index of the mixed segment for one tracer.
///
/// Error entry `j` belongs to the window `0..=j` (entry 0 is the empty
/// placeholder with zero error). Returns the last `j` whose normalised
/// error is below `tolerance`. A tracer with zero total error is linear
/// over the whole record, which is then treated as one mixed segment.
pub fn mixed_layer_extent(
    pressure: &[f64],
    values: &[f64],
    tolerance: f64,
) -> Result<usize, NumericalFailure> {
    let m = pressure.len();
    let mut errors = Vec::with_capacity(m);
    errors.push(0.0);
    for j in 2..=m {
        let fit = fit_line(&pressure[..j], &values[..j])?;
        errors.push(fit.squared_error(&pressure[..j], &values[..j]));
    }

    let total: f64 = errors.iter().sum();
    if total == 0.0 {
        return Ok(m - 1);
    }
    if !total.is_finite() {
        return Err(NumericalFailure::NoAllowableFit);
    }

    errors
        .iter()
        .rposition(|&e| e / total < tolerance)
        .ok_or(NumericalFailure::NoAllowableFit)
}

/// Index of the last minimum of |thermocline − mixed| over the profile.
///
/// `None` when one line lies strictly above the other at every level,
/// i.e. the fits never cross inside the record.
pub fn intersection_index(pressure: &[f64], mixed: &LineFit, thermocline: &LineFit) -> Option<usize> {
    let diff: Vec<f64> = pressure
        .iter()
        .map(|&p| thermocline.evaluate(p) - mixed.evaluate(p))
        .collect();

    if diff.iter().all(|&d| d > 0.0) || diff.iter().all(|&d| d < 0.0) {
        return None;
    }

    let distance: Vec<f64> = diff.iter().map(|d| d.abs()).collect();
    Some(last_argmin(&distance))
}

/// Both fits for one tracer plus the derived candidate MLD.
#[derive(Clone, Copy, Debug)]
pub struct TracerFit {
    /// Last index of the mixed segment
    pub upper_layer: usize,
    /// Line through the mixed segment
    pub mixed: LineFit,
    /// Index of the smoothed-gradient extremum (centre of the thermocline)
    pub extremum: usize,
    /// Line through the thermocline
    pub thermocline: LineFit,
    /// Index where the two lines meet, if they do
    pub intersection: Option<usize>,
}

impl TracerFit {
    /// Fit mixed layer and thermocline for one tracer.
    ///
    /// `smoothed_slope` is the 3-point smoothed gradient, two samples
    /// shorter than the slope array.
    pub fn compute(
        pressure: &[f64],
        values: &[f64],
        smoothed_slope: &[f64],
        tolerance: f64,
    ) -> Result<Self, NumericalFailure> {
        let upper_layer = mixed_layer_extent(pressure, values, tolerance)?;
        let mixed = fit_line(&pressure[..=upper_layer], &values[..=upper_layer])?;

        let magnitude: Vec<f64> = smoothed_slope.iter().map(|s| s.abs()).collect();
        let extremum = last_argmax(&magnitude) + 1;
        let thermocline = fit_line(
            &pressure[extremum - 1..=extremum + 1],
            &values[extremum - 1..=extremum + 1],
        )?;

        let intersection = intersection_index(pressure, &mixed, &thermocline);

        Ok(Self {
            upper_layer,
            mixed,
            extremum,
            thermocline,
            intersection,
        })
    }
}
