//! Holte & Talley mixed-layer-depth algorithm.
//!
//! The MLD of a profile is estimated from several independent candidates:
//!
//! - **Threshold**: first departure from the reference value by a fixed amount
//! - **Gradient**: first vertical gradient above a fixed magnitude
//! - **Fit intersection**: where a line through the mixed layer meets a line
//!   through the thermocline
//! - **Extrema**: depth of temperature maxima, salinity/density minima and
//!   subsurface intrusions
//!
//! A season classification (winter-like or summer-like) and three decision
//! trees, one per tracer, pick the final MLD among the candidates. The leaf
//! reached in each tree is reported as an analysis code.
//!
//! # Example
//!
//! ```
//! use mld_rs::mld::{MldConfig, compute_mixed_layer_depth};
//! use mld_rs::profile::Profile;
//!
//! let pressure: Vec<f64> = (1..=100).map(|i| i as f64).collect();
//! let temperature: Vec<f64> = pressure
//!     .iter()
//!     .map(|&p| if p <= 50.0 { 20.0 } else { 20.0 - 0.2 * (p - 50.0) })
//!     .collect();
//! let salinity = vec![35.0; pressure.len()];
//!
//! let profile = Profile::new(pressure, temperature, salinity).unwrap();
//! let result = compute_mixed_layer_depth(&profile, &MldConfig::default()).unwrap();
//! assert!((result.threshold_temperature - 51.0).abs() < 1.0);
//! ```

mod config;
pub mod decision;
mod error;
pub mod fit;
pub mod gradient;
mod result;
pub mod threshold;

pub use config::{ConfigError, MldConfig};
pub use error::{InsufficientData, MldError, NumericalFailure};
pub use result::{BranchCodes, MldResult, TracerMeans};

use tracing::{debug, info};

use crate::profile::{PreparedProfile, Profile, prepare};
use crate::seawater::{DensityModel, EquationOfState};
use decision::{Candidates, Season, depth_at, select_density, select_salinity, select_temperature};
use fit::TracerFit;
use gradient::{gradient_mld_index, last_argmax, last_argmin, slopes, smooth3};
use threshold::threshold_mld;

/// Log a diagnostic at `info` when verbose, otherwise at `debug`.
pub(crate) fn report(verbose: bool, message: impl std::fmt::Display) {
    if verbose {
        info!("{}", message);
    } else {
        debug!("{}", message);
    }
}

/// MLD estimator bound to one configuration and density model.
#[derive(Clone, Debug)]
pub struct MldAnalyzer<D: DensityModel = EquationOfState> {
    config: MldConfig,
    density: D,
}

impl MldAnalyzer<EquationOfState> {
    /// Analyzer with the UNESCO equation of state.
    ///
    /// # Errors
    /// `ConfigError::Invalid` if `config` fails validation.
    pub fn new(config: MldConfig) -> Result<Self, ConfigError> {
        Self::with_density_model(config, EquationOfState::new())
    }
}

impl<D: DensityModel> MldAnalyzer<D> {
    /// Analyzer with a custom density model.
    pub fn with_density_model(config: MldConfig, density: D) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, density })
    }

    /// The configuration in use.
    pub fn config(&self) -> &MldConfig {
        &self.config
    }

    /// Estimate the MLD of one profile.
    ///
    /// # Errors
    /// `MldError::InsufficientData` when the profile fails a precondition,
    /// `MldError::NumericalFailure` when a fitting step degenerates.
    pub fn compute(&self, profile: &Profile) -> Result<MldResult, MldError> {
        let prepared = prepare(profile, &self.config)?;
        let density = self
            .density
            .potential_density_profile(&prepared.temperature, &prepared.salinity);
        analyze(&prepared, &density, &self.config)
    }

    /// Estimate the MLD, reporting any failure as [`MldResult::nan`].
    pub fn compute_or_nan(&self, profile: &Profile) -> MldResult {
        match self.compute(profile) {
            Ok(result) => result,
            Err(MldError::NumericalFailure(reason)) => {
                report(
                    self.config.verbose,
                    format_args!("Failed to calculate MLD; bailing with nan values ({})", reason),
                );
                MldResult::nan()
            }
            // Precondition failures are logged where they are detected
            Err(_) => MldResult::nan(),
        }
    }
}

/// Estimate the MLD of one profile with the UNESCO equation of state.
///
/// # Errors
/// See [`MldAnalyzer::compute`]; an invalid `config` yields
/// `MldError::InvalidConfig`.
pub fn compute_mixed_layer_depth(profile: &Profile, config: &MldConfig) -> Result<MldResult, MldError> {
    let analyzer =
        MldAnalyzer::new(config.clone()).map_err(|e| MldError::InvalidConfig(e.to_string()))?;
    analyzer.compute(profile)
}

/// Like [`compute_mixed_layer_depth`], but every failure becomes an all-NaN result.
pub fn compute_mixed_layer_depth_or_nan(profile: &Profile, config: &MldConfig) -> MldResult {
    match MldAnalyzer::new(config.clone()) {
        Ok(analyzer) => analyzer.compute_or_nan(profile),
        Err(e) => {
            report(config.verbose, &e);
            MldResult::nan()
        }
    }
}

/// Run all estimators and decision trees on a prepared profile.
fn analyze(
    prepared: &PreparedProfile,
    density: &[f64],
    config: &MldConfig,
) -> Result<MldResult, MldError> {
    let p = prepared.pressure.as_slice();
    let t = prepared.temperature.as_slice();
    let s = prepared.salinity.as_slice();
    let m = p.len();

    let threshold_density = threshold_mld(p, density, config.density_threshold, config.interpolation_step);
    let threshold_temperature =
        threshold_mld(p, t, config.temperature_threshold, config.interpolation_step);

    let t_slope = slopes(p, t);
    let s_slope = slopes(p, s);
    let d_slope = slopes(p, density);
    let t_smooth = smooth3(&t_slope);
    let s_smooth = smooth3(&s_slope);
    let d_smooth = smooth3(&d_slope);

    let gradient_t = gradient_mld_index(&t_slope, config.temperature_gradient_threshold);
    let gradient_d = gradient_mld_index(&d_slope, config.density_gradient_threshold);

    let t_fit = TracerFit::compute(p, t, &t_smooth, config.error_tolerance)?;
    let s_fit = TracerFit::compute(p, s, &s_smooth, config.error_tolerance)?;
    let d_fit = TracerFit::compute(p, density, &d_smooth, config.error_tolerance)?;

    let t_max = last_argmax(t);
    let s_min = last_argmin(s);
    let d_min = last_argmin(density);

    // Strongest warming / freshening with depth, paired with the nearby extremum
    let warming = last_argmax(&t_smooth) + 1;
    let freshening = last_argmin(&s_smooth) + 1;
    let intrusion_t = paired_extremum(p, warming, t_max, config.intrusion_separation);
    let intrusion_s = paired_extremum(p, freshening, s_min, config.intrusion_separation);

    let temperature_step = step_across(t, &t_fit, m);
    let density_step = step_across(density, &d_fit, m);
    let season = Season::classify(temperature_step, density_step, config);

    let candidates = Candidates {
        reference: p[0],
        temperature_step,
        threshold_temperature,
        threshold_density,
        fit_temperature: depth_at(p, t_fit.intersection),
        fit_salinity: depth_at(p, s_fit.intersection),
        fit_density: depth_at(p, d_fit.intersection),
        temperature_max: p[t_max],
        density_min: p[d_min],
        gradient_temperature: p[gradient_t],
        gradient_salinity: p[s_fit.extremum],
        gradient_density: p[gradient_d],
        intrusion_temperature: depth_at(p, intrusion_t),
        intrusion_salinity: depth_at(p, intrusion_s),
    };

    let by_temperature = select_temperature(&candidates, season, config);
    let by_salinity = select_salinity(&candidates, season, by_temperature.depth, config);
    let by_density = select_density(
        &candidates,
        season,
        by_temperature.depth,
        by_salinity.depth,
        config,
    );

    debug!(
        temperature = by_temperature.depth,
        salinity = by_salinity.depth,
        density = by_density.depth,
        winter = season.density_winter,
        "Selected mixed-layer depths"
    );

    let means = |depth: f64| TracerMeans::above(depth, p, t, s, density);

    Ok(MldResult {
        mld_temperature: by_temperature.reported_depth(),
        mld_salinity: by_salinity.reported_depth(),
        mld_density: by_density.reported_depth(),
        threshold_temperature,
        threshold_density,
        gradient_temperature: candidates.gradient_temperature,
        gradient_density: candidates.gradient_density,
        mean_above_mld_temperature: means(by_temperature.depth),
        mean_above_mld_density: means(by_density.depth),
        mean_above_threshold_temperature: means(threshold_temperature),
        mean_above_threshold_density: means(threshold_density),
        analysis: Some(BranchCodes {
            temperature: by_temperature.code,
            salinity: by_salinity.code,
            density: by_density.code,
        }),
    })
}

/// Shallower of a gradient extremum and a tracer extremum, if they lie
/// within `separation` dbar of each other.
fn paired_extremum(pressure: &[f64], gradient: usize, extremum: usize, separation: f64) -> Option<usize> {
    if (pressure[gradient] - pressure[extremum]).abs() < separation {
        Some(gradient.min(extremum))
    } else {
        None
    }
}

/// Tracer change across the base of the mixed layer.
///
/// Measured over two levels from the fit intersection when it lies well
/// inside the record, otherwise across the thermocline extremum.
fn step_across(values: &[f64], fit: &TracerFit, m: usize) -> f64 {
    match fit.intersection {
        Some(i) if i < m - 3 => values[i] - values[i + 2],
        _ => values[fit.extremum - 1] - values[fit.extremum + 1],
    }
}
