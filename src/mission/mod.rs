//! Dive-series processing for a glider mission.
//!
//! Each dive's density-algorithm MLD is computed independently. A dive that
//! yields no estimate takes the last computed value of an earlier dive, and
//! every reported MLD is raised to at least `min_mld`.
//!
//! ```text
//! dive:      1      2      3      4
//! computed:  32.0   NaN    3.0    NaN
//! reported:  32.0   32.0   5.0    3.0 → 5.0
//! source:    C      P      Cl     Cl
//! ```
//!
//! The carried-forward value is the unclamped computed MLD.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::mld::{ConfigError, MldAnalyzer, MldConfig, MldResult};
use crate::profile::Profile;
use crate::seawater::{DensityModel, EquationOfState};

/// One dive of a mission.
#[derive(Clone, Debug, PartialEq)]
pub struct Dive {
    /// Dive number as assigned by the glider
    pub number: u32,
    /// Measured profile
    pub profile: Profile,
}

impl Dive {
    pub fn new(number: u32, profile: Profile) -> Self {
        Self { number, profile }
    }
}

/// Mission-level settings.
///
/// In TOML the per-dive parameters go in an `[mld]` table:
///
/// ```toml
/// min_mld = 5.0
///
/// [mld]
/// rec_cut = 10
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MissionConfig {
    /// Shallowest MLD ever reported (dbar). Default: 5
    pub min_mld: f64,
    /// Parameters of the per-dive MLD computation
    pub mld: MldConfig,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            min_mld: 5.0,
            mld: MldConfig::default(),
        }
    }
}

impl MissionConfig {
    /// Set the minimum reported MLD.
    pub fn with_min_mld(mut self, min_mld: f64) -> Self {
        self.min_mld = min_mld;
        self
    }

    /// Set the per-dive MLD configuration.
    pub fn with_mld_config(mut self, mld: MldConfig) -> Self {
        self.mld = mld;
        self
    }

    /// Parse and validate a TOML configuration.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check mission and MLD parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_mld.is_finite() && self.min_mld >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "min_mld",
                reason: format!("{} is negative or not finite", self.min_mld),
            });
        }
        self.mld.validate()
    }
}

/// Where a dive's reported MLD came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MldSource {
    /// Computed from this dive
    Computed,
    /// Carried over from an earlier dive
    PreviousDive,
    /// Raised to the mission minimum
    Clamped,
    /// No estimate for this dive or any earlier one
    Missing,
}

impl MldSource {
    /// Short label used in text output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Computed => "computed",
            Self::PreviousDive => "previous",
            Self::Clamped => "clamped",
            Self::Missing => "missing",
        }
    }

    /// Inverse of [`MldSource::label`].
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "computed" => Some(Self::Computed),
            "previous" => Some(Self::PreviousDive),
            "clamped" => Some(Self::Clamped),
            "missing" => Some(Self::Missing),
            _ => None,
        }
    }
}

/// Reported MLD of one dive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiveMld {
    /// Dive number
    pub dive: u32,
    /// Reported MLD (dbar); NaN only for `MldSource::Missing`
    pub mld: f64,
    /// Origin of `mld`
    pub source: MldSource,
    /// Full result of this dive's own computation
    pub result: MldResult,
}

impl DiveMld {
    /// Density-tree leaf of this dive's own computation, if any.
    pub fn analysis_code(&self) -> Option<u8> {
        self.result.analysis.map(|codes| codes.density)
    }
}

/// Statistics over a processed mission.
#[derive(Clone, Debug, PartialEq)]
pub struct MissionSummary {
    /// Number of dives
    pub n_dives: usize,
    /// Dives with their own estimate
    pub n_computed: usize,
    /// Dives that reused an earlier estimate
    pub n_previous: usize,
    /// Dives raised to the minimum
    pub n_clamped: usize,
    /// Dives without any estimate
    pub n_missing: usize,
    /// Mean reported MLD over dives with a value
    pub mean_mld: f64,
    /// Deepest reported MLD
    pub max_mld: f64,
}

impl MissionSummary {
    /// Summarize processed dives.
    pub fn from_results(results: &[DiveMld]) -> Self {
        let count = |source: MldSource| results.iter().filter(|r| r.source == source).count();
        let values: Vec<f64> = results
            .iter()
            .map(|r| r.mld)
            .filter(|v| v.is_finite())
            .collect();

        let (mean_mld, max_mld) = if values.is_empty() {
            (f64::NAN, f64::NAN)
        } else {
            (
                values.iter().sum::<f64>() / values.len() as f64,
                values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            )
        };

        Self {
            n_dives: results.len(),
            n_computed: count(MldSource::Computed),
            n_previous: count(MldSource::PreviousDive),
            n_clamped: count(MldSource::Clamped),
            n_missing: count(MldSource::Missing),
            mean_mld,
            max_mld,
        }
    }
}

/// Computes the MLD series of a mission.
#[derive(Clone, Debug)]
pub struct MissionProcessor<D: DensityModel = EquationOfState> {
    min_mld: f64,
    analyzer: MldAnalyzer<D>,
}

impl MissionProcessor<EquationOfState> {
    /// Processor with the UNESCO equation of state.
    pub fn new(config: MissionConfig) -> Result<Self, ConfigError> {
        Self::with_density_model(config, EquationOfState::new())
    }
}

impl<D: DensityModel> MissionProcessor<D> {
    /// Processor with a custom density model.
    pub fn with_density_model(config: MissionConfig, density: D) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            min_mld: config.min_mld,
            analyzer: MldAnalyzer::with_density_model(config.mld, density)?,
        })
    }

    /// Compute every dive's MLD, then apply fallback and clamping in dive order.
    pub fn process(&self, dives: &[Dive]) -> Vec<DiveMld> {
        info!("Processing MLD for {} dives", dives.len());
        let computed = self.compute_all(dives);

        let mut last_mld = f64::NAN;
        let results: Vec<DiveMld> = dives
            .iter()
            .zip(computed)
            .map(|(dive, result)| {
                let (mld, source) = self.resolve(dive.number, result.mixed_layer_depth(), &mut last_mld);
                DiveMld {
                    dive: dive.number,
                    mld,
                    source,
                    result,
                }
            })
            .collect();

        let summary = MissionSummary::from_results(&results);
        info!(
            computed = summary.n_computed,
            previous = summary.n_previous,
            clamped = summary.n_clamped,
            missing = summary.n_missing,
            "Mission MLD series complete"
        );
        results
    }

    #[cfg(not(feature = "parallel"))]
    fn compute_all(&self, dives: &[Dive]) -> Vec<MldResult> {
        dives
            .iter()
            .map(|dive| self.analyzer.compute_or_nan(&dive.profile))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn compute_all(&self, dives: &[Dive]) -> Vec<MldResult> {
        use rayon::prelude::*;

        dives
            .par_iter()
            .map(|dive| self.analyzer.compute_or_nan(&dive.profile))
            .collect()
    }

    fn resolve(&self, dive: u32, computed: f64, last_mld: &mut f64) -> (f64, MldSource) {
        let (mut mld, mut source) = if computed.is_finite() {
            *last_mld = computed;
            (computed, MldSource::Computed)
        } else if last_mld.is_finite() {
            debug!("Dive {}: taking previous MLD dive value {:.1}", dive, last_mld);
            (*last_mld, MldSource::PreviousDive)
        } else {
            warn!("Dive {}: no MLD available", dive);
            (f64::NAN, MldSource::Missing)
        };

        if mld < self.min_mld {
            debug!("Dive {}: MLD too shallow; raising to {:.1}", dive, self.min_mld);
            mld = self.min_mld;
            source = MldSource::Clamped;
        }
        (mld, source)
    }
}
