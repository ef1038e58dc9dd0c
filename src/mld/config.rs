//! Tuning parameters for the mixed-layer-depth algorithm.
//!
//! All parameters live in one typed struct that is built once (in code or
//! from a TOML file) and passed by reference into every call.
//!
//! ```toml
//! rec_cut = 10
//! pmax = 20.0
//! density_threshold = 0.03
//! verbose = true
//! ```
//!
//! Keys that are omitted keep their Holte & Talley defaults.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A parameter is outside its valid range
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Parameters of the Holte & Talley mixed-layer-depth algorithm.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MldConfig {
    /// Minimum number of usable samples. Default: 10
    pub rec_cut: usize,
    /// The deepest sample must reach at least this pressure (dbar). Default: 20
    pub pmax: f64,
    /// Samples colder than this are discarded (°C). Default: 0.1
    pub temperature_floor: f64,
    /// Samples fresher than this are discarded. Default: 20
    pub salinity_floor: f64,
    /// Pressure of the reference sample for the threshold method (dbar). Default: 10
    pub reference_pressure: f64,
    /// Density-threshold criterion (kg/m³). Default: 0.03
    pub density_threshold: f64,
    /// Temperature-threshold criterion (°C). Default: 0.2
    pub temperature_threshold: f64,
    /// Resolution of the threshold interpolation (dbar). Default: 0.5
    pub interpolation_step: f64,
    /// Density-gradient criterion (kg/m³/dbar). Default: 0.0005
    pub density_gradient_threshold: f64,
    /// Temperature-gradient criterion (°C/dbar). Default: 0.005
    pub temperature_gradient_threshold: f64,
    /// Normalised error tolerance for the mixed-layer line fit. Default: 1e-10
    pub error_tolerance: f64,
    /// Maximum separation for clusters of candidate MLDs (dbar). Default: 25
    pub max_clusters: f64,
    /// Maximum separation of a tracer extremum and its gradient extremum
    /// for an intrusion (dbar). Default: 100
    pub intrusion_separation: f64,
    /// Upper temperature cutoff for winter/summer classification (°C). Default: 0.5
    pub tcutoff_upper: f64,
    /// Lower temperature cutoff for winter/summer classification (°C). Default: -0.25
    pub tcutoff_lower: f64,
    /// Density cutoff for winter/summer classification (kg/m³). Default: -0.06
    pub density_cutoff: f64,
    /// Log rejections at `info` instead of `debug`.
    pub verbose: bool,
}

impl Default for MldConfig {
    fn default() -> Self {
        Self::holte_talley()
    }
}

impl MldConfig {
    /// Parameters of the published algorithm.
    pub fn holte_talley() -> Self {
        Self {
            rec_cut: 10,
            pmax: 20.0,
            temperature_floor: 0.1,
            salinity_floor: 20.0,
            reference_pressure: 10.0,
            density_threshold: 0.03,
            temperature_threshold: 0.2,
            interpolation_step: 0.5,
            density_gradient_threshold: 0.0005,
            temperature_gradient_threshold: 0.005,
            error_tolerance: 1e-10,
            max_clusters: 25.0,
            intrusion_separation: 100.0,
            tcutoff_upper: 0.5,
            tcutoff_lower: -0.25,
            density_cutoff: -0.06,
            verbose: false,
        }
    }

    /// Set the minimum number of usable samples.
    pub fn with_rec_cut(mut self, rec_cut: usize) -> Self {
        self.rec_cut = rec_cut;
        self
    }

    /// Set the minimum profile depth.
    pub fn with_pmax(mut self, pmax: f64) -> Self {
        self.pmax = pmax;
        self
    }

    /// Set the density-threshold criterion.
    pub fn with_density_threshold(mut self, threshold: f64) -> Self {
        self.density_threshold = threshold;
        self
    }

    /// Set the temperature-threshold criterion.
    pub fn with_temperature_threshold(mut self, threshold: f64) -> Self {
        self.temperature_threshold = threshold;
        self
    }

    /// Enable or disable verbose logging.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file and validate it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check that every parameter is in a usable range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Need at least 4 levels for a smoothed gradient
        if self.rec_cut < 4 {
            return Err(invalid("rec_cut", format!("{} < 4", self.rec_cut)));
        }
        if !(self.pmax.is_finite() && self.pmax > 0.0) {
            return Err(invalid("pmax", format!("{} is not positive", self.pmax)));
        }
        if !self.reference_pressure.is_finite() || self.reference_pressure < 0.0 {
            return Err(invalid(
                "reference_pressure",
                format!("{} is negative", self.reference_pressure),
            ));
        }

        let positive = [
            ("density_threshold", self.density_threshold),
            ("temperature_threshold", self.temperature_threshold),
            ("interpolation_step", self.interpolation_step),
            ("density_gradient_threshold", self.density_gradient_threshold),
            (
                "temperature_gradient_threshold",
                self.temperature_gradient_threshold,
            ),
            ("error_tolerance", self.error_tolerance),
            ("max_clusters", self.max_clusters),
            ("intrusion_separation", self.intrusion_separation),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, format!("{} is not positive", value)));
            }
        }

        if !self.temperature_floor.is_finite() || !self.salinity_floor.is_finite() {
            return Err(invalid("temperature_floor", "floors must be finite".into()));
        }
        if self.tcutoff_lower >= self.tcutoff_upper {
            return Err(invalid(
                "tcutoff_lower",
                format!(
                    "{} must be below tcutoff_upper ({})",
                    self.tcutoff_lower, self.tcutoff_upper
                ),
            ));
        }
        if !self.density_cutoff.is_finite() {
            return Err(invalid("density_cutoff", "must be finite".into()));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
