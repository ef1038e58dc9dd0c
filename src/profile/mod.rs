//! Single CTD/glider profile and its preparation for MLD analysis.
//!
//! A [`Profile`] is the raw (pressure, temperature, salinity) record of one
//! dive. [`prepare`] turns it into a [`PreparedProfile`]: bad samples masked,
//! repeated pressures averaged, and the record trimmed so that index 0 is
//! the reference level.

mod prepare;

pub use prepare::{PreparedProfile, prepare};

use crate::mld::MldError;

/// Raw profile from one dive.
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    pressure: Vec<f64>,
    temperature: Vec<f64>,
    salinity: Vec<f64>,
}

impl Profile {
    /// Create a profile from three equal-length arrays.
    ///
    /// # Errors
    /// `MldError::ShapeMismatch` if the lengths differ.
    pub fn new(
        pressure: Vec<f64>,
        temperature: Vec<f64>,
        salinity: Vec<f64>,
    ) -> Result<Self, MldError> {
        if pressure.len() != temperature.len() || pressure.len() != salinity.len() {
            return Err(MldError::ShapeMismatch {
                pressure: pressure.len(),
                temperature: temperature.len(),
                salinity: salinity.len(),
            });
        }

        Ok(Self {
            pressure,
            temperature,
            salinity,
        })
    }

    /// Create a profile by copying slices.
    pub fn from_slices(
        pressure: &[f64],
        temperature: &[f64],
        salinity: &[f64],
    ) -> Result<Self, MldError> {
        Self::new(pressure.to_vec(), temperature.to_vec(), salinity.to_vec())
    }

    /// Pressure (dbar).
    pub fn pressure(&self) -> &[f64] {
        &self.pressure
    }

    /// Temperature (°C).
    pub fn temperature(&self) -> &[f64] {
        &self.temperature
    }

    /// Salinity.
    pub fn salinity(&self) -> &[f64] {
        &self.salinity
    }

    /// Number of samples, including non-finite ones.
    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    /// Check if the profile has no samples.
    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }

    /// Number of finite pressure samples.
    pub fn finite_pressure_count(&self) -> usize {
        self.pressure.iter().filter(|p| p.is_finite()).count()
    }

    /// Deepest finite pressure, or `None` if there is none.
    pub fn max_pressure(&self) -> Option<f64> {
        self.pressure
            .iter()
            .copied()
            .filter(|p| p.is_finite())
            .fold(None, |acc, p| Some(acc.map_or(p, |a: f64| a.max(p))))
    }
}
