//! Cleaning, de-duplication and reference selection.

use super::Profile;
use crate::mld::{InsufficientData, MldConfig, MldError, NumericalFailure, report};

/// Smallest record that still yields one smoothed gradient value.
const MIN_LEVELS: usize = 4;

/// A cleaned profile ready for the MLD estimators.
///
/// Pressures are strictly increasing, every value is finite and index 0
/// is the sample closest to the reference pressure.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedProfile {
    pub pressure: Vec<f64>,
    pub temperature: Vec<f64>,
    pub salinity: Vec<f64>,
}

impl PreparedProfile {
    /// Number of levels.
    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    /// Check if there are no levels.
    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }
}

/// Validate and clean a raw profile.
///
/// Steps, each followed by the `rec_cut` check where relevant:
/// 1. reject all-NaN salinity or pressure, short or shallow records
/// 2. mask non-positive pressures, cold/fresh outliers and non-finite values
/// 3. average temperature and salinity at repeated pressures (sorted by pressure)
/// 4. drop samples above the one nearest `reference_pressure`
///
/// # Errors
/// `MldError::InsufficientData` for the precondition failures of steps 1–3,
/// `MldError::NumericalFailure` if fewer than 4 levels remain after step 4.
pub fn prepare(profile: &Profile, config: &MldConfig) -> Result<PreparedProfile, MldError> {
    if profile.salinity().iter().all(|s| !s.is_finite()) {
        return Err(reject(config, InsufficientData::EmptySalinity));
    }

    let max_pressure = match profile.max_pressure() {
        Some(p) => p,
        None => return Err(reject(config, InsufficientData::EmptyPressure)),
    };

    check_count(profile.finite_pressure_count(), config)?;

    if max_pressure < config.pmax {
        return Err(reject(
            config,
            InsufficientData::TooShallow {
                max_pressure,
                required: config.pmax,
            },
        ));
    }

    let (pressure, temperature, salinity) = mask_bad_values(profile, config);
    if pressure.len() != profile.len() {
        report(
            config.verbose,
            format_args!(
                "Ignoring nan and bad values (T<{}, S<{}) for MLD calculation",
                config.temperature_floor, config.salinity_floor
            ),
        );
    }
    check_count(pressure.len(), config)?;

    let (pressure, temperature, salinity) = collapse_duplicates(pressure, temperature, salinity);
    check_count(pressure.len(), config)?;

    let start = reference_index(&pressure, config.reference_pressure);
    let prepared = PreparedProfile {
        pressure: pressure[start..].to_vec(),
        temperature: temperature[start..].to_vec(),
        salinity: salinity[start..].to_vec(),
    };

    if prepared.len() < MIN_LEVELS {
        return Err(NumericalFailure::TooFewLevels {
            found: prepared.len(),
        }
        .into());
    }

    Ok(prepared)
}

fn reject(config: &MldConfig, reason: InsufficientData) -> MldError {
    report(config.verbose, &reason);
    MldError::InsufficientData(reason)
}

fn check_count(found: usize, config: &MldConfig) -> Result<(), MldError> {
    if found < config.rec_cut {
        return Err(reject(
            config,
            InsufficientData::TooFewSamples {
                found,
                required: config.rec_cut,
            },
        ));
    }
    Ok(())
}

fn mask_bad_values(profile: &Profile, config: &MldConfig) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut pressure = Vec::with_capacity(profile.len());
    let mut temperature = Vec::with_capacity(profile.len());
    let mut salinity = Vec::with_capacity(profile.len());

    for i in 0..profile.len() {
        let p = profile.pressure()[i];
        let t = profile.temperature()[i];
        let s = profile.salinity()[i];

        let keep = p.is_finite()
            && p > 0.0
            && t.is_finite()
            && t >= config.temperature_floor
            && s.is_finite()
            && s >= config.salinity_floor;

        if keep {
            pressure.push(p);
            temperature.push(t);
            salinity.push(s);
        }
    }

    (pressure, temperature, salinity)
}

/// Sort by pressure and average samples sharing a pressure value.
///
/// Afterwards `diff(pressure)` has no zeros, which the slope
/// calculations divide by.
fn collapse_duplicates(
    pressure: Vec<f64>,
    temperature: Vec<f64>,
    salinity: Vec<f64>,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut order: Vec<usize> = (0..pressure.len()).collect();
    order.sort_by(|&a, &b| pressure[a].total_cmp(&pressure[b]));

    let mut out_p = Vec::with_capacity(pressure.len());
    let mut out_t = Vec::with_capacity(pressure.len());
    let mut out_s = Vec::with_capacity(pressure.len());

    let mut i = 0;
    while i < order.len() {
        let p = pressure[order[i]];
        let mut j = i;
        let mut sum_t = 0.0;
        let mut sum_s = 0.0;
        while j < order.len() && pressure[order[j]] == p {
            sum_t += temperature[order[j]];
            sum_s += salinity[order[j]];
            j += 1;
        }
        let n = (j - i) as f64;

        out_p.push(p);
        out_t.push(sum_t / n);
        out_s.push(sum_s / n);
        i = j;
    }

    (out_p, out_t, out_s)
}

/// First index of the sample closest to `reference`.
fn reference_index(pressure: &[f64], reference: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &p) in pressure.iter().enumerate() {
        let dist = (p - reference).powi(2);
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}
