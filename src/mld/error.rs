//! Error types for the mixed-layer-depth computation.

use thiserror::Error;

/// Why a profile was rejected before any fitting took place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InsufficientData {
    /// Salinity is entirely non-finite.
    EmptySalinity,
    /// Pressure is entirely non-finite.
    EmptyPressure,
    /// Fewer usable samples than `rec_cut`.
    TooFewSamples { found: usize, required: usize },
    /// The deepest finite pressure is shallower than `pmax`.
    TooShallow { max_pressure: f64, required: f64 },
}

impl std::fmt::Display for InsufficientData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySalinity => write!(f, "Empty tracers, cannot make MLD calculation"),
            Self::EmptyPressure => {
                write!(f, "Empty pressure record, cannot make MLD calculation")
            }
            Self::TooFewSamples { found, required } => write!(
                f,
                "Pressure record too short ({} < {} samples), cannot make MLD calculation",
                found, required
            ),
            Self::TooShallow {
                max_pressure,
                required,
            } => write!(
                f,
                "Pres. record too shallow ({:.1} < {:.1} dbar), cannot make MLD calculation",
                max_pressure, required
            ),
        }
    }
}

/// Numerical degeneracy hit after the preconditions passed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericalFailure {
    /// Not enough samples below the reference level to smooth a gradient.
    TooFewLevels { found: usize },
    /// A straight-line fit was requested on fewer than two distinct pressures.
    DegenerateFit { samples: usize },
    /// No fit window satisfied the error tolerance.
    NoAllowableFit,
}

impl std::fmt::Display for NumericalFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewLevels { found } => write!(
                f,
                "only {} levels below the reference depth, need at least 4",
                found
            ),
            Self::DegenerateFit { samples } => {
                write!(f, "cannot fit a line through {} distinct pressure(s)", samples)
            }
            Self::NoAllowableFit => write!(f, "no mixed-layer fit within error tolerance"),
        }
    }
}

/// Error type for the MLD core.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MldError {
    /// Input arrays have different lengths.
    #[error("pressure, temperature and salinity lengths differ ({pressure}, {temperature}, {salinity})")]
    ShapeMismatch {
        pressure: usize,
        temperature: usize,
        salinity: usize,
    },

    /// The configuration failed validation.
    #[error("Invalid MLD configuration: {0}")]
    InvalidConfig(String),

    /// Precondition failure: the profile cannot support an MLD estimate.
    #[error("{0}")]
    InsufficientData(InsufficientData),

    /// The profile passed the preconditions but a fitting step degenerated.
    #[error("Failed to calculate MLD: {0}")]
    NumericalFailure(NumericalFailure),
}

impl MldError {
    /// True for precondition rejections (as opposed to numerical trouble).
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData(_))
    }
}

impl From<InsufficientData> for MldError {
    fn from(reason: InsufficientData) -> Self {
        Self::InsufficientData(reason)
    }
}

impl From<NumericalFailure> for MldError {
    fn from(reason: NumericalFailure) -> Self {
        Self::NumericalFailure(reason)
    }
}
