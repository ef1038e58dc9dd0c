//! # mld-rs
//!
//! Mixed-layer-depth detection for glider and CTD profiles.
//!
//! This crate provides:
//! - Profile cleaning and reference-level selection
//! - Threshold, gradient and piecewise-fit MLD estimators
//! - The Holte & Talley (2009) decision trees for temperature, salinity and density
//! - Seawater potential density (UNESCO one-atmosphere and linear equations of state)
//! - Mission processing with previous-dive fallback and a minimum MLD
//! - Text and NetCDF profile I/O

pub mod io;
pub mod mission;
pub mod mld;
pub mod profile;
pub mod seawater;

// Re-export main types for convenience
pub use mission::{Dive, DiveMld, MissionConfig, MissionProcessor, MissionSummary, MldSource};
pub use mld::{
    BranchCodes, ConfigError, InsufficientData, MldAnalyzer, MldConfig, MldError, MldResult,
    NumericalFailure, TracerMeans, compute_mixed_layer_depth, compute_mixed_layer_depth_or_nan,
};
pub use profile::{PreparedProfile, Profile, prepare};
pub use seawater::{DensityModel, EquationOfState, LinearEquationOfState};
