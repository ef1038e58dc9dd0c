//! Seawater properties needed by the mixed-layer analysis.

mod equation_of_state;

pub use equation_of_state::{DensityModel, EquationOfState, LinearEquationOfState, RHO_0};
