//! I/O utilities for reading and writing profile data.
//!
//! This module provides:
//! - **Text profile files**: dives of (pressure, temperature, salinity) samples
//! - **MLD series files**: one reported MLD per dive
//! - **NetCDF I/O**: per-dive glider files in and `MIXED_LAYER_DEPTH` out
//!   (requires `netcdf` feature)
//!
//! # File Formats
//!
//! ## Profile Files
//!
//! ```text
//! # mission: sg620
//! # dive: 1
//! # columns: pressure(dbar) temperature(degC) salinity(g/kg)
//! 1.0 14.2 35.1
//! 2.0 14.2 35.1
//! ```
//!
//! ## MLD Series Files
//!
//! ```text
//! # columns: dive mld(dbar) source analysis_code
//! 1 32.50 computed 8
//! 2 32.50 previous -
//! ```

#[cfg(feature = "netcdf")]
mod netcdf_io;
mod profile_reader;

#[cfg(feature = "netcdf")]
pub use netcdf_io::{
    FILL_VALUE_F64, MLD_VARIABLE, NO_ANALYSIS_CODE, NetCDFError, VariableNames, is_valid_f64,
    read_analysis_code, read_netcdf_profile, write_mixed_layer_depth,
};
pub use profile_reader::{
    MldRecord, ProfileFile, ProfileFileError, parse_mld_series, parse_profiles, read_mld_file,
    read_profile_file, write_mld_file, write_profile_file,
};
