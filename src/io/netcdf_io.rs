//! NetCDF I/O for glider profile files.
//!
//! Reads the pressure, temperature and salinity arrays of one dive file and
//! writes the mission's MLD back as `MIXED_LAYER_DEPTH`, one value per
//! sample along the `TIME` dimension.
//!
//! # Example
//!
//! ```rust,ignore
//! use mld_rs::io::{VariableNames, read_netcdf_profile, write_mixed_layer_depth};
//!
//! let names = VariableNames::default();
//! let profile = read_netcdf_profile(path, &names)?;
//! let result = compute_mixed_layer_depth_or_nan(&profile, &MldConfig::default());
//! write_mixed_layer_depth(path, result.mld_density, result.analysis.map(|c| c.density), &names)?;
//! ```

use std::path::Path;

use chrono::Utc;
use thiserror::Error;
use tracing::debug;

use crate::mld::MldError;
use crate::profile::Profile;

/// Error type for NetCDF operations.
#[derive(Debug, Error)]
pub enum NetCDFError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// NetCDF library error
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),

    /// Invalid data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Missing variable
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    /// Missing dimension
    #[error("Missing dimension: {0}")]
    MissingDimension(String),
}

impl From<MldError> for NetCDFError {
    fn from(err: MldError) -> Self {
        Self::InvalidData(err.to_string())
    }
}

/// Fill value for missing data (CF-conventions standard).
pub const FILL_VALUE_F64: f64 = 9.96920996838687e+36;

/// Name of the MLD output variable.
pub const MLD_VARIABLE: &str = "MIXED_LAYER_DEPTH";

/// Check if a value is valid (not a fill value).
#[inline]
pub fn is_valid_f64(v: f64) -> bool {
    v.is_finite() && v.abs() < 1.0e+30
}

/// Candidate variable names, tried in order.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableNames {
    pub pressure: Vec<String>,
    pub temperature: Vec<String>,
    pub salinity: Vec<String>,
    /// Dimension the MLD variable is written along
    pub time_dimension: String,
}

impl Default for VariableNames {
    fn default() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            pressure: names(&["CORR_PRES", "PRES", "pressure"]),
            temperature: names(&["CTEMP", "TEMP", "temperature"]),
            salinity: names(&["ASAL", "PSAL", "salinity"]),
            time_dimension: "TIME".to_string(),
        }
    }
}

impl VariableNames {
    /// Use exactly these three names.
    pub fn exact(pressure: &str, temperature: &str, salinity: &str) -> Self {
        Self {
            pressure: vec![pressure.to_string()],
            temperature: vec![temperature.to_string()],
            salinity: vec![salinity.to_string()],
            ..Self::default()
        }
    }
}

/// Read one dive's profile from a NetCDF file.
///
/// Fill values and values flagged by `_FillValue` become NaN.
pub fn read_netcdf_profile(path: &Path, names: &VariableNames) -> Result<Profile, NetCDFError> {
    let file = netcdf::open(path)?;

    let pressure = read_variable(&file, &names.pressure)?;
    let temperature = read_variable(&file, &names.temperature)?;
    let salinity = read_variable(&file, &names.salinity)?;

    Ok(Profile::new(pressure, temperature, salinity)?)
}

/// Read a 1D variable, mapping missing values to NaN.
fn read_variable(file: &netcdf::File, names: &[String]) -> Result<Vec<f64>, NetCDFError> {
    for name in names {
        if let Some(var) = file.variable(name) {
            let fill = var
                .attribute_value("_FillValue")
                .and_then(|r| r.ok())
                .and_then(|v| match v {
                    netcdf::AttributeValue::Double(d) => Some(d),
                    netcdf::AttributeValue::Float(f) => Some(f as f64),
                    _ => None,
                });

            let raw: Vec<f64> = var.get_values(..)?;
            debug!("Read {} values of {}", raw.len(), name);

            return Ok(raw
                .into_iter()
                .map(|v| {
                    if !is_valid_f64(v) || fill.is_some_and(|f| v == f) {
                        f64::NAN
                    } else {
                        v
                    }
                })
                .collect());
        }
    }
    Err(NetCDFError::MissingVariable(names.join(" or ")))
}

/// Value of the `analysis_code` attribute when the dive has no code of its own.
pub const NO_ANALYSIS_CODE: i32 = -1;

/// Write `MIXED_LAYER_DEPTH` (constant along the time dimension) into an existing file.
///
/// A NaN `mld` is stored as the fill value. The density-tree leaf is stored
/// as the `analysis_code` attribute, [`NO_ANALYSIS_CODE`] when unknown, so a
/// rewrite never leaves a stale code behind. A timestamped line is
/// prepended to the global `history`.
pub fn write_mixed_layer_depth(
    path: &Path,
    mld: f64,
    analysis_code: Option<u8>,
    names: &VariableNames,
) -> Result<(), NetCDFError> {
    let mut file = netcdf::append(path)?;

    let n_time = file
        .dimension(&names.time_dimension)
        .map(|d| d.len())
        .ok_or_else(|| NetCDFError::MissingDimension(names.time_dimension.clone()))?;

    let value = if mld.is_finite() { mld } else { FILL_VALUE_F64 };
    let data = vec![value; n_time];

    if file.variable(MLD_VARIABLE).is_none() {
        let mut var = file.add_variable::<f64>(MLD_VARIABLE, &[names.time_dimension.as_str()])?;
        var.put_attribute("long_name", "mixed layer depth")?;
        var.put_attribute("units", "dbar")?;
        var.put_attribute(
            "comment",
            "Holte & Talley (2009) density algorithm; analysis_code -1 means no code",
        )?;
        var.put_attribute("_FillValue", FILL_VALUE_F64)?;
    }

    {
        let mut var = file
            .variable_mut(MLD_VARIABLE)
            .ok_or_else(|| NetCDFError::MissingVariable(MLD_VARIABLE.to_string()))?;
        var.put_values(&data, ..)?;
        let code = analysis_code.map_or(NO_ANALYSIS_CODE, i32::from);
        var.put_attribute("analysis_code", code)?;
    }

    let previous = file
        .attribute("history")
        .and_then(|attr| attr.value().ok())
        .and_then(|v| match v {
            netcdf::AttributeValue::Str(s) => Some(s),
            _ => None,
        });
    let line = format!(
        "{}: {} written by mld-rs",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        MLD_VARIABLE
    );
    let history = match previous {
        Some(old) if !old.is_empty() => format!("{}\n{}", line, old),
        _ => line,
    };
    file.add_attribute("history", history.as_str())?;

    Ok(())
}

/// Read back the `analysis_code` attribute written by [`write_mixed_layer_depth`].
///
/// `None` when the variable or attribute is absent or holds [`NO_ANALYSIS_CODE`].
pub fn read_analysis_code(path: &Path) -> Result<Option<u8>, NetCDFError> {
    let file = netcdf::open(path)?;
    let code = file
        .variable(MLD_VARIABLE)
        .and_then(|var| var.attribute_value("analysis_code"))
        .transpose()?
        .and_then(|v| match v {
            netcdf::AttributeValue::Int(c) => u8::try_from(c).ok(),
            _ => None,
        });
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_dive_file(path: &Path) {
        let mut file = netcdf::create(path).unwrap();
        file.add_dimension("TIME", 5).unwrap();
        file.add_attribute("history", "2024-05-01 glider data converted").unwrap();

        let mut pres = file.add_variable::<f64>("PRES", &["TIME"]).unwrap();
        pres.put_values(&[1.0, 2.0, 3.0, 4.0, FILL_VALUE_F64], ..).unwrap();
        let mut temp = file.add_variable::<f64>("TEMP", &["TIME"]).unwrap();
        temp.put_values(&[15.0, 15.0, 14.9, 14.8, 14.0], ..).unwrap();
        let mut sal = file.add_variable::<f64>("PSAL", &["TIME"]).unwrap();
        sal.put_attribute("_FillValue", -999.0f64).unwrap();
        sal.put_values(&[35.0, 35.0, -999.0, 35.1, 35.1], ..).unwrap();
    }

    #[test]
    fn test_read_profile_with_fallback_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dive.nc");
        create_dive_file(&path);

        let profile = read_netcdf_profile(&path, &VariableNames::default()).unwrap();
        assert_eq!(profile.len(), 5);
        assert!(profile.pressure()[4].is_nan());
        assert!(profile.salinity()[2].is_nan());
        assert_eq!(profile.temperature()[0], 15.0);
    }

    #[test]
    fn test_missing_variable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dive.nc");
        create_dive_file(&path);

        let names = VariableNames::exact("PRES", "TEMP", "SALT");
        assert!(matches!(
            read_netcdf_profile(&path, &names),
            Err(NetCDFError::MissingVariable(_))
        ));
    }

    #[test]
    fn test_write_mixed_layer_depth() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dive.nc");
        create_dive_file(&path);

        write_mixed_layer_depth(&path, 42.5, Some(8), &VariableNames::default()).unwrap();
        assert_eq!(read_analysis_code(&path).unwrap(), Some(8));

        // Writing again overwrites in place
        write_mixed_layer_depth(&path, 40.0, None, &VariableNames::default()).unwrap();

        let file = netcdf::open(&path).unwrap();
        let var = file.variable(MLD_VARIABLE).unwrap();
        let values: Vec<f64> = var.get_values(..).unwrap();
        assert_eq!(values, vec![40.0; 5]);
        assert!(matches!(
            var.attribute_value("analysis_code"),
            Some(Ok(netcdf::AttributeValue::Int(NO_ANALYSIS_CODE)))
        ));
        assert_eq!(read_analysis_code(&path).unwrap(), None);
    }

    #[test]
    fn test_history_is_prepended() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dive.nc");
        create_dive_file(&path);

        write_mixed_layer_depth(&path, 42.5, Some(8), &VariableNames::default()).unwrap();
        write_mixed_layer_depth(&path, 40.0, None, &VariableNames::default()).unwrap();

        let file = netcdf::open(&path).unwrap();
        let history = match file.attribute("history").unwrap().value().unwrap() {
            netcdf::AttributeValue::Str(s) => s,
            other => panic!("unexpected history attribute: {:?}", other),
        };
        let lines: Vec<&str> = history.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains(MLD_VARIABLE));
        assert!(lines[1].contains(MLD_VARIABLE));
        assert_eq!(lines[2], "2024-05-01 glider data converted");
    }
}
