//! Reader and writer for plain-text glider profile files.
//!
//! # File Format
//!
//! ```text
//! # mission: sg620
//! # dive: 1
//! # columns: pressure(dbar) temperature(degC) salinity(g/kg)
//! 1.0 14.2 35.1
//! 2.0 14.2 35.1
//! # dive: 2
//! 1.5 14.0 35.2
//! ```
//!
//! Every data line belongs to the most recent `# dive:` header. Missing
//! values may be written as `nan`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::mission::{Dive, DiveMld, MldSource};
use crate::profile::Profile;

/// Error type for profile file parsing.
#[derive(Debug, Error)]
pub enum ProfileFileError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Parse error with line number
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// No dives in the file
    #[error("Profile file contains no dives")]
    EmptyFile,

    /// Data line before the first `# dive:` header
    #[error("Data at line {line} does not belong to any dive")]
    MissingDive { line: usize },
}

/// Contents of a profile file.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileFile {
    /// Mission name from the `# mission:` header
    pub mission: Option<String>,
    /// Dives in file order
    pub dives: Vec<Dive>,
}

impl ProfileFile {
    /// Number of dives.
    pub fn len(&self) -> usize {
        self.dives.len()
    }

    /// Check if there are no dives.
    pub fn is_empty(&self) -> bool {
        self.dives.is_empty()
    }
}

/// Samples of a dive being parsed.
struct DiveBuilder {
    number: u32,
    header_line: usize,
    pressure: Vec<f64>,
    temperature: Vec<f64>,
    salinity: Vec<f64>,
}

impl DiveBuilder {
    fn new(number: u32, header_line: usize) -> Self {
        Self {
            number,
            header_line,
            pressure: Vec::new(),
            temperature: Vec::new(),
            salinity: Vec::new(),
        }
    }

    fn finish(self) -> Result<Dive, ProfileFileError> {
        let profile = Profile::new(self.pressure, self.temperature, self.salinity).map_err(|e| {
            ProfileFileError::ParseError {
                line: self.header_line,
                message: e.to_string(),
            }
        })?;
        Ok(Dive::new(self.number, profile))
    }
}

/// Read a profile file.
///
/// # Example
///
/// ```ignore
/// use mld_rs::io::read_profile_file;
/// use std::path::Path;
///
/// let file = read_profile_file(Path::new("sg620_profiles.txt"))?;
/// println!("{} dives", file.len());
/// ```
pub fn read_profile_file(path: &Path) -> Result<ProfileFile, ProfileFileError> {
    let content = std::fs::read_to_string(path)?;
    parse_profiles(&content)
}

/// Parse profiles from a string.
///
/// Same format as file, useful for testing or embedded data.
pub fn parse_profiles(content: &str) -> Result<ProfileFile, ProfileFileError> {
    let mut mission = None;
    let mut dives = Vec::new();
    let mut current: Option<DiveBuilder> = None;

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('#') {
            let comment = line.trim_start_matches('#').trim();
            if let Some(name) = comment.strip_prefix("mission:") {
                mission = Some(name.trim().to_string());
            } else if let Some(raw) = comment.strip_prefix("dive:") {
                let number: u32 = raw.trim().parse().map_err(|_| ProfileFileError::ParseError {
                    line: line_num + 1,
                    message: format!("Invalid dive number '{}'", raw.trim()),
                })?;
                if let Some(builder) = current.replace(DiveBuilder::new(number, line_num + 1)) {
                    dives.push(builder.finish()?);
                }
            }
            continue;
        }

        let builder = current
            .as_mut()
            .ok_or(ProfileFileError::MissingDive { line: line_num + 1 })?;

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(ProfileFileError::ParseError {
                line: line_num + 1,
                message: "Expected: pressure temperature salinity".into(),
            });
        }

        let value = |index: usize, name: &str| -> Result<f64, ProfileFileError> {
            parts[index]
                .parse()
                .map_err(|_| ProfileFileError::ParseError {
                    line: line_num + 1,
                    message: format!("Invalid {} value '{}'", name, parts[index]),
                })
        };

        builder.pressure.push(value(0, "pressure")?);
        builder.temperature.push(value(1, "temperature")?);
        builder.salinity.push(value(2, "salinity")?);
    }

    if let Some(builder) = current {
        dives.push(builder.finish()?);
    }

    if dives.is_empty() {
        return Err(ProfileFileError::EmptyFile);
    }

    Ok(ProfileFile { mission, dives })
}

/// Write dives in the profile file format.
pub fn write_profile_file(path: &Path, data: &ProfileFile) -> Result<(), ProfileFileError> {
    let mut file = BufWriter::new(File::create(path)?);

    if let Some(ref mission) = data.mission {
        writeln!(file, "# mission: {}", mission)?;
    }
    writeln!(
        file,
        "# columns: pressure(dbar) temperature(degC) salinity(g/kg)"
    )?;

    for dive in &data.dives {
        writeln!(file, "# dive: {}", dive.number)?;
        let profile = &dive.profile;
        for i in 0..profile.len() {
            writeln!(
                file,
                "{} {} {}",
                profile.pressure()[i],
                profile.temperature()[i],
                profile.salinity()[i]
            )?;
        }
    }

    file.flush()?;
    Ok(())
}

/// Write a mission's MLD series, one line per dive.
///
/// Columns: dive number, reported MLD, source label and the density-tree
/// analysis code (`-` when the dive's own computation failed).
pub fn write_mld_file(path: &Path, results: &[DiveMld]) -> Result<(), ProfileFileError> {
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "# Mixed layer depth per dive")?;
    writeln!(file, "# columns: dive mld(dbar) source analysis_code")?;

    for r in results {
        let code = r
            .analysis_code()
            .map_or_else(|| "-".to_string(), |c| c.to_string());
        writeln!(file, "{} {:.2} {} {}", r.dive, r.mld, r.source.label(), code)?;
    }

    file.flush()?;
    Ok(())
}

/// One line of an MLD series file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MldRecord {
    /// Dive number
    pub dive: u32,
    /// Reported MLD (dbar)
    pub mld: f64,
    /// Origin of `mld`
    pub source: MldSource,
    /// Density-tree leaf, if the dive produced one
    pub analysis_code: Option<u8>,
}

/// Read an MLD series file written by [`write_mld_file`].
pub fn read_mld_file(path: &Path) -> Result<Vec<MldRecord>, ProfileFileError> {
    let content = std::fs::read_to_string(path)?;
    parse_mld_series(&content)
}

/// Parse an MLD series from a string.
pub fn parse_mld_series(content: &str) -> Result<Vec<MldRecord>, ProfileFileError> {
    let mut records = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parse_error = |message: String| ProfileFileError::ParseError {
            line: line_num + 1,
            message,
        };

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(parse_error("Expected: dive mld source analysis_code".into()));
        }

        let dive = parts[0]
            .parse()
            .map_err(|_| parse_error(format!("Invalid dive number '{}'", parts[0])))?;
        let mld = parts[1]
            .parse()
            .map_err(|_| parse_error(format!("Invalid MLD value '{}'", parts[1])))?;
        let source = MldSource::from_label(parts[2])
            .ok_or_else(|| parse_error(format!("Unknown MLD source '{}'", parts[2])))?;
        let analysis_code = match parts[3] {
            "-" => None,
            code => Some(
                code.parse()
                    .map_err(|_| parse_error(format!("Invalid analysis code '{}'", code)))?,
            ),
        };

        records.push(MldRecord {
            dive,
            mld,
            source,
            analysis_code,
        });
    }

    Ok(records)
}
