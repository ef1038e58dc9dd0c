//! Glider Mission Example
//!
//! Builds a synthetic glider mission whose mixed layer deepens from dive to
//! dive, writes it as a profile file, reads it back and reports the
//! mixed-layer depth of each dive.
//!
//! Dive 4 is cut short at 15 dbar and takes the MLD of dive 3.
//!
//! ## Run
//!
//! ```bash
//! RUST_LOG=info cargo run --release --example glider_mission
//! ```

use mld_rs::io::{ProfileFile, read_profile_file, write_mld_file, write_profile_file};
use mld_rs::{Dive, MissionConfig, MissionProcessor, MissionSummary, Profile};
use tracing_subscriber::EnvFilter;

/// Surface temperature (°C)
const T_SURFACE: f64 = 16.0;
/// Thermocline temperature drop (°C)
const DELTA_T: f64 = 8.0;
/// Surface absolute salinity (g/kg)
const S_SURFACE: f64 = 34.9;

/// Smooth step at `mld`, sampled every 1 dbar down to `bottom`.
fn dive_profile(mld: f64, bottom: f64) -> Result<Profile, mld_rs::MldError> {
    let p: Vec<f64> = (1..=bottom as usize).map(|i| i as f64).collect();
    let t = p
        .iter()
        .map(|&p| T_SURFACE - DELTA_T / (1.0 + (-(p - mld) / 8.0).exp()))
        .collect();
    let s = p
        .iter()
        .map(|&p| S_SURFACE + 0.3 / (1.0 + (-(p - mld) / 12.0).exp()))
        .collect();
    Profile::new(p, t, s)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Glider Mission MLD");
    println!("==================");
    println!();

    let mut dives = Vec::new();
    for number in 1..=8u32 {
        let mld = 15.0 + 6.0 * number as f64;
        let bottom = if number == 4 { 15.0 } else { 300.0 };
        dives.push(Dive::new(number, dive_profile(mld, bottom)?));
    }

    let dir = std::env::temp_dir().join("mld_rs_glider_mission");
    std::fs::create_dir_all(&dir)?;
    let profiles_path = dir.join("profiles.txt");
    let mld_path = dir.join("mld.txt");

    write_profile_file(
        &profiles_path,
        &ProfileFile {
            mission: Some("synthetic".to_string()),
            dives,
        },
    )?;
    let mission = read_profile_file(&profiles_path)?;
    println!("Read {} dives from {}", mission.len(), profiles_path.display());

    let config = MissionConfig::default();
    let processor = MissionProcessor::new(config)?;
    let results = processor.process(&mission.dives);

    println!();
    println!(
        "{:>5} {:>9} {:>9} {:>9} {:>10} {:>5}",
        "dive", "MLD_T", "MLD_S", "MLD_D", "source", "code"
    );
    for r in &results {
        let code = r
            .analysis_code()
            .map_or_else(|| "-".to_string(), |c| c.to_string());
        println!(
            "{:>5} {:>9.2} {:>9.2} {:>9.2} {:>10} {:>5}",
            r.dive,
            r.result.mld_temperature,
            r.result.mld_salinity,
            r.mld,
            r.source.label(),
            code
        );
    }

    let summary = MissionSummary::from_results(&results);
    println!();
    println!(
        "Computed: {}  Previous: {}  Clamped: {}  Missing: {}",
        summary.n_computed, summary.n_previous, summary.n_clamped, summary.n_missing
    );
    println!("Mean MLD: {:.2} dbar, deepest: {:.2} dbar", summary.mean_mld, summary.max_mld);

    write_mld_file(&mld_path, &results)?;
    println!("Wrote {}", mld_path.display());

    Ok(())
}
