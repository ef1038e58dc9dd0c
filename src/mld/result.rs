//! Output of one MLD computation.

/// Mean tracer values above a given depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TracerMeans {
    /// Mean temperature (°C)
    pub temperature: f64,
    /// Mean salinity
    pub salinity: f64,
    /// Mean potential density anomaly (kg/m³)
    pub density: f64,
}

impl TracerMeans {
    /// Means over the levels with `pressure < depth`.
    ///
    /// `None` when no level is shallower than `depth`, including a
    /// non-finite `depth`.
    pub fn above(
        depth: f64,
        pressure: &[f64],
        temperature: &[f64],
        salinity: &[f64],
        density: &[f64],
    ) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = [0.0; 3];
        for i in 0..pressure.len() {
            if pressure[i] < depth {
                count += 1;
                sum[0] += temperature[i];
                sum[1] += salinity[i];
                sum[2] += density[i];
            }
        }
        if count == 0 {
            return None;
        }

        let n = count as f64;
        Some(Self {
            temperature: sum[0] / n,
            salinity: sum[1] / n,
            density: sum[2] / n,
        })
    }
}

/// Which leaf of each decision tree produced the final MLD.
///
/// Codes are stable identifiers: temperature 1–14, salinity 1–16 and
/// density 1–17. Codes 1–4 (temperature), 1–8 (salinity) and 1–7 (density)
/// belong to the summer-like branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BranchCodes {
    pub temperature: u8,
    pub salinity: u8,
    pub density: u8,
}

/// Estimates of one profile's mixed-layer depth.
///
/// Depths are pressures in dbar. A depth is NaN when the candidate that
/// the decision tree selected does not exist for this profile (e.g. the
/// fits never intersect), or for the whole struct when the computation
/// failed (see [`MldResult::nan`]).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MldResult {
    /// Final MLD from the temperature algorithm
    pub mld_temperature: f64,
    /// Final MLD from the salinity algorithm
    pub mld_salinity: f64,
    /// Final MLD from the density algorithm
    pub mld_density: f64,
    /// 0.2 °C temperature-threshold MLD
    pub threshold_temperature: f64,
    /// 0.03 kg/m³ density-threshold MLD
    pub threshold_density: f64,
    /// Temperature-gradient MLD
    pub gradient_temperature: f64,
    /// Density-gradient MLD
    pub gradient_density: f64,
    /// Means above the temperature-algorithm MLD
    pub mean_above_mld_temperature: Option<TracerMeans>,
    /// Means above the density-algorithm MLD
    pub mean_above_mld_density: Option<TracerMeans>,
    /// Means above the temperature-threshold MLD
    pub mean_above_threshold_temperature: Option<TracerMeans>,
    /// Means above the density-threshold MLD
    pub mean_above_threshold_density: Option<TracerMeans>,
    /// Decision-tree leaves; `None` when the computation failed
    pub analysis: Option<BranchCodes>,
}

impl MldResult {
    /// Number of entries in [`MldResult::to_record`].
    pub const RECORD_LEN: usize = 22;

    /// Result reported when no estimate could be made.
    pub fn nan() -> Self {
        Self {
            mld_temperature: f64::NAN,
            mld_salinity: f64::NAN,
            mld_density: f64::NAN,
            threshold_temperature: f64::NAN,
            threshold_density: f64::NAN,
            gradient_temperature: f64::NAN,
            gradient_density: f64::NAN,
            mean_above_mld_temperature: None,
            mean_above_mld_density: None,
            mean_above_threshold_temperature: None,
            mean_above_threshold_density: None,
            analysis: None,
        }
    }

    /// True for the all-NaN failure result.
    pub fn is_nan(&self) -> bool {
        self.analysis.is_none()
            && self.mld_temperature.is_nan()
            && self.mld_salinity.is_nan()
            && self.mld_density.is_nan()
    }

    /// The MLD used downstream (density algorithm).
    pub fn mixed_layer_depth(&self) -> f64 {
        self.mld_density
    }

    /// Flat record with the customary short field names.
    ///
    /// Missing means and codes are NaN.
    pub fn to_record(&self) -> [(&'static str, f64); Self::RECORD_LEN] {
        let mean = |m: Option<TracerMeans>, f: fn(&TracerMeans) -> f64| m.as_ref().map_or(f64::NAN, f);
        let code = |f: fn(&BranchCodes) -> u8| self.analysis.as_ref().map_or(f64::NAN, |c| f64::from(f(c)));

        let t = |m: &TracerMeans| m.temperature;
        let s = |m: &TracerMeans| m.salinity;
        let d = |m: &TracerMeans| m.density;

        [
            ("mixedtp", self.mld_temperature),
            ("mixedsp", self.mld_salinity),
            ("mixeddp", self.mld_density),
            ("mldepthptmpp", self.threshold_temperature),
            ("mldepthdensp", self.threshold_density),
            ("gtmldp", self.gradient_temperature),
            ("gdmldp", self.gradient_density),
            ("mixedt_ta", mean(self.mean_above_mld_temperature, t)),
            ("mixedd_ta", mean(self.mean_above_mld_density, t)),
            ("mldepthptmp_ta", mean(self.mean_above_threshold_temperature, t)),
            ("mldepthdens_ta", mean(self.mean_above_threshold_density, t)),
            ("mixedt_sa", mean(self.mean_above_mld_temperature, s)),
            ("mixedd_sa", mean(self.mean_above_mld_density, s)),
            ("mldepthptmp_sa", mean(self.mean_above_threshold_temperature, s)),
            ("mldepthdens_sa", mean(self.mean_above_threshold_density, s)),
            ("mixedt_da", mean(self.mean_above_mld_temperature, d)),
            ("mixedd_da", mean(self.mean_above_mld_density, d)),
            ("mldepthptmp_da", mean(self.mean_above_threshold_temperature, d)),
            ("mldepthdens_da", mean(self.mean_above_threshold_density, d)),
            ("tanalysis", code(|c| c.temperature)),
            ("sanalysis", code(|c| c.salinity)),
            ("danalysis", code(|c| c.density)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_result() {
        let r = MldResult::nan();
        assert!(r.is_nan());
        assert!(r.to_record().iter().all(|(_, v)| v.is_nan()));
    }

    #[test]
    fn test_means_above_depth() {
        let p = [10.0, 20.0, 30.0, 40.0];
        let t = [20.0, 18.0, 10.0, 8.0];
        let s = [35.0, 35.0, 34.0, 34.0];
        let d = [24.0, 24.5, 26.0, 26.5];

        let m = TracerMeans::above(30.0, &p, &t, &s, &d).unwrap();
        assert!((m.temperature - 19.0).abs() < 1e-12);
        assert!((m.salinity - 35.0).abs() < 1e-12);
        assert!((m.density - 24.25).abs() < 1e-12);

        assert_eq!(TracerMeans::above(10.0, &p, &t, &s, &d), None);
        assert_eq!(TracerMeans::above(f64::NAN, &p, &t, &s, &d), None);
    }

    #[test]
    fn test_record_layout() {
        let mut r = MldResult::nan();
        r.mld_density = 42.0;
        r.analysis = Some(BranchCodes {
            temperature: 3,
            salinity: 9,
            density: 17,
        });

        let record = r.to_record();
        assert_eq!(record[2], ("mixeddp", 42.0));
        assert_eq!(record[21], ("danalysis", 17.0));
        assert!(!r.is_nan());
        assert_eq!(r.mixed_layer_depth(), 42.0);
    }
}
