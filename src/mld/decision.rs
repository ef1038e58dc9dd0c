//! Season classification and the three decision trees.
//!
//! Every candidate MLD is a pressure. A candidate that does not exist for
//! a profile (fits that never intersect, no nearby intrusion) is carried as
//! [`UNAVAILABLE`] so that it still takes part in the numeric comparisons of
//! the trees; it only turns into NaN when it ends up selected.

use super::config::MldConfig;

/// Placeholder depth for a candidate that does not exist.
pub const UNAVAILABLE: f64 = -1.0;

/// Pressure at `index`, or [`UNAVAILABLE`].
pub fn depth_at(pressure: &[f64], index: Option<usize>) -> f64 {
    index.map_or(UNAVAILABLE, |i| pressure[i])
}

/// Candidate MLDs (dbar) feeding the decision trees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidates {
    /// Pressure of the reference level
    pub reference: f64,
    /// Temperature drop across the base of the mixed layer (°C)
    pub temperature_step: f64,
    /// Temperature-threshold MLD
    pub threshold_temperature: f64,
    /// Density-threshold MLD
    pub threshold_density: f64,
    /// Intersection of the temperature fits
    pub fit_temperature: f64,
    /// Intersection of the salinity fits
    pub fit_salinity: f64,
    /// Intersection of the density fits
    pub fit_density: f64,
    /// Depth of the (deepest) temperature maximum
    pub temperature_max: f64,
    /// Depth of the (deepest) density minimum
    pub density_min: f64,
    /// Temperature-gradient MLD
    pub gradient_temperature: f64,
    /// Depth of the steepest smoothed salinity gradient
    pub gradient_salinity: f64,
    /// Density-gradient MLD
    pub gradient_density: f64,
    /// Subsurface temperature maximum paired with the strongest warming gradient
    pub intrusion_temperature: f64,
    /// Subsurface salinity minimum paired with the strongest freshening gradient
    pub intrusion_salinity: f64,
}

/// Winter/summer flags.
///
/// Winter profiles have a weak temperature step below the mixed layer
/// (or a temperature inversion); summer profiles a strong seasonal
/// thermocline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Season {
    /// Selects the branch of the temperature tree
    pub temperature_winter: bool,
    /// Selects the branch of the salinity and density trees
    pub density_winter: bool,
}

impl Season {
    /// Classify from the temperature and density steps across the thermocline.
    pub fn classify(temperature_step: f64, density_step: f64, config: &MldConfig) -> Self {
        let temperature_winter =
            temperature_step > config.tcutoff_lower && temperature_step < config.tcutoff_upper;

        let mut density_winter = temperature_winter;
        if density_step > config.density_cutoff && temperature_step > config.tcutoff_upper {
            density_winter = true;
        }
        if density_step > config.density_cutoff && temperature_step < config.tcutoff_lower {
            density_winter = false;
        }

        Self {
            temperature_winter,
            density_winter,
        }
    }
}

/// A selected depth and the leaf that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection {
    /// Selected MLD (dbar), possibly [`UNAVAILABLE`]
    pub depth: f64,
    /// Leaf of the tree that set `depth`
    pub code: u8,
}

impl Selection {
    fn new(depth: f64, code: u8) -> Self {
        Self { depth, code }
    }

    fn set(&mut self, depth: f64, code: u8) {
        self.depth = depth;
        self.code = code;
    }

    /// Depth as reported to callers: NaN for an unavailable candidate.
    pub fn reported_depth(&self) -> f64 {
        if self.depth == UNAVAILABLE {
            f64::NAN
        } else {
            self.depth
        }
    }
}

/// How many of the pairwise separations fall below `limit`.
fn close_pairs(separations: [f64; 3], limit: f64) -> usize {
    separations.iter().filter(|d| **d < limit).count()
}

/// Temperature algorithm.
pub fn select_temperature(c: &Candidates, season: Season, config: &MldConfig) -> Selection {
    let cluster = config.max_clusters;
    let threshold = c.threshold_temperature;

    if !season.temperature_winter {
        let mut sel = Selection::new(c.fit_temperature, 1);
        // Temperature increasing with depth: fall back to the threshold
        if c.temperature_step < 0.0 && sel.depth > threshold {
            sel.set(threshold, 2);
        }
        if sel.depth > threshold {
            if c.temperature_max < threshold && c.temperature_max > cluster {
                sel.set(c.temperature_max, 3);
            } else {
                sel.set(threshold, 4);
            }
        }
        return sel;
    }

    let mut sel;
    if (c.fit_temperature - threshold).abs() < cluster
        && (c.intrusion_temperature - threshold).abs() > cluster
        && c.fit_temperature < c.intrusion_temperature
    {
        sel = Selection::new(c.fit_temperature, 5);
    } else if c.intrusion_temperature > c.reference + cluster {
        sel = Selection::new(c.intrusion_temperature, 6);
        let separations = [
            (c.gradient_temperature - c.fit_temperature).abs(),
            (c.gradient_temperature - threshold).abs(),
            (threshold - c.fit_temperature).abs(),
        ];
        if close_pairs(separations, cluster) > 1 {
            sel.set(c.fit_temperature, 7);
        }
        if sel.depth > threshold {
            sel.set(threshold, 8);
        }
    } else if c.fit_temperature - threshold < cluster {
        sel = Selection::new(c.fit_temperature, 9);
    } else {
        sel = Selection::new(c.gradient_temperature, 10);
        if sel.depth > threshold {
            sel.set(threshold, 11);
        }
    }

    if sel.depth == 0.0 && (sel.depth - threshold).abs() > cluster {
        sel.set(c.temperature_max, 12);
        if c.temperature_max == c.reference {
            sel.set(threshold, 13);
        }
        if c.temperature_max > threshold {
            sel.set(threshold, 14);
        }
    }
    sel
}

/// Salinity algorithm; needs the temperature-algorithm MLD.
pub fn select_salinity(
    c: &Candidates,
    season: Season,
    mld_temperature: f64,
    config: &MldConfig,
) -> Selection {
    let cluster = config.max_clusters;
    let threshold = c.threshold_density;

    if !season.density_winter {
        let mut sel = Selection::new(c.fit_salinity, 1);
        if sel.depth - threshold > cluster {
            sel.set(threshold, 2);
        }
        if c.fit_salinity - c.gradient_salinity < 0.0 && threshold - c.gradient_salinity > 0.0 {
            sel.set(c.gradient_salinity, 3);
        }
        if c.fit_salinity - c.intrusion_salinity < cluster && c.intrusion_salinity > cluster {
            sel.set(c.intrusion_salinity, 4);
        }
        if (threshold - c.intrusion_salinity).abs() < cluster && c.intrusion_salinity > cluster {
            sel.set(c.intrusion_salinity, 5);
        }
        if mld_temperature - threshold < 0.0 && (mld_temperature - threshold).abs() < cluster {
            sel.set(mld_temperature, 6);
            if (mld_temperature - c.fit_salinity).abs() < cluster && c.fit_salinity - threshold < 0.0
            {
                sel.set(c.fit_salinity, 7);
            }
        }
        if (mld_temperature - threshold).abs() < (sel.depth - threshold).abs()
            && mld_temperature > threshold
        {
            sel.set(threshold, 8);
        }
        return sel;
    }

    let mut sel;
    if c.intrusion_salinity > cluster {
        sel = Selection::new(c.intrusion_salinity, 9);
        if sel.depth > threshold {
            sel.set(threshold, 10);
        }
    } else if c.gradient_salinity < threshold {
        sel = Selection::new(c.gradient_salinity, 11);
        if c.fit_salinity < sel.depth {
            sel.set(c.fit_salinity, 12);
        }
    } else {
        sel = Selection::new(threshold, 13);
        if c.fit_salinity < sel.depth {
            sel.set(c.fit_salinity, 14);
        }
        if sel.depth == 1.0 {
            sel.set(c.gradient_salinity, 15);
        }
        if c.gradient_salinity > threshold {
            sel.set(threshold, 16);
        }
    }
    sel
}

/// Density algorithm; needs the temperature- and salinity-algorithm MLDs.
pub fn select_density(
    c: &Candidates,
    season: Season,
    mld_temperature: f64,
    mld_salinity: f64,
    config: &MldConfig,
) -> Selection {
    let cluster = config.max_clusters;
    let threshold = c.threshold_density;

    let mut sel;
    if !season.density_winter {
        sel = Selection::new(c.fit_density, 1);
        if sel.depth > threshold {
            sel.set(threshold, 2);
        }
        let separations = [
            (mld_salinity - mld_temperature).abs(),
            (c.fit_density - mld_temperature).abs(),
            (mld_salinity - c.fit_density).abs(),
        ];
        if close_pairs(separations, cluster) > 1 {
            sel.set(c.fit_density, 3);
        }
        if (mld_salinity - threshold).abs() < cluster && mld_salinity != threshold {
            if threshold < mld_salinity {
                sel.set(threshold, 4);
            } else {
                sel.set(mld_salinity, 5);
            }
            if c.fit_density == threshold {
                sel.set(c.fit_density, 6);
            }
        }
        if sel.depth > c.gradient_density
            && (c.gradient_density - mld_temperature).abs() < (sel.depth - mld_temperature).abs()
        {
            sel.set(c.gradient_density, 7);
        }
        return sel;
    }

    sel = Selection::new(threshold, 8);
    if c.threshold_temperature < sel.depth {
        sel.set(c.threshold_temperature, 9);
    }
    if c.fit_density < threshold && c.fit_density > cluster {
        sel.set(c.fit_density, 10);
    }
    if c.intrusion_temperature > cluster && c.intrusion_temperature < threshold {
        sel.set(c.intrusion_temperature, 11);
        if (c.temperature_max - c.fit_density).abs()
            < (c.intrusion_temperature - c.fit_density).abs()
        {
            sel.set(c.temperature_max, 12);
        }
        if (mld_salinity - threshold).abs() < cluster && mld_salinity < threshold {
            sel.set(threshold.min(mld_salinity), 13);
        }
    }
    if (mld_temperature - mld_salinity).abs() < cluster {
        let shallower = mld_temperature.min(mld_salinity);
        if (shallower - sel.depth).abs() > cluster {
            sel.set(shallower, 14);
        }
    }
    if sel.depth > c.gradient_density
        && (c.gradient_density - mld_temperature).abs() < (sel.depth - mld_temperature).abs()
    {
        sel.set(c.gradient_density, 15);
    }
    if c.fit_density == c.fit_salinity && (c.fit_salinity - threshold).abs() < cluster {
        sel.set(c.fit_density, 16);
    }
    if mld_temperature == c.density_min {
        sel.set(c.density_min, 17);
    }
    sel
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MldConfig {
        MldConfig::default()
    }

    fn base() -> Candidates {
        Candidates {
            reference: 10.0,
            temperature_step: 1.0,
            threshold_temperature: 50.0,
            threshold_density: 50.0,
            fit_temperature: 50.0,
            fit_salinity: 50.0,
            fit_density: 50.0,
            temperature_max: 10.0,
            density_min: 10.0,
            gradient_temperature: 50.0,
            gradient_salinity: 50.0,
            gradient_density: 50.0,
            intrusion_temperature: UNAVAILABLE,
            intrusion_salinity: UNAVAILABLE,
        }
    }

    #[test]
    fn test_season_classification() {
        let cfg = config();
        let summer = Season::classify(2.0, -0.5, &cfg);
        assert!(!summer.temperature_winter && !summer.density_winter);

        let winter = Season::classify(0.1, -0.02, &cfg);
        assert!(winter.temperature_winter && winter.density_winter);

        // Large temperature step but weak density step (compensated)
        let compensated = Season::classify(1.0, -0.01, &cfg);
        assert!(!compensated.temperature_winter && compensated.density_winter);

        // Strong inversion with weak density step
        let inversion = Season::classify(-1.0, -0.01, &cfg);
        assert!(!inversion.temperature_winter && !inversion.density_winter);
    }

    #[test]
    fn test_unavailable_selection_reports_nan() {
        let sel = Selection::new(UNAVAILABLE, 1);
        assert!(sel.reported_depth().is_nan());
        assert_eq!(Selection::new(30.0, 1).reported_depth(), 30.0);
    }

    #[test]
    fn test_temperature_summer_clamps_to_threshold() {
        let mut c = base();
        c.fit_temperature = 80.0;
        let summer = Season::classify(2.0, -0.5, &config());

        let sel = select_temperature(&c, summer, &config());
        assert_eq!(sel, Selection::new(50.0, 4));

        // A shallow-enough temperature maximum wins over the threshold
        c.temperature_max = 30.0;
        let sel = select_temperature(&c, summer, &config());
        assert_eq!(sel, Selection::new(30.0, 3));
    }

    #[test]
    fn test_temperature_winter_cluster() {
        let mut c = base();
        c.intrusion_temperature = 60.0;
        c.fit_temperature = 50.0;
        c.gradient_temperature = 51.0;
        c.threshold_temperature = 51.0;
        let winter = Season::classify(0.4, 0.0, &config());

        let sel = select_temperature(&c, winter, &config());
        assert_eq!(sel, Selection::new(50.0, 7));
    }

    #[test]
    fn test_temperature_winter_intrusion_kept() {
        let mut c = base();
        c.intrusion_temperature = 40.0;
        c.fit_temperature = 200.0;
        c.gradient_temperature = 150.0;
        c.threshold_temperature = 60.0;
        let winter = Season::classify(0.4, 0.0, &config());

        let sel = select_temperature(&c, winter, &config());
        assert_eq!(sel, Selection::new(40.0, 6));
    }

    #[test]
    fn test_salinity_winter_prefers_intrusion() {
        let mut c = base();
        c.intrusion_salinity = 70.0;
        let winter = Season::classify(0.4, 0.0, &config());

        let sel = select_salinity(&c, winter, 50.0, &config());
        assert_eq!(sel, Selection::new(50.0, 10));

        c.intrusion_salinity = 40.0;
        let sel = select_salinity(&c, winter, 50.0, &config());
        assert_eq!(sel, Selection::new(40.0, 9));
    }

    #[test]
    fn test_salinity_winter_threshold_branch() {
        let mut c = base();
        c.gradient_salinity = 90.0;
        c.fit_salinity = 60.0;
        let winter = Season::classify(0.4, 0.0, &config());

        let sel = select_salinity(&c, winter, 50.0, &config());
        assert_eq!(sel, Selection::new(50.0, 16));
    }

    #[test]
    fn test_density_summer_uses_fit() {
        let mut c = base();
        c.fit_density = 40.0;
        c.gradient_density = 45.0;
        let summer = Season::classify(2.0, -0.5, &config());

        // Temperature and salinity MLDs agree with the fit
        let sel = select_density(&c, summer, 42.0, 44.0, &config());
        assert_eq!(sel.code, 5);
        assert_eq!(sel.depth, 44.0);
    }

    #[test]
    fn test_density_winter_takes_shallower_cluster() {
        let mut c = base();
        c.fit_salinity = 80.0;
        c.density_min = 20.0;
        let winter = Season::classify(0.4, 0.0, &config());

        let sel = select_density(&c, winter, 10.0, 12.0, &config());
        assert_eq!(sel, Selection::new(10.0, 14));
    }

    #[test]
    fn test_density_winter_matches_density_minimum() {
        let mut c = base();
        c.density_min = 30.0;
        c.gradient_density = 80.0;
        let winter = Season::classify(0.4, 0.0, &config());

        let sel = select_density(&c, winter, 30.0, 90.0, &config());
        assert_eq!(sel, Selection::new(30.0, 17));
    }

    fn with(edit: impl FnOnce(&mut Candidates)) -> Candidates {
        let mut c = base();
        edit(&mut c);
        c
    }

    fn summer() -> Season {
        Season::classify(2.0, -0.5, &config())
    }

    fn winter() -> Season {
        Season::classify(0.4, 0.0, &config())
    }

    #[test]
    fn test_temperature_tree_leaves() {
        let cases = [
            (with(|c| c.fit_temperature = 40.0), summer(), Selection::new(40.0, 1)),
            (
                with(|c| {
                    c.fit_temperature = 80.0;
                    c.temperature_step = -1.0;
                }),
                summer(),
                Selection::new(50.0, 2),
            ),
            (
                with(|c| {
                    c.fit_temperature = 80.0;
                    c.temperature_max = 30.0;
                }),
                summer(),
                Selection::new(30.0, 3),
            ),
            (with(|c| c.fit_temperature = 80.0), summer(), Selection::new(50.0, 4)),
            (with(|c| c.intrusion_temperature = 100.0), winter(), Selection::new(50.0, 5)),
            (
                with(|c| {
                    c.intrusion_temperature = 40.0;
                    c.fit_temperature = 200.0;
                    c.gradient_temperature = 150.0;
                    c.threshold_temperature = 60.0;
                }),
                winter(),
                Selection::new(40.0, 6),
            ),
            (
                with(|c| {
                    c.intrusion_temperature = 60.0;
                    c.gradient_temperature = 51.0;
                    c.threshold_temperature = 51.0;
                }),
                winter(),
                Selection::new(50.0, 7),
            ),
            (
                with(|c| {
                    c.intrusion_temperature = 60.0;
                    c.fit_temperature = 200.0;
                    c.gradient_temperature = 150.0;
                    c.threshold_temperature = 40.0;
                }),
                winter(),
                Selection::new(40.0, 8),
            ),
            (
                with(|c| {
                    c.fit_temperature = 30.0;
                    c.threshold_temperature = 80.0;
                }),
                winter(),
                Selection::new(30.0, 9),
            ),
            (
                with(|c| {
                    c.fit_temperature = 200.0;
                    c.gradient_temperature = 60.0;
                    c.threshold_temperature = 80.0;
                }),
                winter(),
                Selection::new(60.0, 10),
            ),
            (
                with(|c| {
                    c.fit_temperature = 200.0;
                    c.gradient_temperature = 100.0;
                    c.threshold_temperature = 80.0;
                }),
                winter(),
                Selection::new(80.0, 11),
            ),
            // Zero MLD far from the threshold: rescued by the temperature maximum
            (
                with(|c| {
                    c.fit_temperature = 0.0;
                    c.threshold_temperature = 80.0;
                    c.temperature_max = 30.0;
                }),
                winter(),
                Selection::new(30.0, 12),
            ),
            (
                with(|c| {
                    c.fit_temperature = 0.0;
                    c.threshold_temperature = 80.0;
                }),
                winter(),
                Selection::new(80.0, 13),
            ),
            (
                with(|c| {
                    c.fit_temperature = 0.0;
                    c.threshold_temperature = 80.0;
                    c.temperature_max = 100.0;
                }),
                winter(),
                Selection::new(80.0, 14),
            ),
        ];

        for (c, season, expected) in cases {
            assert_eq!(select_temperature(&c, season, &config()), expected);
        }
    }

    #[test]
    fn test_salinity_tree_leaves() {
        let cases = [
            (with(|c| c.fit_salinity = 45.0), summer(), 50.0, Selection::new(45.0, 1)),
            (with(|c| c.fit_salinity = 80.0), summer(), 50.0, Selection::new(50.0, 2)),
            (
                with(|c| {
                    c.fit_salinity = 40.0;
                    c.gradient_salinity = 45.0;
                }),
                summer(),
                50.0,
                Selection::new(45.0, 3),
            ),
            (
                with(|c| {
                    c.fit_salinity = 45.0;
                    c.gradient_salinity = 40.0;
                    c.intrusion_salinity = 30.0;
                    c.threshold_density = 60.0;
                }),
                summer(),
                60.0,
                Selection::new(30.0, 4),
            ),
            (
                with(|c| {
                    c.fit_salinity = 45.0;
                    c.intrusion_salinity = 40.0;
                }),
                summer(),
                50.0,
                Selection::new(40.0, 5),
            ),
            (with(|c| c.fit_salinity = 80.0), summer(), 40.0, Selection::new(40.0, 6)),
            (with(|c| c.fit_salinity = 45.0), summer(), 40.0, Selection::new(45.0, 7)),
            (with(|c| c.fit_salinity = 20.0), summer(), 55.0, Selection::new(50.0, 8)),
            (with(|c| c.intrusion_salinity = 40.0), winter(), 50.0, Selection::new(40.0, 9)),
            (with(|c| c.intrusion_salinity = 70.0), winter(), 50.0, Selection::new(50.0, 10)),
            (
                with(|c| {
                    c.gradient_salinity = 30.0;
                    c.fit_salinity = 40.0;
                }),
                winter(),
                50.0,
                Selection::new(30.0, 11),
            ),
            (
                with(|c| {
                    c.gradient_salinity = 30.0;
                    c.fit_salinity = 20.0;
                }),
                winter(),
                50.0,
                Selection::new(20.0, 12),
            ),
            (with(|c| c.fit_salinity = 60.0), winter(), 50.0, Selection::new(50.0, 13)),
            (with(|c| c.fit_salinity = 40.0), winter(), 50.0, Selection::new(40.0, 14)),
            (with(|c| c.fit_salinity = 1.0), winter(), 50.0, Selection::new(50.0, 15)),
            (
                with(|c| {
                    c.gradient_salinity = 90.0;
                    c.fit_salinity = 60.0;
                }),
                winter(),
                50.0,
                Selection::new(50.0, 16),
            ),
        ];

        for (c, season, mld_temperature, expected) in cases {
            assert_eq!(select_salinity(&c, season, mld_temperature, &config()), expected);
        }
    }

    #[test]
    fn test_density_tree_leaves() {
        // Winter fixtures keep the salinity fit away from the density fit
        let winter_base = |edit: fn(&mut Candidates)| {
            with(|c| {
                c.fit_salinity = 80.0;
                edit(c);
            })
        };

        let cases = [
            (with(|c| c.fit_density = 40.0), summer(), 100.0, 200.0, Selection::new(40.0, 1)),
            (with(|c| c.fit_density = 80.0), summer(), 100.0, 200.0, Selection::new(50.0, 2)),
            (with(|c| c.fit_density = 80.0), summer(), 90.0, 85.0, Selection::new(80.0, 3)),
            (with(|c| c.fit_density = 40.0), summer(), 200.0, 60.0, Selection::new(50.0, 4)),
            (
                with(|c| {
                    c.fit_density = 40.0;
                    c.gradient_density = 45.0;
                }),
                summer(),
                42.0,
                44.0,
                Selection::new(44.0, 5),
            ),
            (base(), summer(), 200.0, 60.0, Selection::new(50.0, 6)),
            (
                with(|c| {
                    c.fit_density = 40.0;
                    c.gradient_density = 20.0;
                }),
                summer(),
                10.0,
                200.0,
                Selection::new(20.0, 7),
            ),
            (winter_base(|_| {}), winter(), 200.0, 100.0, Selection::new(50.0, 8)),
            (
                winter_base(|c| c.threshold_temperature = 40.0),
                winter(),
                200.0,
                100.0,
                Selection::new(40.0, 9),
            ),
            (
                winter_base(|c| c.fit_density = 30.0),
                winter(),
                200.0,
                100.0,
                Selection::new(30.0, 10),
            ),
            (
                winter_base(|c| c.intrusion_temperature = 40.0),
                winter(),
                200.0,
                100.0,
                Selection::new(40.0, 11),
            ),
            (
                winter_base(|c| {
                    c.intrusion_temperature = 40.0;
                    c.temperature_max = 45.0;
                }),
                winter(),
                200.0,
                100.0,
                Selection::new(45.0, 12),
            ),
            (
                winter_base(|c| c.intrusion_temperature = 40.0),
                winter(),
                200.0,
                40.0,
                Selection::new(40.0, 13),
            ),
            (
                winter_base(|c| c.density_min = 20.0),
                winter(),
                10.0,
                12.0,
                Selection::new(10.0, 14),
            ),
            (
                winter_base(|c| c.gradient_density = 30.0),
                winter(),
                20.0,
                100.0,
                Selection::new(30.0, 15),
            ),
            (base(), winter(), 200.0, 100.0, Selection::new(50.0, 16)),
            (
                winter_base(|c| {
                    c.density_min = 30.0;
                    c.gradient_density = 80.0;
                }),
                winter(),
                30.0,
                90.0,
                Selection::new(30.0, 17),
            ),
        ];

        for (c, season, mld_temperature, mld_salinity, expected) in cases {
            let sel = select_density(&c, season, mld_temperature, mld_salinity, &config());
            assert_eq!(sel, expected, "leaf {}", expected.code);
        }
    }
}
