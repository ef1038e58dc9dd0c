//! Equation of state for seawater density.
//!
//! Computes the potential density anomaly σ₀ = ρ(S, T, p = 0) − 1000 kg/m³
//! used by the mixed-layer-depth algorithm. Referencing density to the
//! surface removes the pure-compressibility signal so that a well-mixed
//! column shows constant σ₀ regardless of depth.
//!
//! # References
//!
//! - UNESCO (1981): Tenth report of the joint panel on oceanographic tables and standards.
//! - Millero & Poisson (1981): International one-atmosphere equation of state of seawater.
//!
//! Glider processing chains often use TEOS-10 (`rho(SA, CT, 0)`) instead.
//! The two differ by a near-constant offset of a few hundredths of kg/m³,
//! which mostly cancels in the 0.03 kg/m³ threshold, but threshold and
//! density MLDs can still differ by a grid step from TEOS-10 output.
//!
//! # Units
//!
//! - Temperature: °C
//! - Salinity: g/kg (absolute) or PSU; the one-atmosphere formula does not distinguish
//! - Density: kg/m³

/// Reference density for seawater (kg/m³).
pub const RHO_0: f64 = 1025.0;

/// Anything that can turn (temperature, salinity) into a surface-referenced
/// density anomaly.
///
/// The MLD core is generic over this so a caller can swap in a cheaper or a
/// more accurate formulation without touching the algorithm.
pub trait DensityModel: Send + Sync {
    /// Potential density anomaly σ₀ in kg/m³ at zero reference pressure.
    fn potential_density_anomaly(&self, temperature: f64, salinity: f64) -> f64;

    /// σ₀ for a whole profile.
    ///
    /// `temperature` and `salinity` must have the same length.
    fn potential_density_profile(&self, temperature: &[f64], salinity: &[f64]) -> Vec<f64> {
        temperature
            .iter()
            .zip(salinity.iter())
            .map(|(&t, &s)| self.potential_density_anomaly(t, s))
            .collect()
    }
}

/// UNESCO EOS-80 one-atmosphere equation of state.
#[derive(Clone, Debug, Default)]
pub struct EquationOfState;

impl EquationOfState {
    /// Create a new equation of state calculator.
    pub fn new() -> Self {
        Self
    }

    /// Compute seawater density at surface pressure (p = 0).
    ///
    /// # Arguments
    /// * `temperature` - Temperature in °C
    /// * `salinity` - Salinity in g/kg
    ///
    /// # Returns
    /// Density in kg/m³
    ///
    /// # Example
    /// ```
    /// use mld_rs::seawater::EquationOfState;
    ///
    /// let eos = EquationOfState::new();
    ///
    /// let rho = eos.density_surface(10.0, 35.0);
    /// assert!((rho - 1026.97).abs() < 0.1);
    ///
    /// // Fresh water at 4°C (maximum density)
    /// let rho_fresh = eos.density_surface(4.0, 0.0);
    /// assert!((rho_fresh - 1000.0).abs() < 0.1);
    /// ```
    pub fn density_surface(&self, temperature: f64, salinity: f64) -> f64 {
        let t = temperature;
        let s = salinity;

        // Pure water density (Bigg formula)
        let rho_w = 999.842594 + 6.793952e-2 * t - 9.095290e-3 * t.powi(2)
            + 1.001685e-4 * t.powi(3)
            - 1.120083e-6 * t.powi(4)
            + 6.536336e-9 * t.powi(5);

        let a0 = 8.24493e-1;
        let a1 = -4.0899e-3;
        let a2 = 7.6438e-5;
        let a3 = -8.2467e-7;
        let a4 = 5.3875e-9;

        let b0 = -5.72466e-3;
        let b1 = 1.0227e-4;
        let b2 = -1.6546e-6;

        let c0 = 4.8314e-4;

        let a = a0 + a1 * t + a2 * t.powi(2) + a3 * t.powi(3) + a4 * t.powi(4);
        let b = b0 + b1 * t + b2 * t.powi(2);

        rho_w + a * s + b * s.powf(1.5) + c0 * s.powi(2)
    }

    /// Compute density anomaly σ = ρ - 1000 kg/m³.
    pub fn sigma(&self, temperature: f64, salinity: f64) -> f64 {
        self.density_surface(temperature, salinity) - 1000.0
    }
}

impl DensityModel for EquationOfState {
    fn potential_density_anomaly(&self, temperature: f64, salinity: f64) -> f64 {
        self.sigma(temperature, salinity)
    }
}

/// Linear equation of state.
///
/// ρ = ρ₀ * (1 - α(T - T₀) + β(S - S₀))
///
/// Useful for synthetic profiles where the density signal should follow
/// temperature and salinity exactly.
#[derive(Clone, Debug)]
pub struct LinearEquationOfState {
    /// Reference density (kg/m³)
    pub rho_0: f64,
    /// Reference temperature (°C)
    pub t_0: f64,
    /// Reference salinity (g/kg)
    pub s_0: f64,
    /// Thermal expansion coefficient (1/°C)
    pub alpha: f64,
    /// Haline contraction coefficient (1/(g/kg))
    pub beta: f64,
}

impl Default for LinearEquationOfState {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearEquationOfState {
    /// Linear EOS around T₀ = 10°C, S₀ = 35 g/kg.
    pub fn new() -> Self {
        Self {
            rho_0: RHO_0,
            t_0: 10.0,
            s_0: 35.0,
            alpha: 1.7e-4,
            beta: 7.6e-4,
        }
    }

    /// Create with custom reference state and coefficients.
    pub fn with_params(rho_0: f64, t_0: f64, s_0: f64, alpha: f64, beta: f64) -> Self {
        Self {
            rho_0,
            t_0,
            s_0,
            alpha,
            beta,
        }
    }

    /// Compute density using linear approximation.
    pub fn density(&self, temperature: f64, salinity: f64) -> f64 {
        self.rho_0
            * (1.0 - self.alpha * (temperature - self.t_0) + self.beta * (salinity - self.s_0))
    }
}

impl DensityModel for LinearEquationOfState {
    fn potential_density_anomaly(&self, temperature: f64, salinity: f64) -> f64 {
        self.density(temperature, salinity) - 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 0.1; // 0.1 kg/m³ tolerance

    #[test]
    fn test_pure_water_density() {
        let eos = EquationOfState::new();

        let rho_4c = eos.density_surface(4.0, 0.0);
        assert!((rho_4c - 1000.0).abs() < TOL);

        let rho_20c = eos.density_surface(20.0, 0.0);
        assert!((rho_20c - 998.2).abs() < TOL);
    }

    #[test]
    fn test_seawater_density() {
        let eos = EquationOfState::new();

        // Standard seawater: T=10°C, S=35
        let rho = eos.density_surface(10.0, 35.0);
        assert!((rho - 1026.97).abs() < TOL);

        // Cold Atlantic water
        let rho_cold = eos.density_surface(0.0, 35.0);
        assert!((rho_cold - 1028.1).abs() < TOL);

        // Warm tropical
        let rho_warm = eos.density_surface(25.0, 35.0);
        assert!((rho_warm - 1023.3).abs() < TOL);
    }

    #[test]
    fn test_sigma_is_anomaly() {
        let eos = EquationOfState::new();
        let sigma = eos.potential_density_anomaly(10.0, 35.0);
        assert!((sigma - 26.97).abs() < TOL);
    }

    #[test]
    fn test_warming_lightens_water() {
        let eos = EquationOfState::new();
        assert!(eos.sigma(5.0, 35.0) > eos.sigma(15.0, 35.0));
        assert!(eos.sigma(10.0, 35.0) > eos.sigma(10.0, 30.0));
    }

    #[test]
    fn test_profile_matches_pointwise() {
        let eos = EquationOfState::new();
        let t = [12.0, 11.0, 8.5];
        let s = [35.0, 35.1, 35.3];
        let sigma = eos.potential_density_profile(&t, &s);

        assert_eq!(sigma.len(), 3);
        for i in 0..3 {
            assert_eq!(sigma[i], eos.sigma(t[i], s[i]));
        }
    }

    #[test]
    fn test_linear_eos_reference_state() {
        let eos = LinearEquationOfState::new();
        let sigma = eos.potential_density_anomaly(10.0, 35.0);
        assert!((sigma - 25.0).abs() < 1e-10);

        // Both formulations agree on the sign of the response
        let full = EquationOfState::new();
        assert!(eos.density(12.0, 35.0) < eos.density(10.0, 35.0));
        assert!(full.density_surface(12.0, 35.0) < full.density_surface(10.0, 35.0));
    }
}
