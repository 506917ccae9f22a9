//! Length-normalised physical constants.
//!
//! Geometry and wavelengths are expressed in units of a reference length
//! $L_0$ (microns by default). Scaling $\epsilon_0$ and $\mu_0$ by $L_0$ makes
//! $c_0 = 1/\sqrt{\mu_0 \epsilon_0}$ come out in $L_0$/s, so that
//! $\omega = 2\pi c_0 / \lambda$ with $\lambda$ in units of $L_0$ is an SI
//! angular frequency, which is what the Drude parameters are quoted in.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// SI vacuum permittivity (F/m), as used by the reference sweep.
pub const EPS0_SI: f64 = 8.854e-12;

/// SI vacuum permeability (H/m).
pub const MU0_SI: f64 = 4.0 * PI * 1e-7;

/// One micron in metres.
pub const MICRONS: f64 = 1e-6;

/// Degrees-to-radians factor.
pub const DEGREES: f64 = PI / 180.0;

/// Vacuum constants rescaled to a reference length.
///
/// `c0` is not stored; it is always derived from the stored `eps0` and `mu0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "LengthScale", into = "LengthScale")]
pub struct PhysicalConstants {
    length_scale: f64,
    eps0: f64,
    mu0: f64,
}

/// Serialised form: only the reference length is persisted.
#[derive(Serialize, Deserialize)]
struct LengthScale {
    length_scale: f64,
}

impl From<LengthScale> for PhysicalConstants {
    fn from(value: LengthScale) -> Self {
        Self::with_length_scale(value.length_scale)
    }
}

impl From<PhysicalConstants> for LengthScale {
    fn from(value: PhysicalConstants) -> Self {
        Self {
            length_scale: value.length_scale,
        }
    }
}

impl PhysicalConstants {
    /// Constants for lengths measured in units of `length_scale` metres.
    pub fn with_length_scale(length_scale: f64) -> Self {
        Self {
            length_scale,
            eps0: EPS0_SI * length_scale,
            mu0: MU0_SI * length_scale,
        }
    }

    /// Constants for lengths measured in microns.
    pub fn microns() -> Self {
        Self::with_length_scale(MICRONS)
    }

    /// Reference length $L_0$ in metres.
    pub fn length_scale(&self) -> f64 {
        self.length_scale
    }

    /// Scaled vacuum permittivity $\epsilon_0 L_0$.
    pub fn eps0(&self) -> f64 {
        self.eps0
    }

    /// Scaled vacuum permeability $\mu_0 L_0$.
    pub fn mu0(&self) -> f64 {
        self.mu0
    }

    /// Speed of light in $L_0$ per second.
    pub fn c0(&self) -> f64 {
        1.0 / (self.mu0 * self.eps0).sqrt()
    }

    /// SI angular frequency for a free-space wavelength given in units of $L_0$.
    pub fn angular_frequency(&self, wavelength: f64) -> f64 {
        2.0 * PI * self.c0() / wavelength
    }
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::microns()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_c0_consistent_with_stored_constants() {
        let c = PhysicalConstants::microns();
        assert_eq!(c.c0(), 1.0 / (c.mu0() * c.eps0()).sqrt());
    }

    #[test]
    fn test_c0_in_microns_per_second() {
        // ~3e8 m/s is ~3e14 um/s
        let c = PhysicalConstants::microns();
        assert_relative_eq!(c.c0(), 2.998e14, max_relative = 1e-3);
    }

    #[test]
    fn test_angular_frequency_is_si() {
        // 1.5 um light is ~1.2566e15 rad/s
        let c = PhysicalConstants::microns();
        let omega = c.angular_frequency(1.5);
        let expected = 2.0 * PI * 299_792_458.0 / 1.5e-6;
        assert_relative_eq!(omega, expected, max_relative = 1e-3);
    }

    #[test]
    fn test_rebuilt_from_length_scale() {
        let c = PhysicalConstants::with_length_scale(1e-9);
        let stored: LengthScale = c.into();
        assert_eq!(PhysicalConstants::from(stored), c);
    }
}
