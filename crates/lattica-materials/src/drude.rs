//! Drude free-electron permittivity.
//!
//! $$\epsilon(\omega) = 1 - \frac{\omega_p^2}{\omega^2 - i\omega\gamma}$$
//!
//! The imaginary part of this expression is non-positive for $\omega, \gamma > 0$,
//! which is the lossy sign under the $e^{+j\omega t}$ time dependence assumed
//! by the RCWA solver in `lattica-core`. Do not flip the sign of the damping
//! term without re-validating spectra against a trusted reference.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::provider::{check_frequency, MaterialError, MaterialProvider};

/// Drude parameters, both in SI rad/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispersionParameters {
    /// Plasma frequency $\omega_p$.
    pub plasma_frequency: f64,
    /// Collision (damping) rate $\gamma$.
    pub damping_rate: f64,
}

impl DispersionParameters {
    pub fn new(plasma_frequency: f64, damping_rate: f64) -> Self {
        Self {
            plasma_frequency,
            damping_rate,
        }
    }

    /// Same plasma frequency with the damping switched off.
    pub fn lossless(self) -> Self {
        Self {
            damping_rate: 0.0,
            ..self
        }
    }
}

impl Default for DispersionParameters {
    /// Metal used by the reference sweep: $\omega_p = 0.72\pi \times 10^{15}$,
    /// $\gamma = 5.5 \times 10^{12}$.
    fn default() -> Self {
        Self::new(0.72 * std::f64::consts::PI * 1e15, 5.5e12)
    }
}

/// Evaluate the Drude permittivity at angular frequency `omega`.
///
/// Total over positive `omega`; `omega = 0` is outside the model's domain.
pub fn drude_permittivity(omega: f64, plasma_frequency: f64, damping_rate: f64) -> Complex64 {
    let i = Complex64::new(0.0, 1.0);
    let denom = Complex64::from(omega * omega) - i * omega * damping_rate;
    Complex64::from(1.0) - plasma_frequency * plasma_frequency / denom
}

/// A Drude metal usable wherever a [`MaterialProvider`] is expected.
#[derive(Debug, Clone)]
pub struct DrudeMaterial {
    name: String,
    params: DispersionParameters,
}

impl DrudeMaterial {
    pub fn new(name: impl Into<String>, params: DispersionParameters) -> Result<Self, MaterialError> {
        if !(params.plasma_frequency.is_finite() && params.plasma_frequency >= 0.0) {
            return Err(MaterialError::InvalidParameter(format!(
                "plasma frequency must be finite and non-negative, got {}",
                params.plasma_frequency
            )));
        }
        if !(params.damping_rate.is_finite() && params.damping_rate >= 0.0) {
            return Err(MaterialError::InvalidParameter(format!(
                "damping rate must be finite and non-negative, got {}",
                params.damping_rate
            )));
        }
        Ok(Self {
            name: name.into(),
            params,
        })
    }

    pub fn params(&self) -> DispersionParameters {
        self.params
    }
}

impl MaterialProvider for DrudeMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn permittivity(&self, omega: f64) -> Result<Complex64, MaterialError> {
        check_frequency(omega)?;
        Ok(drude_permittivity(
            omega,
            self.params.plasma_frequency,
            self.params.damping_rate,
        ))
    }

    fn is_dispersive(&self) -> bool {
        true
    }
}
