//! Non-dispersive materials with a fixed complex permittivity.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::provider::{check_frequency, MaterialError, MaterialProvider};

/// A material whose permittivity does not depend on frequency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstantMaterial {
    name: String,
    epsilon: Complex64,
}

impl ConstantMaterial {
    pub fn new(name: impl Into<String>, epsilon: Complex64) -> Self {
        Self {
            name: name.into(),
            epsilon,
        }
    }

    /// Lossless dielectric with real relative permittivity.
    pub fn dielectric(name: impl Into<String>, epsilon_r: f64) -> Self {
        Self::new(name, Complex64::from(epsilon_r))
    }

    pub fn vacuum() -> Self {
        Self::dielectric("vacuum", 1.0)
    }

    pub fn epsilon(&self) -> Complex64 {
        self.epsilon
    }
}

impl MaterialProvider for ConstantMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn permittivity(&self, omega: f64) -> Result<Complex64, MaterialError> {
        check_frequency(omega)?;
        Ok(self.epsilon)
    }

    fn is_dispersive(&self) -> bool {
        false
    }
}
