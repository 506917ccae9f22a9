//! Material property provider trait.
//!
//! Every permittivity source implements [`MaterialProvider`], which returns a
//! complex relative permittivity at a given angular frequency. Dispersive
//! models (Drude) and fixed dielectrics share the same interface so the sweep
//! driver can swap one for the other without changing the loop.

use num_complex::Complex64;
use thiserror::Error;

/// Errors from material providers.
#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("Angular frequency must be finite and positive, got {omega} rad/s")]
    InvalidFrequency { omega: f64 },

    #[error("Invalid material parameter: {0}")]
    InvalidParameter(String),
}

/// Provides frequency-dependent relative permittivity.
pub trait MaterialProvider: Send + Sync {
    /// Human-readable name of this material.
    fn name(&self) -> &str;

    /// Complex relative permittivity $\epsilon(\omega)$ at angular frequency
    /// `omega` (SI rad/s).
    fn permittivity(&self, omega: f64) -> Result<Complex64, MaterialError>;

    /// Whether the permittivity varies with frequency.
    fn is_dispersive(&self) -> bool;

    /// Complex refractive index $\tilde{n} = \sqrt{\epsilon}$.
    fn refractive_index(&self, omega: f64) -> Result<Complex64, MaterialError> {
        let eps = self.permittivity(omega)?;
        Ok(eps.sqrt())
    }
}

/// Reject zero, negative, and non-finite angular frequencies.
pub(crate) fn check_frequency(omega: f64) -> Result<(), MaterialError> {
    if omega.is_finite() && omega > 0.0 {
        Ok(())
    } else {
        Err(MaterialError::InvalidFrequency { omega })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_frequency_rejects_degenerate_values() {
        assert!(check_frequency(1.0e15).is_ok());
        assert!(check_frequency(0.0).is_err());
        assert!(check_frequency(-3.0).is_err());
        assert!(check_frequency(f64::NAN).is_err());
        assert!(check_frequency(f64::INFINITY).is_err());
    }
}
