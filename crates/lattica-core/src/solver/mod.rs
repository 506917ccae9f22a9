//! RCWA solver abstraction and implementations.
//!
//! The [`RcwaSolver`] trait is the only thing the sweep driver knows about the
//! electromagnetic solve: one [`SolveRequest`] in, total reflection and
//! transmission efficiencies out. [`smatrix::ScatteringMatrixSolver`] is the
//! bundled implementation; tests substitute stubs.

pub mod smatrix;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layer::LayerStack;

/// Errors that can occur during an RCWA solve.
#[derive(Debug, Error)]
pub enum SolverError {
    /// A diffraction order is exactly grazing ($k_z = 0$), i.e. a Wood's
    /// anomaly; the modal matching equations are singular there.
    #[error("Diffraction order ({p}, {q}) is grazing in the {region} (Wood's anomaly)")]
    GrazingOrder {
        p: isize,
        q: isize,
        region: &'static str,
    },

    #[error("Singular system: {0}")]
    Singular(String),

    #[error("Eigendecomposition failed: {0}")]
    Eigen(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Total diffraction efficiencies at one wavelength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Efficiencies {
    pub reflection: f64,
    pub transmission: f64,
}

impl Efficiencies {
    /// Power not accounted for by R or T, $A = 1 - (R + T)$.
    pub fn absorption(&self) -> f64 {
        1.0 - (self.reflection + self.transmission)
    }
}

/// Everything the solver needs for one wavelength.
#[derive(Debug, Clone)]
pub struct SolveRequest<'a> {
    /// Free-space wavelength (units of $L_0$).
    pub wavelength: f64,
    /// Elevation angle of incidence (radians).
    pub theta: f64,
    /// Azimuthal angle of incidence (radians).
    pub phi: f64,
    pub layers: &'a LayerStack,
    /// Lattice constants `[ax, ay]` (units of $L_0$).
    pub lattice_constants: [f64; 2],
    /// TE amplitude.
    pub pte: Complex64,
    /// TM amplitude.
    pub ptm: Complex64,
    pub order_x: usize,
    pub order_y: usize,
    /// Relative permittivity of the reflection and transmission half spaces.
    pub half_space_permittivities: [f64; 2],
}

/// The interface every RCWA implementation provides to the sweep driver.
pub trait RcwaSolver {
    /// Solve for total reflection and transmission at one wavelength.
    fn solve(&self, request: &SolveRequest<'_>) -> Result<Efficiencies, SolverError>;

    /// A human-readable name for this method.
    fn method_name(&self) -> &str;
}

impl<S: RcwaSolver + ?Sized> RcwaSolver for &S {
    fn solve(&self, request: &SolveRequest<'_>) -> Result<Efficiencies, SolverError> {
        (**self).solve(request)
    }

    fn method_name(&self) -> &str {
        (**self).method_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorption_closes_energy_balance() {
        let e = Efficiencies {
            reflection: 0.25,
            transmission: 0.5,
        };
        assert!((e.absorption() - 0.25).abs() < 1e-15);
    }
}
