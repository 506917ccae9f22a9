//! Core types shared across the Lattica sweep pipeline.
//!
//! Solver settings, the wavelength grid a sweep runs over, and the spectrum it
//! produces.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::solver::Efficiencies;

/// Incidence, polarisation, truncation and half-space settings shared by every
/// wavelength of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Elevation angle of incidence (radians).
    pub theta: f64,
    /// Azimuthal angle of incidence (radians).
    pub phi: f64,
    /// TE amplitude, serialised as `[re, im]`.
    pub pte: Complex64,
    /// TM amplitude, serialised as `[re, im]`.
    pub ptm: Complex64,
    /// Truncation orders `[N, M]`.
    pub orders: [usize; 2],
    /// Relative permittivity of the reflection and transmission half spaces.
    pub half_space_permittivities: [f64; 2],
}

impl Default for SolverSettings {
    /// Normal incidence, circular polarisation
    /// $(\hat{\mathbf{a}}_{TE} + j\hat{\mathbf{a}}_{TM})/\sqrt{2}$, `N = M = 4`,
    /// vacuum on both sides.
    fn default() -> Self {
        let amp = std::f64::consts::FRAC_1_SQRT_2;
        Self {
            theta: 0.0,
            phi: 0.0,
            pte: Complex64::new(amp, 0.0),
            ptm: Complex64::new(0.0, amp),
            orders: [4, 4],
            half_space_permittivities: [1.0, 1.0],
        }
    }
}

impl SolverSettings {
    /// Number of retained harmonics $(2N + 1)(2M + 1)$.
    pub fn harmonic_count(&self) -> usize {
        (2 * self.orders[0] + 1) * (2 * self.orders[1] + 1)
    }
}

/// The wavelengths a sweep visits, in units of $L_0$.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WavelengthGrid {
    /// `points` evenly spaced values over `range`, endpoints included.
    Range { range: [f64; 2], points: usize },
    /// An explicit, ordered list.
    List { values: Vec<f64> },
}

impl Default for WavelengthGrid {
    fn default() -> Self {
        WavelengthGrid::Range {
            range: [1.2, 2.5],
            points: 113,
        }
    }
}

impl WavelengthGrid {
    pub fn linspace(start: f64, end: f64, points: usize) -> Self {
        WavelengthGrid::Range {
            range: [start, end],
            points,
        }
    }

    /// Materialise the grid in sweep order.
    pub fn wavelengths(&self) -> Vec<f64> {
        match self {
            WavelengthGrid::Range { range, points } => match *points {
                0 => Vec::new(),
                1 => vec![range[0]],
                n => {
                    let step = (range[1] - range[0]) / (n - 1) as f64;
                    (0..n)
                        .map(|i| if i == n - 1 { range[1] } else { range[0] + step * i as f64 })
                        .collect()
                }
            },
            WavelengthGrid::List { values } => values.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            WavelengthGrid::Range { points, .. } => *points,
            WavelengthGrid::List { values } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Efficiencies recorded at one wavelength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralPoint {
    pub wavelength: f64,
    pub reflection: f64,
    pub transmission: f64,
    /// $A = 1 - (R + T)$.
    pub absorption: f64,
}

impl SpectralPoint {
    pub fn new(wavelength: f64, efficiencies: Efficiencies) -> Self {
        Self {
            wavelength,
            reflection: efficiencies.reflection,
            transmission: efficiencies.transmission,
            absorption: efficiencies.absorption(),
        }
    }
}

/// Reflection, transmission and absorption spectra in sweep order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    pub points: Vec<SpectralPoint>,
}

impl Spectrum {
    pub fn new(points: Vec<SpectralPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn wavelengths(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.wavelength).collect()
    }

    pub fn reflection(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.reflection).collect()
    }

    pub fn transmission(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.transmission).collect()
    }

    pub fn absorption(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.absorption).collect()
    }

    /// Largest $|R + T - 1|$ over the spectrum; zero for lossless structures.
    pub fn max_energy_defect(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.absorption.abs())
            .fold(0.0, f64::max)
    }
}
