//! # Lattica Core
//!
//! The numerical backbone of the Lattica framework. This crate turns a
//! permittivity raster of one unit cell into a truncated Fourier-space
//! convolution operator, solves the resulting slab with rigorous coupled-wave
//! analysis, and drives that chain over a wavelength sweep.
//!
//! ## Architecture
//!
//! The sweep driver ([`sweep::SweepDriver`]) depends on two seams:
//! [`convolution::ConvolutionBuilder`] and [`solver::RcwaSolver`]. The bundled
//! implementations are [`convolution::FftConvolution`] and
//! [`solver::smatrix::ScatteringMatrixSolver`]; tests substitute stubs.
//!
//! ## Modules
//!
//! - [`harmonics`] - Plane-wave harmonic indexing.
//! - [`convolution`] - Convolution matrices from permittivity rasters.
//! - [`layer`] - Layers and layer stacks.
//! - [`solver`] - RCWA trait and the scattering-matrix implementation.
//! - [`sweep`] - Per-wavelength driver and its configuration.
//! - [`types`] - Solver settings, wavelength grids, spectra.

pub mod convolution;
pub mod harmonics;
pub mod layer;
pub mod solver;
pub mod sweep;
pub mod types;

pub use convolution::{ConvolutionBuilder, FftConvolution};
pub use harmonics::Harmonics;
pub use layer::{Layer, LayerStack};
pub use solver::smatrix::ScatteringMatrixSolver;
pub use solver::{Efficiencies, RcwaSolver, SolveRequest, SolverError};
pub use sweep::{run_sweep, InclusionModel, SweepConfig, SweepDriver, SweepError};
pub use types::{SolverSettings, SpectralPoint, Spectrum, WavelengthGrid};
