//! Per-wavelength sweep driver.
//!
//! For every wavelength the driver recomputes the whole chain from scratch:
//! angular frequency, inclusion permittivity, permittivity raster, convolution
//! matrix, layer stack, RCWA solve. Nothing is cached between wavelengths, so
//! each point depends only on the immutable [`SweepConfig`] and its own
//! wavelength. That is what lets [`SweepDriver::run_parallel`] hand points to
//! rayon workers without any shared mutable state.

use lattica_geometry::{rasterize, CellGeometry, GeometryError};
use lattica_materials::{
    ConstantMaterial, DispersionParameters, DrudeMaterial, MaterialError, MaterialProvider,
    PhysicalConstants,
};
use num_complex::Complex64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::convolution::{ConvolutionBuilder, FftConvolution};
use crate::layer::LayerStack;
use crate::solver::smatrix::ScatteringMatrixSolver;
use crate::solver::{RcwaSolver, SolveRequest, SolverError};
use crate::types::{SolverSettings, SpectralPoint, Spectrum};

/// Errors that abort a sweep.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Invalid geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Material error: {0}")]
    Material(#[from] MaterialError),

    #[error("Wavelength must be finite and positive, got {0}")]
    InvalidWavelength(f64),

    #[error("Layer thickness must be finite and positive, got {0}")]
    InvalidThickness(f64),

    #[error("Raster {grid:?} is too coarse for truncation orders {orders:?}; need at least 4N+1 pixels per axis")]
    RasterTooCoarse { grid: [usize; 2], orders: [usize; 2] },

    #[error("Solver failed at wavelength {wavelength}: {source}")]
    Solver {
        wavelength: f64,
        #[source]
        source: SolverError,
    },
}

/// How the inclusion permittivity is obtained at each wavelength.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum InclusionModel {
    /// Drude metal with the run's [`DispersionParameters`].
    #[default]
    Drude,
    /// Fixed real permittivity; `epsilon = 1` models an empty hole.
    Constant { epsilon: f64 },
}

impl InclusionModel {
    fn provider(
        &self,
        dispersion: DispersionParameters,
    ) -> Result<Box<dyn MaterialProvider>, MaterialError> {
        Ok(match self {
            InclusionModel::Drude => Box::new(DrudeMaterial::new("drude", dispersion)?),
            InclusionModel::Constant { epsilon } => {
                Box::new(ConstantMaterial::dielectric("constant", *epsilon))
            }
        })
    }
}

fn default_host_permittivity() -> f64 {
    12.0
}

fn default_thickness() -> f64 {
    0.2
}

/// The immutable bundle every wavelength of a run shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default)]
    pub constants: PhysicalConstants,
    #[serde(default)]
    pub dispersion: DispersionParameters,
    #[serde(default)]
    pub cell: CellGeometry,
    /// Relative permittivity of the host medium.
    #[serde(default = "default_host_permittivity")]
    pub host_permittivity: f64,
    #[serde(default)]
    pub inclusion: InclusionModel,
    /// Slab thickness (units of $L_0$).
    #[serde(default = "default_thickness")]
    pub layer_thickness: f64,
    #[serde(default)]
    pub solver: SolverSettings,
}

impl Default for SweepConfig {
    /// The reference run: a Drude-metal rod in an $\epsilon_r = 12$ slab of
    /// thickness 0.2, microns, `N = M = 4`.
    fn default() -> Self {
        Self {
            constants: PhysicalConstants::default(),
            dispersion: DispersionParameters::default(),
            cell: CellGeometry::default(),
            host_permittivity: default_host_permittivity(),
            inclusion: InclusionModel::default(),
            layer_thickness: default_thickness(),
            solver: SolverSettings::default(),
        }
    }
}

impl SweepConfig {
    /// Reject configurations that can never produce a valid point.
    pub fn validate(&self) -> Result<(), SweepError> {
        self.cell.validate()?;
        if !(self.layer_thickness.is_finite() && self.layer_thickness > 0.0) {
            return Err(SweepError::InvalidThickness(self.layer_thickness));
        }
        let [n, m] = self.solver.orders;
        let [nx, ny] = self.cell.grid;
        if nx <= 4 * n || ny <= 4 * m {
            return Err(SweepError::RasterTooCoarse {
                grid: self.cell.grid,
                orders: self.solver.orders,
            });
        }
        Ok(())
    }
}

/// Runs a wavelength sweep with a given convolution builder and RCWA solver.
pub struct SweepDriver<B, S> {
    config: SweepConfig,
    builder: B,
    solver: S,
    inclusion: Box<dyn MaterialProvider>,
}

impl SweepDriver<FftConvolution, ScatteringMatrixSolver> {
    /// Driver for `config` with the bundled FFT builder and S-matrix solver.
    pub fn reference(config: SweepConfig) -> Result<Self, SweepError> {
        Self::new(config, FftConvolution, ScatteringMatrixSolver::default())
    }
}

impl<B: ConvolutionBuilder, S: RcwaSolver> SweepDriver<B, S> {
    /// Validate `config` and bind it to its collaborators.
    pub fn new(config: SweepConfig, builder: B, solver: S) -> Result<Self, SweepError> {
        config.validate()?;
        let inclusion = config.inclusion.provider(config.dispersion)?;
        Ok(Self {
            config,
            builder,
            solver,
            inclusion,
        })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn method_name(&self) -> &str {
        self.solver.method_name()
    }

    /// Run the full per-wavelength chain for one point.
    pub fn solve_point(&self, wavelength: f64) -> Result<SpectralPoint, SweepError> {
        if !(wavelength.is_finite() && wavelength > 0.0) {
            return Err(SweepError::InvalidWavelength(wavelength));
        }
        let cfg = &self.config;
        let settings = &cfg.solver;

        let omega = cfg.constants.angular_frequency(wavelength);
        let inclusion_eps = self.inclusion.permittivity(omega)?;

        let [nx, ny] = cfg.cell.grid;
        let map = rasterize(
            (nx, ny),
            cfg.cell.lattice_pitch,
            cfg.cell.radius,
            Complex64::from(cfg.host_permittivity),
            inclusion_eps,
        );

        let [order_x, order_y] = settings.orders;
        let conv = self.builder.build(&map, order_x, order_y);
        let stack = LayerStack::assemble(conv, settings.harmonic_count(), cfg.layer_thickness);

        let request = SolveRequest {
            wavelength,
            theta: settings.theta,
            phi: settings.phi,
            layers: &stack,
            lattice_constants: [cfg.cell.lattice_pitch, cfg.cell.lattice_pitch],
            pte: settings.pte,
            ptm: settings.ptm,
            order_x,
            order_y,
            half_space_permittivities: settings.half_space_permittivities,
        };
        let efficiencies = self
            .solver
            .solve(&request)
            .map_err(|source| SweepError::Solver { wavelength, source })?;

        log::debug!(
            "lambda = {wavelength:.6}: eps_incl = {inclusion_eps:.4}, R = {:.6}, T = {:.6}",
            efficiencies.reflection,
            efficiencies.transmission
        );
        Ok(SpectralPoint::new(wavelength, efficiencies))
    }

    /// Sweep `wavelengths` in order, one at a time.
    pub fn run(&self, wavelengths: &[f64]) -> Result<Spectrum, SweepError> {
        self.log_start(wavelengths.len(), "sequential");
        let points = wavelengths
            .iter()
            .map(|&wl| self.solve_point(wl))
            .collect::<Result<Vec<_>, _>>()?;
        let spectrum = Spectrum::new(points);
        self.log_finish(&spectrum);
        Ok(spectrum)
    }

    fn log_start(&self, count: usize, mode: &str) {
        log::info!(
            "{}: sweeping {count} wavelengths ({mode}, orders {:?}, grid {:?})",
            self.solver.method_name(),
            self.config.solver.orders,
            self.config.cell.grid
        );
    }

    fn log_finish(&self, spectrum: &Spectrum) {
        log::info!(
            "sweep complete: {} points, max |1 - R - T| = {:.3e}",
            spectrum.len(),
            spectrum.max_energy_defect()
        );
    }
}

impl<B, S> SweepDriver<B, S>
where
    B: ConvolutionBuilder + Sync,
    S: RcwaSolver + Sync,
{
    /// Sweep `wavelengths` across the rayon pool. The returned spectrum is in
    /// input order regardless of completion order; the first failing
    /// wavelength (in input order) is reported.
    pub fn run_parallel(&self, wavelengths: &[f64]) -> Result<Spectrum, SweepError> {
        self.log_start(wavelengths.len(), "parallel");
        let results: Vec<Result<SpectralPoint, SweepError>> = wavelengths
            .par_iter()
            .map(|&wl| self.solve_point(wl))
            .collect();
        let points = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        let spectrum = Spectrum::new(points);
        self.log_finish(&spectrum);
        Ok(spectrum)
    }
}

/// Sweep `config` over `wavelengths` with the bundled builder and solver.
pub fn run_sweep(config: SweepConfig, wavelengths: &[f64]) -> Result<Spectrum, SweepError> {
    SweepDriver::reference(config)?.run(wavelengths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::Efficiencies;
    use approx::assert_relative_eq;
    use lattica_geometry::PermittivityMap;
    use ndarray::Array2;

    /// Records the inclusion pixel value it was handed as the diagonal.
    struct MeanBuilder;

    impl ConvolutionBuilder for MeanBuilder {
        fn build(&self, map: &PermittivityMap, order_x: usize, order_y: usize) -> Array2<Complex64> {
            let n = (2 * order_x + 1) * (2 * order_y + 1);
            Array2::eye(n).mapv(|x: Complex64| x * map.mean())
        }
    }

    /// Reports the operator's diagonal as R so tests can see what reached the solver.
    struct EchoSolver;

    impl RcwaSolver for EchoSolver {
        fn solve(&self, request: &SolveRequest<'_>) -> Result<Efficiencies, SolverError> {
            let eps = request.layers.layers()[0].permittivity[[0, 0]];
            Ok(Efficiencies {
                reflection: eps.re,
                transmission: request.wavelength,
            })
        }

        fn method_name(&self) -> &str {
            "echo"
        }
    }

    fn small_config() -> SweepConfig {
        SweepConfig {
            cell: CellGeometry {
                grid: [16, 16],
                ..CellGeometry::default()
            },
            solver: SolverSettings {
                orders: [1, 1],
                ..SolverSettings::default()
            },
            ..SweepConfig::default()
        }
    }

    #[test]
    fn test_reference_config_is_valid() {
        let cfg = SweepConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.host_permittivity, 12.0);
        assert_eq!(cfg.layer_thickness, 0.2);
        assert_eq!(cfg.inclusion, InclusionModel::Drude);
    }

    #[test]
    fn test_invalid_geometry_rejected_before_sweep() {
        let mut cfg = small_config();
        cfg.cell.radius = 0.3;
        let err = SweepDriver::new(cfg, MeanBuilder, EchoSolver).err().unwrap();
        assert!(matches!(err, SweepError::Geometry(_)));
    }

    #[test]
    fn test_coarse_raster_rejected() {
        let mut cfg = small_config();
        cfg.cell.grid = [8, 8];
        cfg.solver.orders = [2, 2];
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, SweepError::RasterTooCoarse { .. }));
    }

    #[test]
    fn test_non_positive_wavelength_rejected() {
        let driver = SweepDriver::new(small_config(), MeanBuilder, EchoSolver).unwrap();
        assert!(matches!(driver.solve_point(0.0), Err(SweepError::InvalidWavelength(_))));
        assert!(matches!(driver.run(&[1.5, -1.0]), Err(SweepError::InvalidWavelength(_))));
    }

    #[test]
    fn test_constant_inclusion_reaches_solver() {
        let mut cfg = small_config();
        cfg.inclusion = InclusionModel::Constant { epsilon: 12.0 };
        let driver = SweepDriver::new(cfg, MeanBuilder, EchoSolver).unwrap();
        let point = driver.solve_point(1.5).unwrap();
        // inclusion equals host, so the map is uniform
        assert_relative_eq!(point.reflection, 12.0, epsilon = 1e-12);
        assert_relative_eq!(point.transmission, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_dispersion_recomputed_per_wavelength() {
        let driver = SweepDriver::new(small_config(), MeanBuilder, EchoSolver).unwrap();
        let spectrum = driver.run(&[1.2, 2.5]).unwrap();
        // a Drude inclusion is more negative at longer wavelengths
        assert!(spectrum.points[1].reflection < spectrum.points[0].reflection);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let cfg = small_config();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SweepConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
        let partial: SweepConfig =
            serde_json::from_str(r#"{"inclusion": {"model": "constant", "epsilon": 1.0}}"#).unwrap();
        assert_eq!(partial.inclusion, InclusionModel::Constant { epsilon: 1.0 });
        assert_eq!(partial.solver, SolverSettings::default());
    }
}
