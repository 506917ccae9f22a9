//! Integration test: the sweep driver returns points in input order.
//!
//! A stub solver encodes the wavelength it was called with into R, so any
//! reordering (or mixing of per-point state between workers) shows up as a
//! mismatch against the input list.

use std::thread;
use std::time::Duration;

use lattica_core::sweep::{SweepConfig, SweepDriver, SweepError};
use lattica_core::types::SolverSettings;
use lattica_core::{ConvolutionBuilder, Efficiencies, RcwaSolver, SolveRequest, SolverError};
use lattica_geometry::{CellGeometry, PermittivityMap};
use ndarray::Array2;
use num_complex::Complex64;

struct DiagonalBuilder;

impl ConvolutionBuilder for DiagonalBuilder {
    fn build(&self, map: &PermittivityMap, order_x: usize, order_y: usize) -> Array2<Complex64> {
        let n = (2 * order_x + 1) * (2 * order_y + 1);
        Array2::eye(n).mapv(|x: Complex64| x * map.mean())
    }
}

/// Returns `R = wavelength / 10`, `T = 1 - R`, sleeping longer for shorter
/// wavelengths so parallel completion order is roughly reversed.
struct EncodingSolver {
    fail_at: Option<f64>,
}

impl RcwaSolver for EncodingSolver {
    fn solve(&self, request: &SolveRequest<'_>) -> Result<Efficiencies, SolverError> {
        if self.fail_at == Some(request.wavelength) {
            return Err(SolverError::Singular("stub failure".into()));
        }
        let delay = ((3.0 - request.wavelength) * 5.0).max(0.0) as u64;
        thread::sleep(Duration::from_millis(delay));
        let r = request.wavelength / 10.0;
        Ok(Efficiencies {
            reflection: r,
            transmission: 1.0 - r,
        })
    }

    fn method_name(&self) -> &str {
        "encoding stub"
    }
}

fn config() -> SweepConfig {
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

fn wavelengths() -> Vec<f64> {
    // deliberately unsorted
    vec![2.4, 1.3, 1.9, 1.2, 2.5, 1.55, 2.05, 1.7]
}

#[test]
fn test_sequential_order_matches_input() {
    let driver = SweepDriver::new(config(), DiagonalBuilder, EncodingSolver { fail_at: None }).unwrap();
    let input = wavelengths();
    let spectrum = driver.run(&input).unwrap();

    assert_eq!(spectrum.wavelengths(), input);
    for (point, wl) in spectrum.points.iter().zip(&input) {
        assert!((point.reflection - wl / 10.0).abs() < 1e-15);
        assert!(point.absorption.abs() < 1e-15);
    }
}

#[test]
fn test_parallel_order_matches_sequential() {
    let driver = SweepDriver::new(config(), DiagonalBuilder, EncodingSolver { fail_at: None }).unwrap();
    let input = wavelengths();
    let sequential = driver.run(&input).unwrap();
    let parallel = driver.run_parallel(&input).unwrap();
    assert_eq!(parallel, sequential);
}

#[test]
fn test_empty_sweep_gives_empty_spectrum() {
    let driver = SweepDriver::new(config(), DiagonalBuilder, EncodingSolver { fail_at: None }).unwrap();
    assert!(driver.run(&[]).unwrap().is_empty());
    assert!(driver.run_parallel(&[]).unwrap().is_empty());
}

#[test]
fn test_solver_failure_aborts_with_wavelength() {
    let driver =
        SweepDriver::new(config(), DiagonalBuilder, EncodingSolver { fail_at: Some(1.9) }).unwrap();
    for result in [driver.run(&wavelengths()), driver.run_parallel(&wavelengths())] {
        match result {
            Err(SweepError::Solver { wavelength, source }) => {
                assert_eq!(wavelength, 1.9);
                assert!(matches!(source, SolverError::Singular(_)));
            }
            other => panic!("expected solver failure, got {other:?}"),
        }
    }
}
