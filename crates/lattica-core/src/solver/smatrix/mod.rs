//! Scattering-matrix RCWA for a stack of 2D-periodic layers.
//!
//! The solve proceeds in the usual order:
//!
//! 1. Floquet wave vectors for every retained harmonic ([`modes::WaveVectors`]).
//! 2. Modes of the free-space gap medium and the two half spaces (diagonal).
//! 3. Eigenmodes of each patterned layer from $\Omega^2 = \mathbf{P}\mathbf{Q}$.
//! 4. Layer, reflection-side, and transmission-side S-matrices, combined with
//!    the Redheffer star product ([`scattering`]).
//! 5. Source expansion, reflected/transmitted amplitudes, and diffraction
//!    efficiencies summed over orders.
//!
//! Time dependence is $e^{+j\omega t}$ throughout, so lossy media have
//! $\operatorname{Im}\epsilon < 0$.

pub mod direct;
pub mod modes;
pub mod scattering;

use std::f64::consts::{FRAC_PI_2, PI};

use ndarray::{s, Array1, Array2};
use num_complex::Complex64;

use self::modes::{homogeneous_modes, layer_modes, WaveVectors};
use self::scattering::{layer_smatrix, reflection_smatrix, transmission_smatrix, SMatrix};
use super::{Efficiencies, RcwaSolver, SolveRequest, SolverError};
use crate::harmonics::Harmonics;

/// The bundled RCWA implementation.
#[derive(Debug, Clone)]
pub struct ScatteringMatrixSolver {
    /// Log a warning when a lossless solve violates $R + T = 1$ by more than
    /// this amount.
    pub energy_tolerance: f64,
}

impl Default for ScatteringMatrixSolver {
    fn default() -> Self {
        Self {
            energy_tolerance: 1e-6,
        }
    }
}

impl ScatteringMatrixSolver {
    pub fn new(energy_tolerance: f64) -> Self {
        Self { energy_tolerance }
    }

    fn validate(request: &SolveRequest<'_>) -> Result<(), SolverError> {
        if !(request.wavelength.is_finite() && request.wavelength > 0.0) {
            return Err(SolverError::InvalidInput(format!(
                "wavelength must be finite and positive, got {}",
                request.wavelength
            )));
        }
        if request.lattice_constants.iter().any(|a| !(a.is_finite() && *a > 0.0)) {
            return Err(SolverError::InvalidInput(format!(
                "lattice constants must be finite and positive, got {:?}",
                request.lattice_constants
            )));
        }
        if request.half_space_permittivities.iter().any(|e| !(e.is_finite() && *e > 0.0)) {
            return Err(SolverError::InvalidInput(format!(
                "half-space permittivities must be finite and positive, got {:?}",
                request.half_space_permittivities
            )));
        }
        if !(0.0..FRAC_PI_2).contains(&request.theta) {
            return Err(SolverError::InvalidInput(format!(
                "elevation angle must lie in [0, pi/2), got {}",
                request.theta
            )));
        }
        if request.pte.norm_sqr() + request.ptm.norm_sqr() == 0.0 {
            return Err(SolverError::InvalidInput("polarisation amplitudes are both zero".into()));
        }
        if request.layers.is_empty() {
            return Err(SolverError::InvalidInput("layer stack is empty".into()));
        }
        Ok(())
    }
}

/// Unit incident polarisation $\hat{\mathbf{p}} \propto p_{TE}\hat{\mathbf{a}}_{TE} + p_{TM}\hat{\mathbf{a}}_{TM}$.
///
/// At normal incidence the TE direction is $\hat{\mathbf{y}}$; otherwise it is
/// $\hat{\mathbf{z}} \times \hat{\mathbf{k}}$, which is continuous with the
/// normal-incidence choice for $\phi = 0$.
fn polarisation_vector(k_inc: [f64; 3], pte: Complex64, ptm: Complex64) -> [Complex64; 3] {
    let cross = |a: [f64; 3], b: [f64; 3]| {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    };
    let normalise = |v: [f64; 3]| {
        let n = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        [v[0] / n, v[1] / n, v[2] / n]
    };

    let a_te = if k_inc[0].hypot(k_inc[1]) < 1e-12 {
        [0.0, 1.0, 0.0]
    } else {
        normalise(cross([0.0, 0.0, 1.0], k_inc))
    };
    let a_tm = normalise(cross(a_te, k_inc));

    let p = [
        pte * a_te[0] + ptm * a_tm[0],
        pte * a_te[1] + ptm * a_tm[1],
        pte * a_te[2] + ptm * a_tm[2],
    ];
    let norm = p.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt();
    [p[0] / norm, p[1] / norm, p[2] / norm]
}

/// Power carried by one side's modal amplitudes, normalised to the incident
/// flux: $\sum_i \operatorname{Re}(k_{z,i}) |\mathbf{e}_i|^2 / \operatorname{Re}(k_{z,\text{inc}})$.
///
/// `amplitudes` holds the x components followed by the y components; the z
/// component follows from $\nabla \cdot \mathbf{E} = 0$.
fn diffracted_power(
    kv: &WaveVectors,
    amplitudes: &Array1<Complex64>,
    kz: &Array1<Complex64>,
    flux_sign: f64,
) -> f64 {
    let n = kv.len();
    let ex = amplitudes.slice(s![..n]);
    let ey = amplitudes.slice(s![n..]);
    (0..n)
        .map(|i| {
            let ez = -(kv.kx[i] * ex[i] + kv.ky[i] * ey[i]) / kz[i];
            let e_sq = ex[i].norm_sqr() + ey[i].norm_sqr() + ez.norm_sqr();
            flux_sign * kz[i].re * e_sq
        })
        .sum::<f64>()
        / kv.k_inc[2]
}

/// A convolution matrix of a lossless medium is Hermitian.
fn is_hermitian(matrix: &Array2<Complex64>) -> bool {
    let n = matrix.nrows();
    (0..n).all(|i| (i..n).all(|j| (matrix[[i, j]] - matrix[[j, i]].conj()).norm() < 1e-12))
}

impl RcwaSolver for ScatteringMatrixSolver {
    fn solve(&self, request: &SolveRequest<'_>) -> Result<Efficiencies, SolverError> {
        Self::validate(request)?;

        let harmonics = Harmonics::new(request.order_x, request.order_y);
        let n = harmonics.len();
        assert_eq!(
            request.layers.order_count(),
            Some(n),
            "layer operators do not match truncation orders ({}, {})",
            request.order_x,
            request.order_y
        );

        let k0 = 2.0 * PI / request.wavelength;
        let [er_ref, er_trn] = request.half_space_permittivities;
        let kv = WaveVectors::new(
            harmonics,
            request.wavelength,
            request.theta,
            request.phi,
            er_ref.sqrt(),
            request.lattice_constants,
        );

        let kz_gap = kv.kz(Complex64::from(1.0));
        let kz_ref = kv.kz(Complex64::from(er_ref)).mapv(|k| -k);
        let kz_trn = kv.kz(Complex64::from(er_trn));
        kv.check_grazing(&kz_gap, "gap medium")?;
        kv.check_grazing(&kz_ref, "reflection region")?;
        kv.check_grazing(&kz_trn, "transmission region")?;

        let gap = homogeneous_modes(&kv, Complex64::from(1.0), &kz_gap, false);
        let ref_modes = homogeneous_modes(&kv, Complex64::from(er_ref), &kz_ref, true);
        let trn_modes = homogeneous_modes(&kv, Complex64::from(er_trn), &kz_trn, false);

        let mut global = SMatrix::identity(2 * n);
        for layer in request.layers.layers() {
            let modes = layer_modes(&kv, layer)?;
            let s_layer = layer_smatrix(&modes, &gap, k0 * layer.thickness)?;
            global = global.star(&s_layer)?;
        }
        global = reflection_smatrix(&ref_modes, &gap)?.star(&global)?;
        global = global.star(&transmission_smatrix(&trn_modes, &gap)?)?;

        // Half-space mode matrices are identities, so modal and field
        // amplitudes coincide on both sides.
        let pol = polarisation_vector(kv.k_inc, request.pte, request.ptm);
        let centre = harmonics.centre();
        let mut source = Array1::<Complex64>::zeros(2 * n);
        source[centre] = pol[0];
        source[n + centre] = pol[1];

        let reflected = global.s11.dot(&source);
        let transmitted = global.s21.dot(&source);

        let efficiencies = Efficiencies {
            reflection: diffracted_power(&kv, &reflected, &kz_ref, -1.0),
            transmission: diffracted_power(&kv, &transmitted, &kz_trn, 1.0),
        };

        let lossless = request
            .layers
            .layers()
            .iter()
            .all(|l| is_hermitian(&l.permittivity) && is_hermitian(&l.permeability));
        let balance = efficiencies.reflection + efficiencies.transmission;
        if lossless && (balance - 1.0).abs() > self.energy_tolerance {
            log::warn!(
                "energy not conserved at wavelength {}: R + T = {balance:.8}",
                request.wavelength
            );
        }

        Ok(efficiencies)
    }

    fn method_name(&self) -> &str {
        "Rigorous Coupled-Wave Analysis (S-matrix)"
    }
}
