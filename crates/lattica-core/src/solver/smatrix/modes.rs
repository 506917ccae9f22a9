//! Normalised wave vectors and modal fields of each region.
//!
//! All wave vectors are normalised by $k_0 = 2\pi/\lambda$ and the time
//! dependence is $e^{+j\omega t}$. Homogeneous regions have diagonal mode
//! matrices ($\mathbf{W} = \mathbf{I}$, $\mathbf{V} = \mathbf{Q}\boldsymbol\Lambda^{-1}$);
//! patterned layers need the eigendecomposition of $\Omega^2 = \mathbf{P}\mathbf{Q}$.

use ndarray::{s, Array1, Array2};
use num_complex::Complex64;

use super::direct;
use crate::harmonics::Harmonics;
use crate::layer::Layer;
use crate::solver::SolverError;

/// Below this $|k_z|$ an order is treated as exactly grazing.
const GRAZING_TOLERANCE: f64 = 1e-12;

const J: Complex64 = Complex64::new(0.0, 1.0);

/// Transverse wave vectors of every harmonic.
#[derive(Debug, Clone)]
pub struct WaveVectors {
    pub harmonics: Harmonics,
    /// Incident wave vector $(k_x, k_y, k_z) / k_0$.
    pub k_inc: [f64; 3],
    pub kx: Array1<f64>,
    pub ky: Array1<f64>,
}

impl WaveVectors {
    /// Floquet wave vectors $k_{x,p} = k_{x,\text{inc}} - p\lambda/a_x$ and
    /// likewise for $y$, for light incident from a medium of index `n_inc`.
    pub fn new(
        harmonics: Harmonics,
        wavelength: f64,
        theta: f64,
        phi: f64,
        n_inc: f64,
        lattice_constants: [f64; 2],
    ) -> Self {
        let k_inc = [
            n_inc * theta.sin() * phi.cos(),
            n_inc * theta.sin() * phi.sin(),
            n_inc * theta.cos(),
        ];
        let [ax, ay] = lattice_constants;
        let (kx, ky): (Vec<f64>, Vec<f64>) = harmonics
            .iter()
            .map(|(p, q)| {
                (
                    k_inc[0] - p as f64 * wavelength / ax,
                    k_inc[1] - q as f64 * wavelength / ay,
                )
            })
            .unzip();
        Self {
            harmonics,
            k_inc,
            kx: Array1::from(kx),
            ky: Array1::from(ky),
        }
    }

    pub fn len(&self) -> usize {
        self.kx.len()
    }

    pub fn kx_matrix(&self) -> Array2<Complex64> {
        Array2::from_diag(&self.kx.mapv(Complex64::from))
    }

    pub fn ky_matrix(&self) -> Array2<Complex64> {
        Array2::from_diag(&self.ky.mapv(Complex64::from))
    }

    /// Longitudinal wave vector $k_z = \overline{\sqrt{\bar\epsilon - k_x^2 - k_y^2}}$
    /// in a homogeneous, non-magnetic medium. Evanescent orders get
    /// $\operatorname{Im} k_z < 0$ so they decay along $+z$.
    pub fn kz(&self, epsilon: Complex64) -> Array1<Complex64> {
        // keep a lossless medium's imaginary part at +0.0 so that sqrt of a
        // negative argument lands on +j before the conjugate
        let im = if epsilon.im == 0.0 { 0.0 } else { -epsilon.im };
        Array1::from_shape_fn(self.len(), |i| {
            let re = epsilon.re - self.kx[i] * self.kx[i] - self.ky[i] * self.ky[i];
            Complex64::new(re, im).sqrt().conj()
        })
    }

    /// Nearest-to-grazing order, as `(p, q, |k_z|)`.
    pub fn most_grazing(&self, kz: &Array1<Complex64>) -> (isize, isize, f64) {
        self.harmonics
            .iter()
            .zip(kz.iter())
            .map(|((p, q), k)| (p, q, k.norm()))
            .fold((0, 0, f64::INFINITY), |best, cur| if cur.2 < best.2 { cur } else { best })
    }

    /// Fail if any order is exactly grazing in `region`.
    pub fn check_grazing(&self, kz: &Array1<Complex64>, region: &'static str) -> Result<(), SolverError> {
        let (p, q, norm) = self.most_grazing(kz);
        if norm < GRAZING_TOLERANCE {
            return Err(SolverError::GrazingOrder { p, q, region });
        }
        if norm < 1e-3 {
            log::warn!("order ({p}, {q}) is nearly grazing in the {region} (|kz| = {norm:.2e})");
        }
        Ok(())
    }
}

/// Mode matrices of one region: electric `w`, magnetic `v`, and the
/// eigenvalues `lambda` of the longitudinal propagation.
#[derive(Debug, Clone)]
pub struct Modes {
    pub w: Array2<Complex64>,
    pub v: Array2<Complex64>,
    pub lambda: Array1<Complex64>,
}

/// Assemble a 2x2 block matrix.
pub(crate) fn block2(
    a11: &Array2<Complex64>,
    a12: &Array2<Complex64>,
    a21: &Array2<Complex64>,
    a22: &Array2<Complex64>,
) -> Array2<Complex64> {
    let (n, m) = a11.dim();
    let mut out = Array2::zeros((n + a21.nrows(), m + a12.ncols()));
    out.slice_mut(s![..n, ..m]).assign(a11);
    out.slice_mut(s![..n, m..]).assign(a12);
    out.slice_mut(s![n.., ..m]).assign(a21);
    out.slice_mut(s![n.., m..]).assign(a22);
    out
}

/// Modes of a homogeneous, non-magnetic region with permittivity `epsilon`.
///
/// `lambda` is $\pm j k_z$, with the sign chosen so that it is $+j|k_z|$ for
/// propagating orders: `kz` is taken as given for the gap and transmission
/// side, and negated for the reflection side where $k_z$ points along $-z$.
pub fn homogeneous_modes(
    kv: &WaveVectors,
    epsilon: Complex64,
    kz: &Array1<Complex64>,
    reflection_side: bool,
) -> Modes {
    let n = kv.len();
    let kx = &kv.kx;
    let ky = &kv.ky;

    let sign = if reflection_side { -J } else { J };
    let lam: Array1<Complex64> = kz.mapv(|k| sign * k);

    // Q is built from diagonal blocks; V = Q Lambda^-1 just scales columns.
    let mut q11 = Array2::<Complex64>::zeros((n, n));
    let mut q12 = Array2::<Complex64>::zeros((n, n));
    let mut q21 = Array2::<Complex64>::zeros((n, n));
    let mut q22 = Array2::<Complex64>::zeros((n, n));
    for i in 0..n {
        let inv = Complex64::from(1.0) / lam[i];
        q11[[i, i]] = kx[i] * ky[i] * inv;
        q12[[i, i]] = (epsilon - kx[i] * kx[i]) * inv;
        q21[[i, i]] = (ky[i] * ky[i] - epsilon) * inv;
        q22[[i, i]] = -kx[i] * ky[i] * inv;
    }

    let mut lambda = Array1::zeros(2 * n);
    lambda.slice_mut(s![..n]).assign(&lam);
    lambda.slice_mut(s![n..]).assign(&lam);

    Modes {
        w: Array2::eye(2 * n),
        v: block2(&q11, &q12, &q21, &q22),
        lambda,
    }
}

/// Eigenmodes of a patterned layer from its convolution operators.
pub fn layer_modes(kv: &WaveVectors, layer: &Layer) -> Result<Modes, SolverError> {
    let kx = kv.kx_matrix();
    let ky = kv.ky_matrix();
    let erc = &layer.permittivity;
    let urc = &layer.permeability;
    let er_inv = direct::inverse(erc)?;
    let ur_inv = direct::inverse(urc)?;

    let kx_er_inv = kx.dot(&er_inv);
    let ky_er_inv = ky.dot(&er_inv);
    let p = block2(
        &kx_er_inv.dot(&ky),
        &(urc - &kx_er_inv.dot(&kx)),
        &(&ky_er_inv.dot(&ky) - urc),
        &(-ky_er_inv.dot(&kx)),
    );

    let kx_ur_inv = kx.dot(&ur_inv);
    let ky_ur_inv = ky.dot(&ur_inv);
    let q = block2(
        &kx_ur_inv.dot(&ky),
        &(erc - &kx_ur_inv.dot(&kx)),
        &(&ky_ur_inv.dot(&ky) - erc),
        &(-ky_ur_inv.dot(&kx)),
    );

    let omega_sq = p.dot(&q);
    let (lambda_sq, w) = direct::eig(&omega_sq)?;
    let lambda = lambda_sq.mapv(|l| l.sqrt());

    if let Some(i) = lambda.iter().position(|l| l.norm() < GRAZING_TOLERANCE) {
        return Err(SolverError::Singular(format!(
            "layer eigenmode {i} has zero propagation constant"
        )));
    }

    // V = Q W Lambda^-1
    let mut v = q.dot(&w);
    for (mut col, l) in v.columns_mut().into_iter().zip(lambda.iter()) {
        col.mapv_inplace(|x| x / *l);
    }

    Ok(Modes { w, v, lambda })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_incidence_wave_vectors() {
        let h = Harmonics::new(1, 1);
        let kv = WaveVectors::new(h, 1.5, 0.0, 0.0, 1.0, [0.5, 0.5]);
        assert_eq!(kv.k_inc, [0.0, 0.0, 1.0]);
        assert_eq!(kv.kx[h.centre()], 0.0);
        assert!((kv.kx[h.index(1, 0)] + 3.0).abs() < 1e-12);
        assert!((kv.ky[h.index(0, -1)] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_kz_branches() {
        let h = Harmonics::new(1, 0);
        let kv = WaveVectors::new(h, 1.5, 0.0, 0.0, 1.0, [0.5, 0.5]);
        let kz = kv.kz(Complex64::from(1.0));
        // specular order propagates with kz = 1
        assert!((kz[h.centre()] - Complex64::from(1.0)).norm() < 1e-12);
        // first orders are evanescent and decay along +z
        let k1 = kz[h.index(1, 0)];
        assert!(k1.re.abs() < 1e-12);
        assert!((k1.im + (9.0f64 - 1.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_grazing_order_detected_at_rayleigh_wavelength() {
        let h = Harmonics::new(1, 1);
        let kv = WaveVectors::new(h, 0.5, 0.0, 0.0, 1.0, [0.5, 0.5]);
        let kz = kv.kz(Complex64::from(1.0));
        let err = kv.check_grazing(&kz, "gap medium").unwrap_err();
        assert!(matches!(err, SolverError::GrazingOrder { .. }));
    }

    #[test]
    fn test_homogeneous_layer_modes_match_region_modes() {
        // A uniform layer has Omega^2 = diag(kx^2 + ky^2 - eps), so its
        // eigenvalues are j*kz up to branch choice.
        let h = Harmonics::new(1, 1);
        let kv = WaveVectors::new(h, 1.5, 0.0, 0.0, 1.0, [0.5, 0.5]);
        let eps = Complex64::from(12.0);
        let n = h.len();
        let layer = Layer::new(
            Array2::eye(n).mapv(|x: Complex64| x * eps),
            Array2::eye(n),
            0.2,
        );
        let modes = layer_modes(&kv, &layer).unwrap();
        let kz = kv.kz(eps);
        let mut expected: Vec<f64> = kz.iter().chain(kz.iter()).map(|k| k.norm()).collect();
        let mut got: Vec<f64> = modes.lambda.iter().map(|l| l.norm()).collect();
        expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
        got.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for (g, e) in got.iter().zip(expected.iter()) {
            assert!((g - e).abs() < 1e-9, "|lambda| {g} vs |kz| {e}");
        }
    }
}
