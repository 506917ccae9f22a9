//! Scattering matrices and the Redheffer star product.
//!
//! Every region is described relative to a zero-thickness free-space gap
//! medium, which makes each layer's S-matrix symmetric ($S_{11} = S_{22}$,
//! $S_{12} = S_{21}$) and lets the global matrix be built by straight
//! star-product accumulation.

use ndarray::Array2;
use num_complex::Complex64;

use super::direct;
use super::modes::Modes;
use crate::solver::SolverError;

/// A four-block scattering matrix.
#[derive(Debug, Clone)]
pub struct SMatrix {
    pub s11: Array2<Complex64>,
    pub s12: Array2<Complex64>,
    pub s21: Array2<Complex64>,
    pub s22: Array2<Complex64>,
}

impl SMatrix {
    /// The neutral element of the star product: no reflection, full transmission.
    pub fn identity(dim: usize) -> Self {
        Self {
            s11: Array2::zeros((dim, dim)),
            s12: Array2::eye(dim),
            s21: Array2::eye(dim),
            s22: Array2::zeros((dim, dim)),
        }
    }

    pub fn dim(&self) -> usize {
        self.s11.nrows()
    }

    /// Redheffer star product $S_A \star S_B$ (A on the incident side).
    pub fn star(&self, other: &SMatrix) -> Result<SMatrix, SolverError> {
        let eye = Array2::<Complex64>::eye(self.dim());

        let d = direct::right_divide(&self.s12, &(&eye - &other.s11.dot(&self.s22)))?;
        let f = direct::right_divide(&other.s21, &(&eye - &self.s22.dot(&other.s11)))?;

        Ok(SMatrix {
            s11: &self.s11 + &d.dot(&other.s11).dot(&self.s21),
            s12: d.dot(&other.s12),
            s21: f.dot(&self.s21),
            s22: &other.s22 + &f.dot(&self.s22).dot(&other.s12),
        })
    }
}

/// Layer coupling $\mathbf{A} = \mathbf{W}^{-1}\mathbf{W}_0 + \mathbf{V}^{-1}\mathbf{V}_0$,
/// $\mathbf{B} = \mathbf{W}^{-1}\mathbf{W}_0 - \mathbf{V}^{-1}\mathbf{V}_0$.
/// The gap medium always has $\mathbf{W}_0 = \mathbf{I}$.
fn layer_coupling(
    layer: &Modes,
    gap: &Modes,
) -> Result<(Array2<Complex64>, Array2<Complex64>), SolverError> {
    let w_inv = direct::inverse(&layer.w)?;
    let v_term = direct::solve(&layer.v, &gap.v)?;
    Ok((&w_inv + &v_term, &w_inv - &v_term))
}

/// Half-space coupling $\mathbf{A} = \mathbf{W}_0^{-1}\mathbf{W} + \mathbf{V}_0^{-1}\mathbf{V}$,
/// $\mathbf{B} = \mathbf{W}_0^{-1}\mathbf{W} - \mathbf{V}_0^{-1}\mathbf{V}$.
fn half_space_coupling(
    region: &Modes,
    gap: &Modes,
) -> Result<(Array2<Complex64>, Array2<Complex64>), SolverError> {
    let v_term = direct::solve(&gap.v, &region.v)?;
    Ok((&region.w + &v_term, &region.w - &v_term))
}

/// Symmetric S-matrix of a layer of normalised thickness `k0 * thickness`.
pub fn layer_smatrix(layer: &Modes, gap: &Modes, k0_thickness: f64) -> Result<SMatrix, SolverError> {
    let (a, b) = layer_coupling(layer, gap)?;
    let x = Array2::from_diag(&layer.lambda.mapv(|l| (-l * k0_thickness).exp()));

    let a_inv = direct::inverse(&a)?;
    let xb = x.dot(&b);
    let x_b_ainv_x = xb.dot(&a_inv).dot(&x);

    let d = &a - &x_b_ainv_x.dot(&b);
    let s11 = direct::solve(&d, &(&x_b_ainv_x.dot(&a) - &b))?;
    let s12 = direct::solve(&d, &x.dot(&(&a - &b.dot(&a_inv).dot(&b))))?;

    Ok(SMatrix {
        s11: s11.clone(),
        s12: s12.clone(),
        s21: s12,
        s22: s11,
    })
}

/// S-matrix coupling the reflection half space into the gap medium.
pub fn reflection_smatrix(region: &Modes, gap: &Modes) -> Result<SMatrix, SolverError> {
    let (a, b) = half_space_coupling(region, gap)?;
    let a_inv = direct::inverse(&a)?;
    let b_ainv = b.dot(&a_inv);

    Ok(SMatrix {
        s11: -a_inv.dot(&b),
        s12: a_inv.mapv(|c| c * 2.0),
        s21: (&a - &b_ainv.dot(&b)).mapv(|c| c * 0.5),
        s22: b_ainv,
    })
}

/// S-matrix coupling the gap medium into the transmission half space.
pub fn transmission_smatrix(region: &Modes, gap: &Modes) -> Result<SMatrix, SolverError> {
    let (a, b) = half_space_coupling(region, gap)?;
    let a_inv = direct::inverse(&a)?;
    let b_ainv = b.dot(&a_inv);

    Ok(SMatrix {
        s11: b_ainv.clone(),
        s12: (&a - &b_ainv.dot(&b)).mapv(|c| c * 0.5),
        s21: a_inv.mapv(|c| c * 2.0),
        s22: -a_inv.dot(&b),
    })
}
