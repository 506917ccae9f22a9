//! Dense complex linear algebra via `faer`.
//!
//! Operators live in `ndarray` throughout the crate; this module converts at
//! the boundary for LU solves and the general complex eigendecomposition of
//! $\Omega^2$. Results are checked for non-finite entries, which is how a
//! singular pivot shows up after partial-pivot LU.

use faer::complex_native::c64;
use faer::linalg::solvers::SpSolver;
use faer::{Mat, MatRef};
use ndarray::{Array1, Array2};
use num_complex::Complex64;

use super::super::SolverError;

fn to_faer(matrix: &Array2<Complex64>) -> Mat<c64> {
    Mat::<c64>::from_fn(matrix.nrows(), matrix.ncols(), |i, j| {
        let c = matrix[[i, j]];
        c64::new(c.re, c.im)
    })
}

fn from_faer(matrix: MatRef<'_, c64>) -> Array2<Complex64> {
    Array2::from_shape_fn((matrix.nrows(), matrix.ncols()), |(i, j)| {
        let c = matrix.read(i, j);
        Complex64::new(c.re, c.im)
    })
}

fn all_finite(matrix: &Array2<Complex64>) -> bool {
    matrix.iter().all(|c| c.re.is_finite() && c.im.is_finite())
}

/// Solve $\mathbf{A}\mathbf{X} = \mathbf{B}$ by LU decomposition with partial
/// pivoting.
pub fn solve(
    matrix: &Array2<Complex64>,
    rhs: &Array2<Complex64>,
) -> Result<Array2<Complex64>, SolverError> {
    let dim = matrix.nrows();
    assert_eq!(dim, matrix.ncols(), "Matrix must be square");
    assert_eq!(dim, rhs.nrows(), "RHS rows must match matrix dimension");

    let lu = to_faer(matrix).partial_piv_lu();
    let solution = from_faer(lu.solve(&to_faer(rhs)).as_ref());

    if all_finite(&solution) {
        Ok(solution)
    } else {
        Err(SolverError::Singular(format!(
            "LU solve of a {dim}x{dim} system produced non-finite values"
        )))
    }
}

/// $\mathbf{A}^{-1}$.
pub fn inverse(matrix: &Array2<Complex64>) -> Result<Array2<Complex64>, SolverError> {
    solve(matrix, &Array2::eye(matrix.nrows()))
}

/// Right division $\mathbf{B}\mathbf{A}^{-1}$, computed as
/// $(\mathbf{A}^T \backslash \mathbf{B}^T)^T$.
pub fn right_divide(
    lhs: &Array2<Complex64>,
    matrix: &Array2<Complex64>,
) -> Result<Array2<Complex64>, SolverError> {
    let at = matrix.t().to_owned();
    let bt = lhs.t().to_owned();
    Ok(solve(&at, &bt)?.reversed_axes())
}

/// Eigenvalues and right eigenvectors (as columns) of a general complex matrix.
pub fn eig(
    matrix: &Array2<Complex64>,
) -> Result<(Array1<Complex64>, Array2<Complex64>), SolverError> {
    let dim = matrix.nrows();
    assert_eq!(dim, matrix.ncols(), "Matrix must be square");

    let evd = to_faer(matrix).complex_eigendecomposition();
    let s = evd.s().column_vector();
    let values = Array1::from_shape_fn(dim, |i| {
        let c = s.read(i);
        Complex64::new(c.re, c.im)
    });
    let vectors = from_faer(evd.u());

    let finite = values.iter().all(|c| c.re.is_finite() && c.im.is_finite());
    if finite && all_finite(&vectors) {
        Ok((values, vectors))
    } else {
        Err(SolverError::Eigen(format!(
            "{dim}x{dim} eigendecomposition produced non-finite values"
        )))
    }
}
