//! Fourier-space convolution matrices.
//!
//! A periodic permittivity $\epsilon(x, y)$ couples plane-wave harmonics
//! through its Fourier coefficients. In the truncated basis the coupling is the
//! Toeplitz-block-Toeplitz matrix
//!
//! $$C_{(p,q),(p',q')} = \hat\epsilon_{p - p',\, q - q'}$$
//!
//! where $\hat\epsilon$ are the 2D DFT coefficients of the raster, normalised by
//! the number of pixels.

use ndarray::{Array2, Axis};
use num_complex::Complex64;
use rustfft::FftPlanner;

use lattica_geometry::PermittivityMap;

use crate::harmonics::Harmonics;

/// Builds the truncated convolution operator of a permittivity raster.
pub trait ConvolutionBuilder {
    /// Return the `(2N+1)(2M+1)` square convolution matrix of `map`.
    fn build(&self, map: &PermittivityMap, order_x: usize, order_y: usize) -> Array2<Complex64>;
}

/// Convolution builder backed by a 2D FFT of the full raster.
#[derive(Debug, Clone, Copy, Default)]
pub struct FftConvolution;

impl FftConvolution {
    /// Normalised 2D DFT coefficients of `map`, unshifted (DC at `[0, 0]`).
    pub fn fourier_coefficients(map: &PermittivityMap) -> Array2<Complex64> {
        let (nx, ny) = map.shape();
        let mut data = map.values().clone();
        let mut planner = FftPlanner::<f64>::new();

        for (axis, len) in [(Axis(1), ny), (Axis(0), nx)] {
            let fft = planner.plan_fft_forward(len);
            let mut buf = vec![Complex64::default(); len];
            for mut lane in data.lanes_mut(axis) {
                for (dst, src) in buf.iter_mut().zip(lane.iter()) {
                    *dst = *src;
                }
                fft.process(&mut buf);
                for (dst, src) in lane.iter_mut().zip(buf.iter()) {
                    *dst = *src;
                }
            }
        }

        let scale = 1.0 / (nx * ny) as f64;
        data.mapv_inplace(|c| c * scale);
        data
    }
}

impl ConvolutionBuilder for FftConvolution {
    fn build(&self, map: &PermittivityMap, order_x: usize, order_y: usize) -> Array2<Complex64> {
        let (nx, ny) = map.shape();
        assert!(
            4 * order_x < nx && 4 * order_y < ny,
            "raster {nx}x{ny} too coarse for orders ({order_x}, {order_y})"
        );

        let coeffs = Self::fourier_coefficients(map);
        let harmonics = Harmonics::new(order_x, order_y);
        let dim = harmonics.len();
        let mut conv = Array2::<Complex64>::zeros((dim, dim));

        for (row, (pr, qr)) in harmonics.iter().enumerate() {
            for (col, (pc, qc)) in harmonics.iter().enumerate() {
                // negative frequencies wrap to the top of the spectrum
                let i = (pr - pc).rem_euclid(nx as isize) as usize;
                let j = (qr - qc).rem_euclid(ny as isize) as usize;
                conv[[row, col]] = coeffs[[i, j]];
            }
        }

        conv
    }
}
