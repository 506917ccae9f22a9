//! Unit-cell geometry and the inclusion shape.
//!
//! A [`CellGeometry`] describes one square lattice cell of pitch $a$ holding a
//! single circular inclusion of radius $r$, together with the raster
//! resolution used to sample it. The inclusion itself is a [`Disk`] expressed
//! in pixel coordinates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a cell description cannot be rasterised.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("Lattice pitch must be finite and positive, got {0}")]
    InvalidPitch(f64),

    #[error("Inclusion radius must be finite and non-negative, got {0}")]
    InvalidRadius(f64),

    #[error("Inclusion radius {radius} reaches the cell boundary (pitch {pitch}); need radius < pitch / 2")]
    InclusionTouchesBoundary { radius: f64, pitch: f64 },

    #[error("Raster grid must be non-empty and square, got {nx}x{ny}")]
    InvalidGrid { nx: usize, ny: usize },
}

/// One square unit cell with a centred cylindrical inclusion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellGeometry {
    /// Lattice pitch $a$ (units of $L_0$).
    pub lattice_pitch: f64,
    /// Inclusion radius (units of $L_0$).
    pub radius: f64,
    /// Raster resolution `[nx, ny]`.
    #[serde(default = "default_grid")]
    pub grid: [usize; 2],
}

fn default_grid() -> [usize; 2] {
    [512, 512]
}

impl Default for CellGeometry {
    /// The reference cell: $a = 0.499$, $r = 0.1$, 512x512 raster.
    ///
    /// The pitch is kept just below 0.5 so that no sweep wavelength lands on
    /// a grid-aligned Rayleigh condition.
    fn default() -> Self {
        Self {
            lattice_pitch: 0.5 - 1e-3,
            radius: 0.1,
            grid: default_grid(),
        }
    }
}

impl CellGeometry {
    /// Check that the cell can be rasterised.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if !(self.lattice_pitch.is_finite() && self.lattice_pitch > 0.0) {
            return Err(GeometryError::InvalidPitch(self.lattice_pitch));
        }
        if !(self.radius.is_finite() && self.radius >= 0.0) {
            return Err(GeometryError::InvalidRadius(self.radius));
        }
        if self.radius >= 0.5 * self.lattice_pitch {
            return Err(GeometryError::InclusionTouchesBoundary {
                radius: self.radius,
                pitch: self.lattice_pitch,
            });
        }
        let [nx, ny] = self.grid;
        if nx == 0 || ny == 0 || nx != ny {
            return Err(GeometryError::InvalidGrid { nx, ny });
        }
        Ok(())
    }

    /// Fraction of the cell area covered by the continuous inclusion.
    pub fn fill_fraction(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius / (self.lattice_pitch * self.lattice_pitch)
    }

    /// The inclusion in pixel coordinates.
    pub fn pixel_disk(&self) -> Disk {
        Disk::centred_in_grid(self.grid, self.lattice_pitch, self.radius)
    }
}

/// A disk in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disk {
    /// Centre `[i, j]` in pixel units.
    pub centre: [f64; 2],
    /// Radius in pixel units.
    pub radius: f64,
}

impl Disk {
    /// Disk centred on pixel `(nx/2, ny/2)` (integer division) with pixel
    /// radius `(radius / pitch) * nx`.
    pub fn centred_in_grid(grid: [usize; 2], lattice_pitch: f64, radius: f64) -> Self {
        let [nx, ny] = grid;
        Self {
            centre: [(nx / 2) as f64, (ny / 2) as f64],
            radius: (radius / lattice_pitch) * nx as f64,
        }
    }

    /// Strict containment: a pixel exactly on the rim is outside.
    pub fn contains(&self, i: usize, j: usize) -> bool {
        let di = i as f64 - self.centre[0];
        let dj = j as f64 - self.centre[1];
        (di * di + dj * dj).sqrt() < self.radius
    }

    /// Continuous area $\pi r^2$ in square pixels.
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }

    /// Half-open pixel index range `lo..hi` that can contain disk pixels
    /// along one axis. An unbounded radius spans the whole axis.
    pub(crate) fn span(&self, axis: usize, len: usize) -> std::ops::Range<usize> {
        if len == 0 || self.radius <= 0.0 {
            return 0..0;
        }
        let lo = (self.centre[axis] - self.radius).floor().max(0.0) as usize;
        let hi = ((self.centre[axis] + self.radius).ceil() as usize)
            .saturating_add(1)
            .min(len);
        lo.min(hi)..hi
    }
}
