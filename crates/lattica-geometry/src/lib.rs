//! # Lattica Geometry
//!
//! Geometry handling for the Lattica framework:
//!
//! - **Cell description** ([`primitives`]) - square lattice cell with a single
//!   centred cylindrical inclusion, plus validation.
//! - **Discretisation** ([`discretise`]) - rasterises the cell into a complex
//!   permittivity map at a given resolution.

pub mod discretise;
pub mod primitives;

pub use discretise::{rasterize, rasterize_cell, PermittivityMap};
pub use primitives::{CellGeometry, Disk, GeometryError};
