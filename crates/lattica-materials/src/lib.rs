//! # Lattica Materials
//!
//! Permittivity models for the Lattica framework. All materials implement the
//! [`MaterialProvider`](provider::MaterialProvider) trait, which returns a
//! complex relative permittivity at an SI angular frequency.
//!
//! | Model | Module | Dispersive |
//! |-------|--------|------------|
//! | Drude free-electron metal | [`drude`] | yes |
//! | Fixed dielectric | [`constant`] | no |
//!
//! The [`units`] module holds the length-normalised vacuum constants used to
//! turn a wavelength (in units of the geometry) into an SI angular frequency.

pub mod constant;
pub mod drude;
pub mod provider;
pub mod units;

pub use constant::ConstantMaterial;
pub use drude::{drude_permittivity, DispersionParameters, DrudeMaterial};
pub use provider::{MaterialError, MaterialProvider};
pub use units::PhysicalConstants;
