//! The structural diff core
//!
//! [`heckel`] matches two fingerprint sequences position by position,
//! [`StructuralEncoder`] condenses classes into rename-invariant
//! fingerprints, and [`ClassesDiffer`] drives the two through repeated
//! passes until the name mapping stops growing.

pub mod heckel;

mod differ;
mod encoder;
mod mapping;

pub use differ::*;
pub use encoder::*;
pub use mapping::*;
