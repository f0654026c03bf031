//! Read-only data model for classes parsed out of a bytecode image
//!
//! Actual DEX/APK parsing lives outside this crate; versions are stored as
//! a neutral serialized form (see [`Image`] and [`JsonImageLoader`]) that a
//! real parser would produce.

mod access_flags;
mod class;
mod descriptors;
mod image;

pub use access_flags::*;
pub use class::*;
pub use descriptors::*;
pub use image::*;
