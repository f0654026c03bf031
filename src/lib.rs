//! Recover class-rename mappings across releases of an obfuscated app
//!
//! Obfuscators re-letter class names on every release, so "what did class
//! `a/b/c` become in 2.1.0" cannot be answered from names alone. This crate
//! answers it structurally: every class is condensed into a rename-invariant
//! fingerprint, the two fingerprint sequences are matched with an adapted
//! Heckel line diff, and confirmed matches are fed back into the fingerprint
//! encoder until the mapping stops growing. Pairwise mappings are persisted
//! in a [`timeline::Timeline`] and composed on demand to answer queries
//! across non-adjacent versions.
//!
//! ### Example
//!
//! ```
//! use dextrace::dex::{ClassAccessFlags, ClassDescriptor};
//! use dextrace::diff::ClassesDiffer;
//!
//! let old = vec![ClassDescriptor::new(0, "a", "", ClassAccessFlags::PUBLIC)];
//! let new = vec![ClassDescriptor::new(0, "a", "", ClassAccessFlags::PUBLIC)];
//!
//! let mapping = ClassesDiffer::new().diff(&old, &new);
//! assert_eq!(mapping.get("a"), Some("a"));
//! ```

pub mod dex;
pub mod diff;
mod errors;
pub mod timeline;

pub use errors::Error;
