use super::{heckel, ClassEncoder, RenameMapping, Side, StructuralEncoder};
use crate::dex::ClassDescriptor;

/// Decides which classes take part in a diff
pub trait ClassFilter {
    fn includes(&self, class: &ClassDescriptor) -> bool;
}

/// Keeps every class
pub struct AcceptAll;

impl ClassFilter for AcceptAll {
    fn includes(&self, _class: &ClassDescriptor) -> bool {
        true
    }
}

/// Default number of encode-and-match passes
pub const DEFAULT_PASSES: usize = 5;

/// Fixed-point driver matching two class lists by structural fingerprints
///
/// A single diff pass under-matches: many signatures depend on *other*
/// classes' names being resolved first (the parent, parameter and return
/// types). Feeding each pass's mapping back into the encoder as
/// short-circuit substitutions lets confirmed matches propagate through the
/// class graph, so the driver loops until the mapping stops growing or the
/// pass limit is reached. Each pass's mapping supersedes the previous one,
/// it is never merged into it.
pub struct ClassesDiffer<F = AcceptAll, E = StructuralEncoder> {
    passes: usize,
    filter: F,
    encoder: E,
}

impl ClassesDiffer {
    pub fn new() -> ClassesDiffer {
        ClassesDiffer::with(DEFAULT_PASSES, AcceptAll, StructuralEncoder)
    }

    pub fn with_passes(passes: usize) -> ClassesDiffer {
        ClassesDiffer::with(passes, AcceptAll, StructuralEncoder)
    }
}

impl Default for ClassesDiffer {
    fn default() -> ClassesDiffer {
        ClassesDiffer::new()
    }
}

impl<F: ClassFilter, E: ClassEncoder> ClassesDiffer<F, E> {
    pub fn with(passes: usize, filter: F, encoder: E) -> ClassesDiffer<F, E> {
        ClassesDiffer {
            passes,
            filter,
            encoder,
        }
    }

    /// Match `old_classes` against `new_classes`, returning the name mapping
    ///
    /// The caller's order is canonical: descriptor `index` is only unique
    /// within one image, so lists spanning several images must arrive with
    /// each image's classes sorted by `index` and the images concatenated in
    /// order (the image loader produces exactly that). The returned mapping
    /// is the final pass's result; hitting the pass limit without reaching a
    /// fixed point is not an error, the best mapping found is returned.
    pub fn diff(&self, old_classes: &[ClassDescriptor], new_classes: &[ClassDescriptor]) -> RenameMapping {
        let old: Vec<&ClassDescriptor> = old_classes
            .iter()
            .filter(|cls| self.filter.includes(cls))
            .collect();
        let new: Vec<&ClassDescriptor> = new_classes
            .iter()
            .filter(|cls| self.filter.includes(cls))
            .collect();

        log::info!("filtered classes: {} -> {}", old.len(), new.len());

        let mut mapping = RenameMapping::new();
        let mut successful_mappings = 0;

        for pass in 1..=self.passes {
            let old_encoding: Vec<String> = old
                .iter()
                .map(|cls| self.encoder.encode(cls, Side::Old, &mapping))
                .collect();
            let new_encoding: Vec<String> = new
                .iter()
                .map(|cls| self.encoder.encode(cls, Side::New, &mapping))
                .collect();

            let (positions, _) = heckel::diff(&old_encoding, &new_encoding);

            let mut next = RenameMapping::new();
            for (old_line, new_line) in positions {
                next.insert(old[old_line].fullname.clone(), new[new_line].fullname.clone());
            }
            mapping = next;

            log::info!("pass #{} resulted in {} mappings", pass, mapping.len());

            if mapping.len() == successful_mappings {
                log::info!("breaking early since no progress is being made");
                break;
            }
            successful_mappings = mapping.len();
        }

        mapping
    }
}
