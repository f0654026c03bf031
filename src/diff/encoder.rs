use super::RenameMapping;
use crate::dex::{ClassDescriptor, TypeRef};
use std::collections::HashMap;

/// Which side of a pairwise diff a class sits on
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Side {
    Old,
    New,
}

/// Produces the fingerprint standing in for a class during diffing
///
/// The mapping passed in is the result of the previous diff pass; encoders
/// are expected to short-circuit classes (and type references) that it
/// already covers, so that confirmed matches trivially re-match on the next
/// pass instead of oscillating.
pub trait ClassEncoder {
    fn encode(&self, class: &ClassDescriptor, side: Side, mapping: &RenameMapping) -> String;
}

/// Package names longer than this look hand-written rather than obfuscated
const STABLE_NAME_LEN: usize = 3;

/// Marks a parent that is itself still unresolved and obfuscated
const UNRESOLVED_PARENT: char = '_';

/// Default encoder: rename-invariant structural signatures
///
/// Classes whose names pass the stability heuristic are fingerprinted by
/// their fullname verbatim; everything else is condensed into a signature
/// built only from structure (parent, access flags, package, method
/// prototypes and bytecode shape), with class-typed references abstracted
/// through a per-class alias table so that obfuscated names cancel out.
pub struct StructuralEncoder;

impl ClassEncoder for StructuralEncoder {
    fn encode(&self, class: &ClassDescriptor, side: Side, mapping: &RenameMapping) -> String {
        // An already-matched class re-matches on its resolved name alone
        match side {
            Side::Old => {
                if let Some(new_name) = mapping.get(&class.fullname) {
                    return new_name.to_owned();
                }
            }
            Side::New => {
                if mapping.get_reverse(&class.fullname).is_some() {
                    return class.fullname.clone();
                }
            }
        }

        self.encode_structure(class, side, mapping)
    }
}

impl StructuralEncoder {
    fn encode_structure(
        &self,
        class: &ClassDescriptor,
        side: Side,
        mapping: &RenameMapping,
    ) -> String {
        // Stable names are not abstracted: a long package name was written
        // by a human, and a single-character fullname survives obfuscators
        // as-is.
        if class.package_name.len() > STABLE_NAME_LEN || class.fullname.chars().count() == 1 {
            return class.fullname.clone();
        }

        let mut types = TypeTable::new(&class.fullname);
        let mut encoding = String::new();

        if let Some(parent) = &class.parent {
            let resolved = match side {
                Side::Old => mapping.get(parent),
                Side::New => mapping.get_reverse(parent).map(|_| parent.as_str()),
            };
            if let Some(resolved) = resolved {
                encoding.push_str(resolved);
            } else if package_of(parent).len() > STABLE_NAME_LEN {
                encoding.push_str(parent);
            } else {
                encoding.push(UNRESOLVED_PARENT);
            }
        }

        encoding.push('$');
        encoding.push_str(&class.access_flags.bits().to_string());
        encoding.push(',');
        encoding.push_str(&class.package_name);

        for method in &class.methods {
            encoding.push('|');

            // Short method names are indistinguishable from synthetic ones
            if method.name.len() > STABLE_NAME_LEN {
                encoding.push_str(&method.name);
                encoding.push('!');
            }

            for parameter in &method.parameter_types {
                encoding.push_str(&self.type_representation(parameter, side, mapping, &mut types));
                encoding.push(',');
            }
            encoding.push_str(&self.type_representation(
                &method.return_type,
                side,
                mapping,
                &mut types,
            ));
            encoding.push(',');

            encoding.push_str(&method.access_flags.bits().to_string());
            encoding.push(',');
            encoding.push_str(&method.bytecode.len().to_string());
            if let Some(first) = method.bytecode.first() {
                // Leading opcode, a cheap discriminator for equally-shaped bodies
                encoding.push(':');
                encoding.push_str(&first.to_string());
            }
        }

        encoding
    }

    fn type_representation(
        &self,
        type_ref: &TypeRef,
        side: Side,
        mapping: &RenameMapping,
        types: &mut TypeTable,
    ) -> String {
        let element = type_ref.underlying();

        if let TypeRef::ClassRef(fullname) = element {
            // A resolved reference substitutes the whole representation,
            // array marker included
            match side {
                Side::Old => {
                    if let Some(new_name) = mapping.get(fullname) {
                        return new_name.to_owned();
                    }
                }
                Side::New => {
                    if mapping.get_reverse(fullname).is_some() {
                        return fullname.clone();
                    }
                }
            }
        }

        let mut representation = String::new();
        if type_ref.is_array() {
            representation.push('[');
        }
        match element {
            TypeRef::Primitive(primitive) => representation.push_str(primitive.name()),
            TypeRef::ClassRef(fullname) => {
                representation.push_str(&types.alias(fullname).to_string())
            }
            TypeRef::Array(_) => unreachable!("underlying() never yields an array"),
        }
        representation
    }
}

/// Package part of a fullname like `com.example.Foo`
fn package_of(fullname: &str) -> &str {
    match fullname.rfind('.') {
        Some(dot) => &fullname[..dot],
        None => "",
    }
}

/// Per-class scratch table handing out small rename-invariant aliases
///
/// Seeded with the class's own fullname; every class reference first seen
/// gets the next index. Scoped to a single encode call, never shared.
struct TypeTable {
    positions: HashMap<String, usize>,
}

impl TypeTable {
    fn new(own_fullname: &str) -> TypeTable {
        let mut positions = HashMap::new();
        positions.insert(own_fullname.to_owned(), 0);
        TypeTable { positions }
    }

    fn alias(&mut self, fullname: &str) -> usize {
        if let Some(&position) = self.positions.get(fullname) {
            return position;
        }
        let position = self.positions.len();
        self.positions.insert(fullname.to_owned(), position);
        position
    }
}
