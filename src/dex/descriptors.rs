use serde::{Deserialize, Serialize};

/// Primitive value types
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl PrimitiveType {
    /// Lowercase name, as it appears inside fingerprints
    ///
    /// Primitives are never obfuscated, so the literal name is stable input
    /// for the structural encoder.
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Char => "char",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Void => "void",
        }
    }
}

/// Type reference inside a method prototype
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TypeRef {
    Primitive(PrimitiveType),
    Array(Box<TypeRef>),
    /// Reference to another class in the same image, by fullname
    ClassRef(String),
}

impl TypeRef {
    pub fn class(fullname: impl Into<String>) -> TypeRef {
        TypeRef::ClassRef(fullname.into())
    }

    pub fn array(element: TypeRef) -> TypeRef {
        TypeRef::Array(Box::new(element))
    }

    /// Innermost element type, unwrapping any number of array dimensions
    pub fn underlying(&self) -> &TypeRef {
        match self {
            TypeRef::Array(element) => element.underlying(),
            other => other,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeRef::Array(_))
    }
}
