use super::{ClassAccessFlags, MethodAccessFlags, TypeRef};
use serde::{Deserialize, Serialize};

/// Class parsed out of a bytecode image
///
/// Descriptors are read-only inputs to the diff core: they are produced by
/// whatever parsed the image and never mutated afterwards. `index` is the
/// class's position inside its image and defines the canonical iteration
/// order for diffing; `fullname` is unique within an image.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ClassDescriptor {
    /// Position of the class within its image
    pub index: usize,

    /// Fully qualified name, eg. `com.example.Foo` or an obfuscated `a.b`
    pub fullname: String,

    /// Package part of the fullname (may be empty)
    pub package_name: String,

    /// Fullname of the superclass, if the class has one in the same image
    #[serde(default)]
    pub parent: Option<String>,

    pub access_flags: ClassAccessFlags,

    /// Methods in declaration order
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
}

impl ClassDescriptor {
    pub fn new(
        index: usize,
        fullname: impl Into<String>,
        package_name: impl Into<String>,
        access_flags: ClassAccessFlags,
    ) -> ClassDescriptor {
        ClassDescriptor {
            index,
            fullname: fullname.into(),
            package_name: package_name.into(),
            parent: None,
            access_flags,
            methods: vec![],
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> ClassDescriptor {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_method(mut self, method: MethodDescriptor) -> ClassDescriptor {
        self.methods.push(method);
        self
    }
}

/// Method declared by a class
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,

    /// Parameter types, in order
    #[serde(default)]
    pub parameter_types: Vec<TypeRef>,

    pub return_type: TypeRef,

    pub access_flags: MethodAccessFlags,

    /// Raw instruction bytes (empty for abstract and native methods)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bytecode: Vec<u8>,
}

impl MethodDescriptor {
    pub fn new(
        name: impl Into<String>,
        parameter_types: Vec<TypeRef>,
        return_type: TypeRef,
        access_flags: MethodAccessFlags,
    ) -> MethodDescriptor {
        MethodDescriptor {
            name: name.into(),
            parameter_types,
            return_type,
            access_flags,
            bytecode: vec![],
        }
    }

    pub fn with_bytecode(mut self, bytecode: Vec<u8>) -> MethodDescriptor {
        self.bytecode = bytecode;
        self
    }
}
