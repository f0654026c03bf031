use bitflags::bitflags;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

bitflags! {
    /// Access flags on classes
    ///
    /// [0]: https://source.android.com/docs/core/runtime/dex-format#access-flags
    pub struct ClassAccessFlags: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
    }
}

bitflags! {
    /// Access flags on methods
    ///
    /// [0]: https://source.android.com/docs/core/runtime/dex-format#access-flags
    pub struct MethodAccessFlags: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const CONSTRUCTOR = 0x10000;
        const DECLARED_SYNCHRONIZED = 0x20000;
    }
}

/// Access flags travel through image artifacts as their raw bits
impl Serialize for ClassAccessFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for ClassAccessFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(ClassAccessFlags::from_bits_truncate(u32::deserialize(
            deserializer,
        )?))
    }
}

impl Serialize for MethodAccessFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for MethodAccessFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(MethodAccessFlags::from_bits_truncate(u32::deserialize(
            deserializer,
        )?))
    }
}
