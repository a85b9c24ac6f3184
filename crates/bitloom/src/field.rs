//! Declaration-side field descriptions used to register a [crate::schema::Schema].

use std::sync::Arc;

use crate::{
    codec::Codec,
    types::{CustomBase, Primitive},
    value::Value,
};

/// A single field as declared, before classification and layout.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Field name; accessors address the field by it.
    pub name: String,
    /// Declared type name, e.g. `u8`, `i16`, `bool`, or a custom type name.
    pub ty: String,
    /// Explicit width in bits. Primitive fields default to their natural width.
    pub bits: Option<u32>,
    /// Backing type and codec for nested/enum fields.
    pub custom: Option<CustomSpec>,
    /// Literal applied by defaulted construction.
    pub default: Option<Value>,
    /// Padding fields occupy bits but have no accessors.
    pub padding: bool,
}

/// Metadata a custom field needs because its width cannot be inferred.
#[derive(Debug, Clone)]
pub struct CustomSpec {
    /// Integer type the codec reads and writes.
    pub backing: Primitive,
    pub base: CustomBase,
    pub codec: Arc<dyn Codec>,
}

impl CustomSpec {
    pub fn nested(backing: Primitive, codec: Arc<dyn Codec>) -> Self {
        CustomSpec {
            backing,
            base: CustomBase::Nested,
            codec,
        }
    }

    pub fn enumeration(backing: Primitive, codec: Arc<dyn Codec>) -> Self {
        CustomSpec {
            backing,
            base: CustomBase::Enum,
            codec,
        }
    }
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        FieldSpec {
            name: name.into(),
            ty: ty.into(),
            bits: None,
            custom: None,
            default: None,
            padding: false,
        }
    }

    /// A reserved field of `ty` spanning `bits` bits.
    pub fn padding(name: impl Into<String>, ty: impl Into<String>, bits: u32) -> Self {
        FieldSpec {
            bits: Some(bits),
            padding: true,
            ..FieldSpec::new(name, ty)
        }
    }

    pub fn bits(mut self, bits: u32) -> Self {
        self.bits = Some(bits);
        self
    }

    pub fn custom(mut self, custom: CustomSpec) -> Self {
        self.custom = Some(custom);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}
