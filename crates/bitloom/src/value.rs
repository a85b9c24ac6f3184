//! Runtime values read from and written to fields.

use crate::snapshot::Snapshot;

/// A field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Signed(i64),
    Unsigned(u64),
    /// A value decoded by a nested schema.
    Nested(Box<Snapshot>),
    /// A member of an enum codec.
    Enum(EnumMember),
}

/// A named enum member and its raw discriminant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumMember {
    pub name: String,
    pub discriminant: u64,
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Signed(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Unsigned(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_nested(&self) -> Option<&Snapshot> {
        match self {
            Value::Nested(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumMember> {
        match self {
            Value::Enum(v) => Some(v),
            _ => None,
        }
    }

    /// Raw two's-complement bits of an integer value.
    pub(crate) fn integer_bits(&self) -> Option<u64> {
        match self {
            Value::Signed(v) => Some(*v as u64),
            Value::Unsigned(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(value: $t) -> Self {
                Value::Unsigned(value as u64)
            }
        })*
    };
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(value: $t) -> Self {
                Value::Signed(value as i64)
            }
        })*
    };
}

impl_from_unsigned!(u8, u16, u32, u64);
impl_from_signed!(i8, i16, i32, i64);

impl From<Snapshot> for Value {
    fn from(value: Snapshot) -> Self {
        Value::Nested(Box::new(value))
    }
}

impl From<EnumMember> for Value {
    fn from(value: EnumMember) -> Self {
        Value::Enum(value)
    }
}
