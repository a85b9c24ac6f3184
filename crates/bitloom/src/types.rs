//! Classification of declared field types.
//!
//! Classification is purely structural: a declared type name is looked up in
//! a fixed table of primitives with known natural widths. Anything outside
//! the table is a custom (nested or enum) type.

use crate::{bits::width_max, value::Value};

/// Primitive field and backing types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
}

impl Primitive {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(Primitive::Bool),
            "u8" => Some(Primitive::U8),
            "i8" => Some(Primitive::I8),
            "u16" => Some(Primitive::U16),
            "i16" => Some(Primitive::I16),
            "u32" => Some(Primitive::U32),
            "i32" => Some(Primitive::I32),
            "u64" => Some(Primitive::U64),
            "i64" => Some(Primitive::I64),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::U8 => "u8",
            Primitive::I8 => "i8",
            Primitive::U16 => "u16",
            Primitive::I16 => "i16",
            Primitive::U32 => "u32",
            Primitive::I32 => "i32",
            Primitive::U64 => "u64",
            Primitive::I64 => "i64",
        }
    }

    /// Natural width in bits.
    pub fn width(self) -> u32 {
        match self {
            Primitive::Bool => 1,
            Primitive::U8 | Primitive::I8 => 8,
            Primitive::U16 | Primitive::I16 => 16,
            Primitive::U32 | Primitive::I32 => 32,
            Primitive::U64 | Primitive::I64 => 64,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::I64
        )
    }

    /// Mask of the type's natural width.
    pub fn mask(self) -> u64 {
        width_max(self.width())
    }

    /// Whether a literal `value` is representable by this type.
    pub fn fits(self, value: &Value) -> bool {
        match (self, value) {
            (Primitive::Bool, Value::Bool(_)) => true,
            (Primitive::Bool, _) => false,
            (p, Value::Unsigned(v)) if p.is_signed() => *v <= width_max(p.width() - 1),
            (p, Value::Unsigned(v)) => *v <= p.mask(),
            (p, Value::Signed(v)) if p.is_signed() => {
                let min = -1i64 << (p.width() - 1);
                let max = (width_max(p.width() - 1)) as i64;
                (min..=max).contains(v)
            }
            (p, Value::Signed(v)) => *v >= 0 && (*v as u64) <= p.mask(),
            _ => false,
        }
    }
}

/// Whether a custom type is struct-like or enum-like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CustomBase {
    #[default]
    Nested,
    Enum,
}

/// Result of classifying a declared type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    Primitive(Primitive),
    /// Floating-point kinds, which are never packable.
    Unsupported,
    /// Not in the primitive table; needs explicit width and backing metadata.
    Custom,
}

const UNSUPPORTED: &[&str] = &["f16", "f32", "f64", "f128"];

/// Classifies a declared type name.
pub fn classify(ty: &str) -> TypeClass {
    if UNSUPPORTED.contains(&ty) {
        return TypeClass::Unsupported;
    }

    match Primitive::from_name(ty) {
        Some(primitive) => TypeClass::Primitive(primitive),
        None => TypeClass::Custom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("bool"), TypeClass::Primitive(Primitive::Bool));
        assert_eq!(classify("i16"), TypeClass::Primitive(Primitive::I16));
        assert_eq!(classify("f32"), TypeClass::Unsupported);
        assert_eq!(classify("f64"), TypeClass::Unsupported);
        assert_eq!(classify("Flags"), TypeClass::Custom);
    }

    #[test]
    fn test_natural_widths() {
        assert_eq!(Primitive::Bool.width(), 1);
        assert_eq!(Primitive::I8.width(), 8);
        assert_eq!(Primitive::U16.width(), 16);
        assert_eq!(Primitive::I32.width(), 32);
        assert_eq!(Primitive::U64.width(), 64);
    }

    #[test]
    fn test_fits_unsigned() {
        assert!(Primitive::U8.fits(&Value::Unsigned(0xFF)));
        assert!(!Primitive::U8.fits(&Value::Unsigned(0x100)));
        assert!(!Primitive::U8.fits(&Value::Signed(-1)));
        assert!(Primitive::U64.fits(&Value::Unsigned(u64::MAX)));
    }

    #[test]
    fn test_fits_signed() {
        assert!(Primitive::I8.fits(&Value::Signed(-128)));
        assert!(!Primitive::I8.fits(&Value::Signed(-129)));
        assert!(Primitive::I8.fits(&Value::Unsigned(0x7F)));
        assert!(!Primitive::I8.fits(&Value::Unsigned(0x80)));
        assert!(Primitive::I64.fits(&Value::Signed(i64::MIN)));
    }

    #[test]
    fn test_fits_bool() {
        assert!(Primitive::Bool.fits(&Value::Bool(false)));
        assert!(!Primitive::Bool.fits(&Value::Unsigned(1)));
    }
}
