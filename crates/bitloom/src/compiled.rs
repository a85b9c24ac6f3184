//! Resolved field descriptors and the per-field codec operations.
//!
//! A [CompiledField] knows its width, offset and kind, and derives from them
//! how a stored value is read back (`load`), written (`store`), contributed
//! to a packed container (`raw_bits`) and recovered from one (`slot_from_raw`).

use std::sync::Arc;

use crate::{
    bits::{self, field_mask, sign_extend},
    codec::Codec,
    types::{CustomBase, Primitive},
    value::Value,
};

/// What kind of data a field holds.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Bool,
    /// Signed or unsigned integer of the given declared type.
    Integer(Primitive),
    /// Nested or enum field interpreted by `codec` over `backing` bits.
    Custom {
        base: CustomBase,
        backing: Primitive,
        codec: Arc<dyn Codec>,
    },
}

/// Per-field storage inside a snapshot.
///
/// Integers keep their raw bits, already masked to the field width. Custom
/// fields keep the decoded value as set; it is masked only when packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot {
    Bool(bool),
    Bits(u64),
    Custom(Value),
}

/// A field with its resolved width and offset.
#[derive(Debug, Clone)]
pub struct CompiledField {
    pub(crate) name: String,
    pub(crate) ty: String,
    pub(crate) width: u32,
    pub(crate) offset: u32,
    pub(crate) kind: FieldKind,
    pub(crate) default: Option<Value>,
    pub(crate) padding: bool,
    pub(crate) container_width: u32,
    /// Low `width` bits, derived from the container width.
    pub(crate) mask: u64,
}

/// Where a field sits inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Placement {
    pub width: u32,
    pub offset: u32,
    pub container_width: u32,
}

impl CompiledField {
    pub(crate) fn new(name: String, ty: String, kind: FieldKind, placement: Placement) -> Self {
        CompiledField {
            name,
            ty,
            width: placement.width,
            offset: placement.offset,
            kind,
            default: None,
            padding: false,
            container_width: placement.container_width,
            mask: field_mask(placement.container_width, placement.width),
        }
    }

    pub(crate) fn with_default(mut self, default: Option<Value>) -> Self {
        self.default = default;
        self
    }

    pub(crate) fn with_padding(mut self, padding: bool) -> Self {
        self.padding = padding;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type name.
    pub fn ty(&self) -> &str {
        &self.ty
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_padding(&self) -> bool {
        self.padding
    }

    pub fn is_signed(&self) -> bool {
        matches!(self.kind, FieldKind::Integer(p) if p.is_signed())
    }

    /// Mask of this field's bits in position within the container.
    pub fn container_mask(&self) -> u64 {
        self.mask << self.offset
    }

    /// Human-readable description of the values `store` accepts.
    pub(crate) fn expected(&self) -> &'static str {
        match &self.kind {
            FieldKind::Bool => "a boolean",
            FieldKind::Integer(_) => "an integer",
            FieldKind::Custom {
                base: CustomBase::Nested,
                ..
            } => "a value accepted by its nested codec",
            FieldKind::Custom {
                base: CustomBase::Enum,
                ..
            } => "a member of its enum",
        }
    }

    /// Reads a stored slot back as a value.
    ///
    /// Unsigned integers are masked to the field width; signed integers are
    /// sign-extended from the field width to their declared type; custom
    /// values are re-encoded, cut to the field and backing widths, and
    /// decoded again.
    pub(crate) fn load(&self, slot: &Slot) -> Value {
        match (&self.kind, slot) {
            (FieldKind::Bool, Slot::Bool(v)) => Value::Bool(*v),
            (FieldKind::Integer(p), Slot::Bits(raw)) if p.is_signed() => {
                Value::Signed(sign_extend(*raw, self.width, p.width()))
            }
            (FieldKind::Integer(_), Slot::Bits(raw)) => Value::Unsigned(raw & self.mask),
            (FieldKind::Custom { backing, codec, .. }, Slot::Custom(value)) => {
                codec.decode(codec.encode(value) & self.mask & backing.mask())
            }
            (_, slot) => self.load(&self.coerce(slot)),
        }
    }

    /// Converts a value into a slot, or `None` if the value has the wrong kind.
    ///
    /// Integers are masked to the field width here; custom values are stored
    /// as given.
    pub(crate) fn store(&self, value: &Value) -> Option<Slot> {
        match &self.kind {
            FieldKind::Bool => value.as_bool().map(Slot::Bool),
            FieldKind::Integer(_) => value.integer_bits().map(|raw| Slot::Bits(raw & self.mask)),
            FieldKind::Custom { codec, .. } => {
                codec.accepts(value).then(|| Slot::Custom(value.clone()))
            }
        }
    }

    /// Bits this field contributes to a packed container, unshifted.
    pub(crate) fn raw_bits(&self, slot: &Slot) -> u64 {
        let raw = match (&self.kind, slot) {
            (FieldKind::Bool, Slot::Bool(v)) => *v as u64,
            (FieldKind::Integer(_), Slot::Bits(raw)) => *raw,
            (FieldKind::Custom { codec, .. }, Slot::Custom(value)) => codec.encode(value),
            (_, slot) => return self.raw_bits(&self.coerce(slot)),
        };

        raw & self.mask
    }

    /// Recovers a slot from this field's bits within a packed container.
    pub(crate) fn slot_from_raw(&self, container: u64) -> Slot {
        let slice = bits::extract(container, self.container_width, self.offset, self.width);

        match &self.kind {
            FieldKind::Bool => Slot::Bool(slice != 0),
            FieldKind::Integer(_) => Slot::Bits(slice),
            FieldKind::Custom { backing, codec, .. } => {
                Slot::Custom(codec.decode(slice & backing.mask()))
            }
        }
    }

    /// Slot holding zero, `false`, or the codec's decoding of 0.
    pub(crate) fn zero_slot(&self) -> Slot {
        match &self.kind {
            FieldKind::Bool => Slot::Bool(false),
            FieldKind::Integer(_) => Slot::Bits(0),
            FieldKind::Custom { codec, .. } => Slot::Custom(codec.decode(0)),
        }
    }

    /// Slot holding the declared default, or the zero slot without one.
    pub(crate) fn default_slot(&self) -> Slot {
        self.default
            .as_ref()
            .and_then(|value| self.store(value))
            .unwrap_or_else(|| self.zero_slot())
    }

    /// Rebuilds a slot of the wrong shape for this field from its raw bits.
    fn coerce(&self, slot: &Slot) -> Slot {
        let raw = match slot {
            Slot::Bool(v) => *v as u64,
            Slot::Bits(raw) => *raw,
            Slot::Custom(value) => value.integer_bits().unwrap_or(0),
        };
        self.slot_from_raw((raw & self.mask) << self.offset)
    }
}
