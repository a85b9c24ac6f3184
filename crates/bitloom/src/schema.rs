//! Schema registration and the container-level codec operations.
//!
//! [Schema::register] validates an ordered list of [FieldSpec]s against a
//! [Container], resolves every field's width and offset, and returns an
//! immutable, cheaply cloned handle. All runtime operations
//! (construction, unpacking, packing, builders) hang off that handle and
//! never fail for reasons of bit arithmetic.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};

use log::{debug, warn};

use crate::{
    builder::Builder,
    codec::Codec,
    compiled::{CompiledField, FieldKind, Placement, Slot},
    container::Container,
    defaults::{self, Init},
    errors::{AccessError, SchemaError, SchemaErrorKind},
    field::FieldSpec,
    layout,
    snapshot::Snapshot,
    types::{self, Primitive, TypeClass},
    value::Value,
};

/// A registered container layout.
///
/// Cloning is cheap and clones compare equal; two separately registered
/// schemas never do, even with identical declarations.
#[derive(Clone)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

#[derive(Debug)]
struct SchemaInner {
    container: Container,
    /// Every field in declaration order, padding included.
    fields: Vec<CompiledField>,
    index: HashMap<String, usize>,
    /// Bits owned by padding fields, and the literal frozen into them.
    padding_mask: u64,
    padding_bits: u64,
}

impl Schema {
    /// Validates `specs` against `container` and resolves the layout.
    ///
    /// Fields are checked one at a time in declaration order; width
    /// conservation is checked last, over the whole container. The first
    /// failure aborts registration.
    pub fn register(
        container: Container,
        specs: impl IntoIterator<Item = FieldSpec>,
    ) -> Result<Schema, SchemaError> {
        let container_width = container.width();
        let mut names = HashSet::new();
        let mut resolved = Vec::new();

        for spec in specs {
            let (width, kind) = resolve_field(&container, &spec)?;

            if !spec.padding && !names.insert(spec.name.clone()) {
                return Err(SchemaError::field(
                    &container.name,
                    &spec.name,
                    SchemaErrorKind::DuplicateField,
                ));
            }

            resolved.push((spec, width, kind));
        }

        let offsets = layout::resolve(
            &container,
            resolved
                .iter()
                .map(|(spec, width, _)| (spec.name.as_str(), *width)),
        )?;

        let fields: Vec<CompiledField> = resolved
            .into_iter()
            .zip(offsets)
            .map(|((spec, width, kind), offset)| {
                CompiledField::new(
                    spec.name,
                    spec.ty,
                    kind,
                    Placement {
                        width,
                        offset,
                        container_width,
                    },
                )
                .with_default(spec.default)
                .with_padding(spec.padding)
            })
            .collect();

        let index = fields
            .iter()
            .enumerate()
            .filter(|(_, field)| !field.is_padding())
            .map(|(i, field)| (field.name.clone(), i))
            .collect();

        let mut padding_mask = 0;
        let mut padding_bits = 0;
        for field in fields.iter().filter(|field| field.is_padding()) {
            padding_mask |= field.container_mask();
            padding_bits |= field.raw_bits(&field.default_slot()) << field.offset;
        }

        debug!(
            "registered {}: {} bit(s), {:?}, {} field(s)",
            container.name,
            container_width,
            container.order,
            fields.len()
        );

        Ok(Schema {
            inner: Arc::new(SchemaInner {
                container,
                fields,
                index,
                padding_mask,
                padding_bits,
            }),
        })
    }

    pub fn container(&self) -> &Container {
        &self.inner.container
    }

    pub fn name(&self) -> &str {
        &self.inner.container.name
    }

    /// Container width in bits.
    pub fn width(&self) -> u32 {
        self.inner.container.width()
    }

    /// All fields in declaration order, padding included.
    pub fn fields(&self) -> &[CompiledField] {
        &self.inner.fields
    }

    /// Looks up an accessible field by name.
    pub fn field(&self, name: &str) -> Option<&CompiledField> {
        self.inner.index.get(name).map(|&i| &self.inner.fields[i])
    }

    /// `(name, width, offset)` of every accessible field, in declaration order.
    pub fn layout(&self) -> impl Iterator<Item = (&str, u32, u32)> + '_ {
        self.inner
            .fields
            .iter()
            .filter(|field| !field.is_padding())
            .map(|field| (field.name(), field.width(), field.offset()))
    }

    /// Bits occupied by padding fields.
    pub fn padding_mask(&self) -> u64 {
        self.inner.padding_mask
    }

    /// Padding literals in position; every packed value carries these bits.
    pub fn padding_bits(&self) -> u64 {
        self.inner.padding_bits
    }

    /// Every field 0, `false`, or its codec's decoding of 0.
    pub fn zeroed(&self) -> Snapshot {
        self.construct(Init::Zeroed)
    }

    /// Declared defaults applied; other fields zeroed.
    pub fn defaulted(&self) -> Snapshot {
        self.construct(Init::Defaulted)
    }

    /// Decodes every accessible field from `raw`. Bits above the container
    /// width are ignored.
    pub fn unpack(&self, raw: u64) -> Snapshot {
        let raw = raw & self.inner.container.storage.max();
        let slots = self
            .inner
            .fields
            .iter()
            .map(|field| {
                if field.is_padding() {
                    field.default_slot()
                } else {
                    field.slot_from_raw(raw)
                }
            })
            .collect();

        Snapshot::new(self.clone(), slots)
    }

    /// [Schema::unpack], then every field with a declared default is
    /// overwritten by it.
    pub fn unpack_with_defaults(&self, raw: u64) -> Snapshot {
        let mut snapshot = self.unpack(raw);
        defaults::apply_defaults(&self.inner.fields, snapshot.slots_mut());
        snapshot
    }

    /// Builder seeded with [Schema::defaulted].
    pub fn builder(&self) -> Builder {
        Builder::new(self.defaulted())
    }

    /// Builder seeded with [Schema::unpack]; no defaults are applied.
    pub fn builder_from_raw(&self, raw: u64) -> Builder {
        Builder::new(self.unpack(raw))
    }

    /// Builder seeded with [Schema::zeroed].
    pub fn builder_zeroed(&self) -> Builder {
        Builder::new(self.zeroed())
    }

    pub(crate) fn lookup(&self, name: &str) -> Result<(usize, &CompiledField), AccessError> {
        match self.inner.index.get(name) {
            Some(&i) => Ok((i, &self.inner.fields[i])),
            None if self.inner.fields.iter().any(|f| f.is_padding() && f.name() == name) => {
                Err(AccessError::PaddingField(name.to_string()))
            }
            None => Err(AccessError::UnknownField(name.to_string())),
        }
    }

    pub(crate) fn pack_slots(&self, slots: &[Slot]) -> u64 {
        self.inner
            .fields
            .iter()
            .zip(slots)
            .fold(0, |acc, (field, slot)| {
                acc | (field.raw_bits(slot) << field.offset)
            })
    }

    fn construct(&self, init: Init) -> Snapshot {
        Snapshot::new(self.clone(), defaults::initial_slots(&self.inner.fields, init))
    }
}

/// Resolves a field's width and kind, running the per-field checks in order.
fn resolve_field(
    container: &Container,
    spec: &FieldSpec,
) -> Result<(u32, FieldKind), SchemaError> {
    let fail = |kind| SchemaError::field(&container.name, &spec.name, kind);

    if spec.name.is_empty() {
        return Err(fail(SchemaErrorKind::InvalidFieldName));
    }

    let (width, max, kind) = match types::classify(&spec.ty) {
        TypeClass::Unsupported => {
            return Err(fail(SchemaErrorKind::UnsupportedFieldType {
                ty: spec.ty.clone(),
            }));
        }
        TypeClass::Custom => match (spec.bits, &spec.custom) {
            (Some(bits), Some(custom)) => (
                bits,
                custom.backing.width(),
                FieldKind::Custom {
                    base: custom.base,
                    backing: custom.backing,
                    codec: custom.codec.clone(),
                },
            ),
            _ => {
                return Err(fail(SchemaErrorKind::CustomTypeMissingMetadata {
                    ty: spec.ty.clone(),
                }));
            }
        },
        TypeClass::Primitive(primitive) => {
            if spec.custom.is_some() {
                warn!(
                    "{}.{}: custom metadata ignored on primitive type `{}`",
                    container.name, spec.name, spec.ty
                );
            }
            let kind = match primitive {
                Primitive::Bool => FieldKind::Bool,
                other => FieldKind::Integer(other),
            };
            (
                spec.bits.unwrap_or(primitive.width()),
                primitive.width(),
                kind,
            )
        }
    };

    if width > max {
        return Err(fail(SchemaErrorKind::FieldWidthTooLarge { width, max }));
    }

    if width == 0 {
        return Err(fail(SchemaErrorKind::FieldWidthNonPositive));
    }

    if let FieldKind::Custom { codec, .. } = &kind {
        let required = codec.required_width();
        if required > width {
            return Err(fail(SchemaErrorKind::InvalidEnum {
                reason: format!(
                    "largest discriminant needs {required} bit(s), the field has {width}"
                ),
            }));
        }
    }

    if let Some(default) = &spec.default {
        check_default(&kind, default).map_err(|reason| {
            fail(SchemaErrorKind::InvalidDefault { reason })
        })?;
    }

    Ok((width, kind))
}

fn check_default(kind: &FieldKind, default: &Value) -> Result<(), String> {
    let accepted = match kind {
        FieldKind::Bool => Primitive::Bool.fits(default),
        FieldKind::Integer(primitive) => primitive.fits(default),
        FieldKind::Custom { codec, .. } => codec.accepts(default),
    };

    if !accepted {
        return Err(format!("{default:?} is out of range"));
    }

    Ok(())
}

/// A schema decodes and encodes nested snapshots of itself.
impl Codec for Schema {
    fn decode(&self, raw: u64) -> Value {
        Value::Nested(Box::new(self.unpack(raw)))
    }

    fn encode(&self, value: &Value) -> u64 {
        match value {
            Value::Nested(snapshot) if snapshot.schema() == self => snapshot.pack(),
            _ => 0,
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        matches!(value, Value::Nested(snapshot) if snapshot.schema() == self)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Schema {}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("container", &self.inner.container)
            .field("fields", &self.inner.fields.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        codec::EnumCodec,
        container::{BitOrder, StorageWidth},
        field::CustomSpec,
    };

    use super::*;

    fn bytes(order: BitOrder) -> Schema {
        Schema::register(
            Container::new("Bytes", StorageWidth::U32).with_order(order),
            vec![
                FieldSpec::new("a", "u8"),
                FieldSpec::new("b", "u8"),
                FieldSpec::new("c", "u8"),
                FieldSpec::new("d", "u8"),
            ],
        )
        .unwrap()
    }

    fn bytes_with_defaults(order: BitOrder) -> Schema {
        Schema::register(
            Container::new("Defaults", StorageWidth::U32).with_order(order),
            vec![
                FieldSpec::new("a", "u8").default_value(0x12u8),
                FieldSpec::new("b", "u8").default_value(0x34u8),
                FieldSpec::new("c", "u8").default_value(0x56u8),
                FieldSpec::new("d", "u8").default_value(0x78u8),
            ],
        )
        .unwrap()
    }

    fn register_err(storage: StorageWidth, specs: Vec<FieldSpec>) -> SchemaError {
        Schema::register(Container::new("Broken", storage), specs).unwrap_err()
    }

    #[test]
    fn test_lsb_unpack() {
        let schema = bytes(BitOrder::LsbFirst);
        let snapshot = schema.unpack(0x7856_3412);

        assert_eq!(snapshot.get("a").unwrap(), Value::Unsigned(0x12));
        assert_eq!(snapshot.get("b").unwrap(), Value::Unsigned(0x34));
        assert_eq!(snapshot.get("c").unwrap(), Value::Unsigned(0x56));
        assert_eq!(snapshot.get("d").unwrap(), Value::Unsigned(0x78));
        assert_eq!(snapshot.pack(), 0x7856_3412);
    }

    #[test]
    fn test_msb_pack() {
        let schema = bytes(BitOrder::MsbFirst);
        let mut snapshot = schema.zeroed();
        snapshot.set("a", 0x12u8).unwrap();
        snapshot.set("b", 0x34u8).unwrap();
        snapshot.set("c", 0x56u8).unwrap();
        snapshot.set("d", 0x78u8).unwrap();
        assert_eq!(snapshot.pack(), 0x1234_5678);

        let unpacked = schema.unpack(0x1234_5678);
        assert_eq!(unpacked, snapshot);
    }

    #[test]
    fn test_layout_offsets() {
        let lsb: Vec<_> = bytes(BitOrder::LsbFirst).layout().map(|(_, _, o)| o).collect();
        assert_eq!(lsb, vec![0, 8, 16, 24]);

        let msb = bytes(BitOrder::MsbFirst);
        let layout: Vec<_> = msb.layout().collect();
        assert_eq!(
            layout,
            vec![("a", 8, 24), ("b", 8, 16), ("c", 8, 8), ("d", 8, 0)]
        );
        assert_eq!(msb.field("d").unwrap().offset(), 0);
    }

    #[test]
    fn test_zeroed_and_defaulted() {
        let schema = bytes_with_defaults(BitOrder::LsbFirst);
        assert_eq!(schema.zeroed().pack(), 0);
        assert_eq!(schema.defaulted().pack(), 0x7856_3412);

        let msb = bytes_with_defaults(BitOrder::MsbFirst);
        assert_eq!(msb.zeroed().pack(), 0);
        assert_eq!(msb.defaulted().pack(), 0x1234_5678);
    }

    #[test]
    fn test_unpack_with_defaults_overrides() {
        let schema = Schema::register(
            Container::new("Partial", StorageWidth::U32),
            vec![
                FieldSpec::new("a", "u8").default_value(0x12u8),
                FieldSpec::new("b", "u8"),
                FieldSpec::new("c", "u8").default_value(0x56u8),
                FieldSpec::new("d", "u8"),
            ],
        )
        .unwrap();

        assert_eq!(schema.unpack(0xFFFF_FFFF).pack(), 0xFFFF_FFFF);
        assert_eq!(schema.unpack_with_defaults(0xFFFF_FFFF).pack(), 0xFF56_FF12);
    }

    #[test]
    fn test_signed_fields() {
        let schema = Schema::register(
            Container::new("Signed", StorageWidth::U16),
            vec![
                FieldSpec::new("n", "i8").bits(4),
                FieldSpec::new("m", "i16").bits(12),
            ],
        )
        .unwrap();

        let snapshot = schema.unpack(0x001F);
        assert_eq!(snapshot.get("n").unwrap(), Value::Signed(-1));
        assert_eq!(snapshot.get("m").unwrap(), Value::Signed(1));

        let mut snapshot = schema.zeroed();
        snapshot.set("n", -8i8).unwrap();
        snapshot.set("m", -1i16).unwrap();
        assert_eq!(snapshot.pack(), 0xFFF8);
        assert_eq!(schema.unpack(0xFFF8).get("n").unwrap(), Value::Signed(-8));
    }

    #[test]
    fn test_unsigned_set_masks() {
        let schema = Schema::register(
            Container::new("Nibbles", StorageWidth::U8),
            vec![FieldSpec::new("lo", "u8").bits(4), FieldSpec::new("hi", "u8").bits(4)],
        )
        .unwrap();

        let mut snapshot = schema.zeroed();
        snapshot.set("lo", 0xABu8).unwrap();
        assert_eq!(snapshot.get("lo").unwrap(), Value::Unsigned(0xB));
        assert_eq!(snapshot.pack(), 0x0B);
    }

    #[test]
    fn test_full_width_u64() {
        let schema = Schema::register(
            Container::new("Wide", StorageWidth::U64),
            vec![FieldSpec::new("all", "u64")],
        )
        .unwrap();

        assert_eq!(schema.unpack(u64::MAX).pack(), u64::MAX);
        assert_eq!(
            schema.unpack(u64::MAX).get("all").unwrap(),
            Value::Unsigned(u64::MAX)
        );
    }

    #[test]
    fn test_unpack_ignores_bits_above_container() {
        let schema = bytes(BitOrder::LsbFirst);
        assert_eq!(schema.unpack(0xAA_7856_3412).pack(), 0x7856_3412);
    }

    #[test]
    fn test_bool_fields() {
        let schema = Schema::register(
            Container::new("Flags", StorageWidth::U8),
            vec![
                FieldSpec::new("ready", "bool"),
                FieldSpec::new("error", "bool").default_value(true),
                FieldSpec::new("count", "u8").bits(6),
            ],
        )
        .unwrap();

        let snapshot = schema.unpack(0b0000_0101);
        assert_eq!(snapshot.get("ready").unwrap(), Value::Bool(true));
        assert_eq!(snapshot.get("error").unwrap(), Value::Bool(false));
        assert_eq!(snapshot.get("count").unwrap(), Value::Unsigned(1));
        assert_eq!(schema.defaulted().pack(), 0b10);
    }

    #[test]
    fn test_nested_field() {
        let inner = Schema::register(
            Container::new("Inner", StorageWidth::U8),
            vec![FieldSpec::new("x", "u8").default_value(33u8)],
        )
        .unwrap();

        let outer = Schema::register(
            Container::new("Outer", StorageWidth::U32),
            vec![
                FieldSpec::new("head", "u8"),
                FieldSpec::new("inner", "Inner")
                    .bits(8)
                    .custom(CustomSpec::nested(Primitive::U8, Arc::new(inner.clone())))
                    .default_value(inner.defaulted()),
                FieldSpec::new("tail", "u16"),
            ],
        )
        .unwrap();

        assert_eq!(outer.defaulted().pack(), 33 << 8);
        assert_eq!(outer.zeroed().pack(), 0);

        let snapshot = outer.unpack(0x0000_2A00);
        let nested = snapshot.get("inner").unwrap();
        assert_eq!(
            nested.as_nested().unwrap().get("x").unwrap(),
            Value::Unsigned(0x2A)
        );

        let mut value = inner.zeroed();
        value.set("x", 7u8).unwrap();
        let mut snapshot = outer.zeroed();
        snapshot.set("inner", value).unwrap();
        assert_eq!(snapshot.pack(), 7 << 8);
    }

    #[test]
    fn test_nested_rejects_foreign_snapshot() {
        let inner = Schema::register(
            Container::new("Inner", StorageWidth::U8),
            vec![FieldSpec::new("x", "u8")],
        )
        .unwrap();
        let other = Schema::register(
            Container::new("Inner", StorageWidth::U8),
            vec![FieldSpec::new("x", "u8")],
        )
        .unwrap();
        let outer = Schema::register(
            Container::new("Outer", StorageWidth::U8),
            vec![FieldSpec::new("inner", "Inner")
                .bits(8)
                .custom(CustomSpec::nested(Primitive::U8, Arc::new(inner)))],
        )
        .unwrap();

        let error = outer.zeroed().set("inner", other.zeroed()).unwrap_err();
        assert!(matches!(error, AccessError::TypeMismatch { .. }));
    }

    #[test]
    fn test_enum_field_falls_back() {
        let mode =
            Arc::new(EnumCodec::new("Mode", [("Off", 0), ("On", 1), ("Auto", 2)], "Off").unwrap());
        let schema = Schema::register(
            Container::new("Control", StorageWidth::U32),
            vec![
                FieldSpec::new("value", "u32").bits(24),
                FieldSpec::new("mode", "Mode")
                    .bits(8)
                    .custom(CustomSpec::enumeration(Primitive::U8, mode.clone())),
            ],
        )
        .unwrap();

        let snapshot = schema.unpack(0x1234_5678);
        assert_eq!(snapshot.get("mode").unwrap(), mode.member("Off").unwrap());
        assert_eq!(snapshot.pack(), 0x0034_5678);

        let snapshot = schema.unpack(0x0234_5678);
        assert_eq!(snapshot.get("mode").unwrap(), mode.member("Auto").unwrap());
        assert_eq!(snapshot.pack(), 0x0234_5678);
    }

    #[derive(Debug)]
    struct Celsius;

    impl Codec for Celsius {
        fn decode(&self, raw: u64) -> Value {
            Value::Signed(raw as i64 - 40)
        }

        fn encode(&self, value: &Value) -> u64 {
            value.as_i64().map_or(0, |v| (v + 40) as u64)
        }

        fn accepts(&self, value: &Value) -> bool {
            value.as_i64().is_some_and(|v| (-40..=215).contains(&v))
        }
    }

    #[test]
    fn test_user_codec() {
        let schema = Schema::register(
            Container::new("Sensor", StorageWidth::U16),
            vec![
                FieldSpec::new("temp", "Celsius")
                    .bits(8)
                    .custom(CustomSpec::nested(Primitive::U8, Arc::new(Celsius)))
                    .default_value(-40i64),
                FieldSpec::new("id", "u8"),
            ],
        )
        .unwrap();

        assert_eq!(schema.defaulted().get("temp").unwrap(), Value::Signed(-40));
        assert_eq!(schema.unpack(0x0141).get("temp").unwrap(), Value::Signed(25));

        let mut snapshot = schema.zeroed();
        snapshot.set("temp", 20i64).unwrap();
        assert_eq!(snapshot.pack(), 60);
        assert!(snapshot.set("temp", 300i64).is_err());
    }

    #[test]
    fn test_padding() {
        let schema = Schema::register(
            Container::new("Padded", StorageWidth::U8),
            vec![
                FieldSpec::new("flag", "bool"),
                FieldSpec::padding("reserved", "u8", 7).default_value(0x05u8),
            ],
        )
        .unwrap();

        assert_eq!(schema.padding_mask(), 0xFE);
        assert_eq!(schema.padding_bits(), 0x0A);
        assert_eq!(schema.zeroed().pack(), 0x0A);
        assert_eq!(schema.unpack(0xFF).pack(), 0x0B);
        assert_eq!(schema.layout().count(), 1);
        assert!(schema.field("reserved").is_none());
        assert_eq!(
            schema.zeroed().get("reserved").unwrap_err(),
            AccessError::PaddingField("reserved".to_string())
        );
    }

    #[test]
    fn test_padding_names_may_repeat() {
        let schema = Schema::register(
            Container::new("Gaps", StorageWidth::U8),
            vec![
                FieldSpec::padding("_", "u8", 2),
                FieldSpec::new("mid", "u8").bits(4),
                FieldSpec::padding("_", "u8", 2),
            ],
        )
        .unwrap();
        assert_eq!(schema.field("mid").unwrap().offset(), 2);
    }

    #[test]
    fn test_unknown_field() {
        let schema = bytes(BitOrder::LsbFirst);
        assert_eq!(
            schema.zeroed().get("e").unwrap_err(),
            AccessError::UnknownField("e".to_string())
        );
    }

    #[test]
    fn test_type_mismatch() {
        let schema = bytes(BitOrder::LsbFirst);
        let error = schema.zeroed().set("a", true).unwrap_err();
        assert_eq!(
            error,
            AccessError::TypeMismatch {
                field: "a".to_string(),
                expected: "an integer",
            }
        );
    }

    #[test]
    fn test_unsupported_type() {
        let error = register_err(StorageWidth::U32, vec![FieldSpec::new("x", "f32")]);
        assert_eq!(error.code(), "unsupported-field-type");
        assert_eq!(error.field.as_deref(), Some("x"));
    }

    #[test]
    fn test_custom_missing_metadata() {
        let error = register_err(StorageWidth::U8, vec![FieldSpec::new("x", "Thing").bits(8)]);
        assert_eq!(
            error.kind,
            SchemaErrorKind::CustomTypeMissingMetadata {
                ty: "Thing".to_string()
            }
        );
    }

    #[test]
    fn test_width_too_large() {
        let error = register_err(StorageWidth::U16, vec![FieldSpec::new("x", "u8").bits(9)]);
        assert_eq!(error.kind, SchemaErrorKind::FieldWidthTooLarge { width: 9, max: 8 });

        let codec = Arc::new(EnumCodec::new("E", [("A", 0)], "A").unwrap());
        let error = register_err(
            StorageWidth::U16,
            vec![FieldSpec::new("e", "E")
                .bits(9)
                .custom(CustomSpec::enumeration(Primitive::U8, codec))],
        );
        assert_eq!(error.code(), "field-width-too-large");
    }

    #[test]
    fn test_width_zero() {
        let error = register_err(
            StorageWidth::U8,
            vec![FieldSpec::new("x", "u8").bits(0), FieldSpec::new("y", "u8")],
        );
        assert_eq!(error.kind, SchemaErrorKind::FieldWidthNonPositive);
    }

    #[test]
    fn test_width_conservation() {
        let error = register_err(
            StorageWidth::U32,
            vec![FieldSpec::new("a", "u8"), FieldSpec::new("b", "u16").bits(12)],
        );
        assert_eq!(
            error.kind,
            SchemaErrorKind::InsufficientWidth {
                used: 20,
                width: 32,
                missing: 12
            }
        );

        let error = register_err(
            StorageWidth::U8,
            vec![FieldSpec::new("a", "u8"), FieldSpec::new("b", "bool")],
        );
        assert_eq!(
            error.kind,
            SchemaErrorKind::ExcessWidth {
                used: 9,
                width: 8,
                excess: 1
            }
        );
    }

    #[test]
    fn test_field_checks_run_before_layout() {
        let error = register_err(
            StorageWidth::U32,
            vec![FieldSpec::new("a", "u8"), FieldSpec::new("b", "f64")],
        );
        assert_eq!(error.code(), "unsupported-field-type");
    }

    #[test]
    fn test_invalid_names() {
        let error = register_err(StorageWidth::U8, vec![FieldSpec::new("", "u8")]);
        assert_eq!(error.kind, SchemaErrorKind::InvalidFieldName);

        let error = register_err(
            StorageWidth::U16,
            vec![FieldSpec::new("a", "u8"), FieldSpec::new("a", "u8")],
        );
        assert_eq!(error.kind, SchemaErrorKind::DuplicateField);
    }

    #[test]
    fn test_invalid_default() {
        let error = register_err(
            StorageWidth::U8,
            vec![FieldSpec::new("a", "u8").default_value(256u16)],
        );
        assert_eq!(error.code(), "invalid-default");

        let error = register_err(
            StorageWidth::U8,
            vec![FieldSpec::new("a", "bool").default_value(1u8), FieldSpec::new("b", "u8").bits(7)],
        );
        assert_eq!(error.code(), "invalid-default");
    }

    #[test]
    fn test_signed_type_wider_than_container() {
        let schema = Schema::register(
            Container::new("Narrow", StorageWidth::U8).with_order(BitOrder::MsbFirst),
            vec![
                FieldSpec::new("a", "i64").bits(4),
                FieldSpec::new("b", "i32").bits(4),
            ],
        )
        .unwrap();

        let snapshot = schema.unpack(0xF1);
        assert_eq!(snapshot.get("a").unwrap(), Value::Signed(-1));
        assert_eq!(snapshot.get("b").unwrap(), Value::Signed(1));
        assert_eq!(snapshot.pack(), 0xF1);

        let mut snapshot = schema.zeroed();
        snapshot.set("a", i64::MIN + 7).unwrap();
        snapshot.set("b", -8i32).unwrap();
        assert_eq!(snapshot.get("a").unwrap(), Value::Signed(7));
        assert_eq!(snapshot.get("b").unwrap(), Value::Signed(-8));
        assert_eq!(snapshot.pack(), 0x78);
    }

    #[test]
    fn test_enum_field_narrower_than_discriminant() {
        let codec = Arc::new(EnumCodec::new("Wide", [("A", 0), ("B", 5)], "A").unwrap());
        let error = register_err(
            StorageWidth::U8,
            vec![
                FieldSpec::new("e", "Wide")
                    .bits(2)
                    .custom(CustomSpec::enumeration(Primitive::U8, codec.clone())),
                FieldSpec::new("rest", "u8").bits(6),
            ],
        );
        assert_eq!(error.code(), "invalid-enum");
        assert_eq!(error.field.as_deref(), Some("e"));

        let schema = Schema::register(
            Container::new("Fits", StorageWidth::U8),
            vec![
                FieldSpec::new("e", "Wide")
                    .bits(3)
                    .custom(CustomSpec::enumeration(Primitive::U8, codec.clone())),
                FieldSpec::new("rest", "u8").bits(5),
            ],
        )
        .unwrap();
        let mut snapshot = schema.zeroed();
        snapshot.set("e", codec.member("B").unwrap()).unwrap();
        assert_eq!(snapshot.pack(), 5);
        assert_eq!(snapshot.get("e").unwrap(), codec.member("B").unwrap());
    }

    #[test]
    fn test_primitive_ignores_custom_metadata() {
        let codec = Arc::new(EnumCodec::new("E", [("A", 0)], "A").unwrap());
        let schema = Schema::register(
            Container::new("Plain", StorageWidth::U8),
            vec![FieldSpec::new("a", "u8").custom(CustomSpec::enumeration(Primitive::U8, codec))],
        )
        .unwrap();
        assert!(matches!(
            schema.field("a").unwrap().kind(),
            FieldKind::Integer(Primitive::U8)
        ));
    }

    #[test]
    fn test_schema_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Schema>();

        let schema = bytes(BitOrder::LsbFirst);
        let handles: Vec<_> = (0..4u64)
            .map(|i| {
                let schema = schema.clone();
                std::thread::spawn(move || schema.unpack(i << 8).pack())
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), (i as u64) << 8);
        }
    }
}
