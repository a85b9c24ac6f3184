//! JSON-deserializable schema documents.
//!
//! A [SchemaDocument] declares enums and containers by name. Containers may
//! refer to enums and to containers declared before them as custom field
//! types. [SchemaSet::from_document] registers everything in order and keeps
//! the resulting schemas addressable by name.
//!
//! ```json
//! {
//!   "enums": [
//!     { "name": "Mode", "variants": [{ "name": "Off", "value": 0 }, { "name": "On", "value": 1 }], "fallback": "Off" }
//!   ],
//!   "containers": [
//!     {
//!       "name": "Control",
//!       "storage": "u16",
//!       "order": "MsbFirst",
//!       "fields": [
//!         { "name": "mode", "type": "Mode", "bits": 2, "custom": { "backing": "u8", "base": "Enum" }, "default": "On" },
//!         { "name": "level", "type": "i8", "bits": 6 },
//!         { "name": "reserved", "type": "u8", "padding": true }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use serde::{Deserialize, Serialize};

use crate::{
    codec::{Codec, EnumCodec},
    container::{BitOrder, Container, StorageWidth, Visibility},
    errors::{SchemaError, SchemaErrorKind},
    field::{CustomSpec, FieldSpec},
    schema::Schema,
    types::{self, CustomBase, Primitive, TypeClass},
    value::Value,
};

/// Top-level document: enums first, then containers.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SchemaDocument {
    #[serde(default)]
    pub enums: Vec<EnumDef>,
    #[serde(default)]
    pub containers: Vec<ContainerDef>,
}

/// Enum-like custom type.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EnumDef {
    pub name: String,
    pub variants: Vec<VariantDef>,
    /// Variant returned when a raw value matches no discriminant.
    pub fallback: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VariantDef {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum StorageDef {
    U8,
    U16,
    U32,
    U64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default)]
pub enum BitOrderDef {
    #[default]
    LsbFirst,
    MsbFirst,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default)]
pub enum VisibilityDef {
    #[default]
    Public,
    Crate,
    Private,
}

/// A container and its ordered fields.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ContainerDef {
    pub name: String,
    pub storage: StorageDef,
    #[serde(default)]
    pub order: BitOrderDef,
    #[serde(default)]
    pub visibility: VisibilityDef,
    pub fields: Vec<FieldDef>,
}

/// A single field declaration.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldDef {
    pub name: String,
    /// Primitive type name, or the name of an enum or earlier container.
    #[serde(rename = "type")]
    pub ty: String,
    /// Explicit width. Signed so that non-positive widths can be reported.
    #[serde(default)]
    pub bits: Option<i64>,
    #[serde(default)]
    pub custom: Option<CustomDef>,
    #[serde(default)]
    pub default: Option<LiteralDef>,
    #[serde(default)]
    pub padding: bool,
}

/// Backing metadata for enum and nested fields.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CustomDef {
    pub backing: PrimitiveDef,
    #[serde(default)]
    pub base: BaseDef,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveDef {
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

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default)]
pub enum BaseDef {
    /// Another container of the same document.
    #[default]
    Nested,
    /// An enum of the same document.
    Enum,
}

/// A literal field value: a boolean, an integer, an enum variant name, or
/// an object of field literals for a nested container.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum LiteralDef {
    Bool(bool),
    Unsigned(u64),
    Signed(i64),
    Variant(String),
    Fields(BTreeMap<String, LiteralDef>),
}

impl From<StorageDef> for StorageWidth {
    fn from(def: StorageDef) -> Self {
        match def {
            StorageDef::U8 => StorageWidth::U8,
            StorageDef::U16 => StorageWidth::U16,
            StorageDef::U32 => StorageWidth::U32,
            StorageDef::U64 => StorageWidth::U64,
        }
    }
}

impl From<BitOrderDef> for BitOrder {
    fn from(def: BitOrderDef) -> Self {
        match def {
            BitOrderDef::LsbFirst => BitOrder::LsbFirst,
            BitOrderDef::MsbFirst => BitOrder::MsbFirst,
        }
    }
}

impl From<VisibilityDef> for Visibility {
    fn from(def: VisibilityDef) -> Self {
        match def {
            VisibilityDef::Public => Visibility::Public,
            VisibilityDef::Crate => Visibility::Crate,
            VisibilityDef::Private => Visibility::Private,
        }
    }
}

impl From<PrimitiveDef> for Primitive {
    fn from(def: PrimitiveDef) -> Self {
        match def {
            PrimitiveDef::Bool => Primitive::Bool,
            PrimitiveDef::U8 => Primitive::U8,
            PrimitiveDef::I8 => Primitive::I8,
            PrimitiveDef::U16 => Primitive::U16,
            PrimitiveDef::I16 => Primitive::I16,
            PrimitiveDef::U32 => Primitive::U32,
            PrimitiveDef::I32 => Primitive::I32,
            PrimitiveDef::U64 => Primitive::U64,
            PrimitiveDef::I64 => Primitive::I64,
        }
    }
}

impl From<BaseDef> for CustomBase {
    fn from(def: BaseDef) -> Self {
        match def {
            BaseDef::Nested => CustomBase::Nested,
            BaseDef::Enum => CustomBase::Enum,
        }
    }
}

/// Enums and schemas registered from one document.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    enums: HashMap<String, Arc<EnumCodec>>,
    schemas: HashMap<String, Schema>,
}

impl SchemaSet {
    /// Registers every enum, then every container, in document order. A
    /// later definition with an existing name replaces the earlier one.
    pub fn from_document(document: SchemaDocument) -> Result<Self, SchemaError> {
        let mut set = SchemaSet::default();

        for def in document.enums {
            let variants = def.variants.into_iter().map(|v| (v.name, v.value));
            let codec = EnumCodec::new(def.name.clone(), variants, &def.fallback)?;
            set.enums.insert(def.name, Arc::new(codec));
        }

        for def in document.containers {
            let container = Container::new(def.name.clone(), def.storage.into())
                .with_order(def.order.into())
                .with_visibility(def.visibility.into());

            let specs = def
                .fields
                .into_iter()
                .map(|field| set.field_spec(&def.name, field))
                .collect::<Result<Vec<_>, _>>()?;

            let schema = Schema::register(container, specs)?;
            set.schemas.insert(def.name, schema);
        }

        Ok(set)
    }

    /// Registered schema by container name.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Registered enum by name.
    pub fn enum_codec(&self, name: &str) -> Option<&EnumCodec> {
        self.enums.get(name).map(Arc::as_ref)
    }

    /// Container names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Interprets `literal` as a value of the declared type `ty`.
    ///
    /// Enum types take a variant name; container types take an object whose
    /// entries are applied over its defaulted snapshot; primitives take booleans
    /// and integers as they are.
    pub fn literal_value(&self, ty: &str, literal: &LiteralDef) -> Result<Value, String> {
        if let Some(codec) = self.enums.get(ty) {
            return match literal {
                LiteralDef::Variant(name) => codec
                    .member(name)
                    .ok_or_else(|| format!("`{name}` is not a variant of `{ty}`")),
                other => Err(format!("expected a variant name of `{ty}`, got {other:?}")),
            };
        }

        if let Some(schema) = self.schemas.get(ty) {
            let LiteralDef::Fields(fields) = literal else {
                return Err(format!("expected an object of `{ty}` fields, got {literal:?}"));
            };
            let mut snapshot = schema.defaulted();
            for (name, literal) in fields {
                let field = schema
                    .field(name)
                    .ok_or_else(|| format!("`{ty}` has no field `{name}`"))?;
                let value = self.literal_value(field.ty(), literal)?;
                snapshot.set(name, value).map_err(|e| e.to_string())?;
            }
            return Ok(snapshot.into());
        }

        match literal {
            LiteralDef::Bool(v) => Ok(Value::Bool(*v)),
            LiteralDef::Unsigned(v) => Ok(Value::Unsigned(*v)),
            LiteralDef::Signed(v) => Ok(Value::Signed(*v)),
            other => Err(format!("expected a `{ty}` literal, got {other:?}")),
        }
    }

    fn field_spec(&self, container: &str, def: FieldDef) -> Result<FieldSpec, SchemaError> {
        let mut spec = FieldSpec::new(def.name, def.ty);
        spec.padding = def.padding;
        spec.bits = def
            .bits
            .map(|bits| u32::try_from(bits.max(0)).unwrap_or(u32::MAX));

        if let (TypeClass::Custom, Some(custom)) = (types::classify(&spec.ty), def.custom) {
            let codec: Arc<dyn Codec> = match custom.base {
                BaseDef::Enum => self.enums.get(&spec.ty).map(|c| c.clone() as Arc<dyn Codec>),
                BaseDef::Nested => self
                    .schemas
                    .get(&spec.ty)
                    .map(|s| Arc::new(s.clone()) as Arc<dyn Codec>),
            }
            .ok_or_else(|| {
                SchemaError::field(
                    container,
                    &spec.name,
                    SchemaErrorKind::UnresolvedType {
                        ty: spec.ty.clone(),
                    },
                )
            })?;

            spec.custom = Some(CustomSpec {
                backing: custom.backing.into(),
                base: custom.base.into(),
                codec,
            });
        }

        if let Some(literal) = &def.default {
            let value = self.literal_value(&spec.ty, literal).map_err(|reason| {
                SchemaError::field(
                    container,
                    &spec.name,
                    SchemaErrorKind::InvalidDefault { reason },
                )
            })?;
            spec.default = Some(value);
        }

        Ok(spec)
    }
}

impl TryFrom<SchemaDocument> for SchemaSet {
    type Error = SchemaError;

    fn try_from(document: SchemaDocument) -> Result<Self, Self::Error> {
        SchemaSet::from_document(document)
    }
}
