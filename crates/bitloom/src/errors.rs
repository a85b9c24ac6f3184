//! Error types for schema registration and runtime field access.

use std::fmt;

/// Why a schema failed to register.
///
/// Every kind is raised while building a [crate::schema::Schema]; a schema
/// that registered successfully never produces one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaErrorKind {
    /// Floating-point field types cannot be packed.
    #[error("field type `{ty}` is not supported; only integer, boolean and custom types are")]
    UnsupportedFieldType { ty: String },
    /// A nested or enum field is missing its explicit width or backing type.
    #[error("custom field type `{ty}` needs an explicit width and a backing type")]
    CustomTypeMissingMetadata { ty: String },
    /// Declared width does not fit the field's type.
    #[error("field type is {max} bit(s) wide and cannot hold {width} bit(s)")]
    FieldWidthTooLarge { width: u32, max: u32 },
    /// Declared width is zero or negative.
    #[error("field width must be greater than 0")]
    FieldWidthNonPositive,
    /// Fields do not fill the container.
    #[error(
        "fields cover {used} of {width} bit(s); add a padding field for the remaining {missing} bit(s)"
    )]
    InsufficientWidth { used: u32, width: u32, missing: u32 },
    /// Fields overflow the container.
    #[error("fields cover {used} bit(s), {excess} more than the {width}-bit container")]
    ExcessWidth { used: u32, width: u32, excess: u32 },
    /// Field name is empty.
    #[error("field name must not be empty")]
    InvalidFieldName,
    /// Two fields share a name.
    #[error("field name is declared more than once")]
    DuplicateField,
    /// A literal default does not fit the declared type.
    #[error("default value does not fit the field type: {reason}")]
    InvalidDefault { reason: String },
    /// An enum codec was declared inconsistently.
    #[error("invalid enum: {reason}")]
    InvalidEnum { reason: String },
    /// A custom type name does not refer to anything registered earlier.
    #[error("custom type `{ty}` is not defined")]
    UnresolvedType { ty: String },
}

impl SchemaErrorKind {
    /// Stable identifier for the diagnostics layer.
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorKind::UnsupportedFieldType { .. } => "unsupported-field-type",
            SchemaErrorKind::CustomTypeMissingMetadata { .. } => "custom-type-missing-metadata",
            SchemaErrorKind::FieldWidthTooLarge { .. } => "field-width-too-large",
            SchemaErrorKind::FieldWidthNonPositive => "field-width-non-positive",
            SchemaErrorKind::InsufficientWidth { .. } => "insufficient-width",
            SchemaErrorKind::ExcessWidth { .. } => "excess-width",
            SchemaErrorKind::InvalidFieldName => "invalid-field-name",
            SchemaErrorKind::DuplicateField => "duplicate-field",
            SchemaErrorKind::InvalidDefault { .. } => "invalid-default",
            SchemaErrorKind::InvalidEnum { .. } => "invalid-enum",
            SchemaErrorKind::UnresolvedType { .. } => "unresolved-type",
        }
    }
}

/// A registration failure, naming the container and, when one is to blame,
/// the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub container: String,
    pub field: Option<String>,
}

impl SchemaError {
    pub(crate) fn container(container: &str, kind: SchemaErrorKind) -> Self {
        Self {
            kind,
            container: container.to_string(),
            field: None,
        }
    }

    pub(crate) fn field(container: &str, field: &str, kind: SchemaErrorKind) -> Self {
        Self {
            kind,
            container: container.to_string(),
            field: Some(field.to_string()),
        }
    }

    /// Stable identifier of the error kind.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(
                f,
                "[{}] {}.{}: {}",
                self.code(),
                self.container,
                field,
                self.kind
            ),
            None => write!(f, "[{}] {}: {}", self.code(), self.container, self.kind),
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Errors produced when a field is addressed by name at runtime.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// The schema has no field with this name.
    #[error("no field named `{0}`")]
    UnknownField(String),
    /// Padding fields have no accessors.
    #[error("`{0}` is a padding field and cannot be accessed")]
    PaddingField(String),
    /// The value's kind does not match the field.
    #[error("field `{field}` expects {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },
}
