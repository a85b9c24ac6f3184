//! Capabilities for fields whose bits are interpreted by another codec.
//!
//! A custom field stores a decoded [Value] and relies on its [Codec] to turn
//! raw backing bits into that value and back. [crate::schema::Schema] is the
//! struct-like implementation; [EnumCodec] is the enum-like one. Users can
//! implement [Codec] for their own types.

use std::{collections::HashSet, fmt};

use crate::{
    errors::{SchemaError, SchemaErrorKind},
    value::{EnumMember, Value},
};

/// Decode/encode pair for a custom field.
///
/// `decode` must be total: every raw backing value maps to some value,
/// because unpacking never fails.
pub trait Codec: fmt::Debug + Send + Sync {
    /// Interprets raw backing bits.
    fn decode(&self, raw: u64) -> Value;

    /// Produces raw backing bits. Masking to the field width happens later.
    fn encode(&self, value: &Value) -> u64;

    /// Whether `value` belongs to this codec's domain.
    fn accepts(&self, value: &Value) -> bool;

    /// Fewest bits a field needs to hold every encoding this codec can
    /// produce. Registration rejects narrower fields.
    fn required_width(&self) -> u32 {
        0
    }
}

/// Enum-like codec over a fixed member table.
///
/// Unknown raw values decode to the fallback member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumCodec {
    name: String,
    members: Vec<EnumMember>,
    fallback: usize,
}

impl EnumCodec {
    /// Builds an enum codec. `fallback` names the member returned for raw
    /// values that match no discriminant.
    pub fn new<N: Into<String>>(
        name: impl Into<String>,
        members: impl IntoIterator<Item = (N, u64)>,
        fallback: &str,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        let members: Vec<EnumMember> = members
            .into_iter()
            .map(|(member, discriminant)| EnumMember {
                name: member.into(),
                discriminant,
            })
            .collect();

        let invalid = |reason: String| {
            SchemaError::container(&name, SchemaErrorKind::InvalidEnum { reason })
        };

        if members.is_empty() {
            return Err(invalid("no members".to_string()));
        }

        let mut names = HashSet::new();
        let mut discriminants = HashSet::new();
        for member in &members {
            if !names.insert(member.name.as_str()) {
                return Err(invalid(format!("member `{}` is declared twice", member.name)));
            }
            if !discriminants.insert(member.discriminant) {
                return Err(invalid(format!(
                    "discriminant {} is used twice",
                    member.discriminant
                )));
            }
        }

        let fallback = members
            .iter()
            .position(|member| member.name == fallback)
            .ok_or_else(|| invalid(format!("fallback `{fallback}` is not a member")))?;

        Ok(EnumCodec {
            name,
            members,
            fallback,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[EnumMember] {
        &self.members
    }

    pub fn fallback(&self) -> &EnumMember {
        &self.members[self.fallback]
    }

    /// Looks up a member by name, ready to be stored in a field.
    pub fn member(&self, name: &str) -> Option<Value> {
        self.members
            .iter()
            .find(|member| member.name == name)
            .cloned()
            .map(Value::Enum)
    }
}

impl Codec for EnumCodec {
    fn decode(&self, raw: u64) -> Value {
        let member = self
            .members
            .iter()
            .find(|member| member.discriminant == raw)
            .unwrap_or_else(|| self.fallback());

        Value::Enum(member.clone())
    }

    fn encode(&self, value: &Value) -> u64 {
        match value {
            Value::Enum(member) => member.discriminant,
            _ => 0,
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match value {
            Value::Enum(member) => self.members.contains(member),
            _ => false,
        }
    }

    fn required_width(&self) -> u32 {
        let largest = self.members.iter().map(|m| m.discriminant).max().unwrap_or(0);
        u64::BITS - largest.leading_zeros()
    }
}
