//! A mutable instance of a schema.

use std::fmt;

use crate::{
    builder::Builder, compiled::Slot, errors::AccessError, schema::Schema, value::Value,
};

/// Field values of one container, addressed by field name.
///
/// Snapshots compare equal when they belong to the same schema and hold the
/// same stored values.
#[derive(Clone)]
pub struct Snapshot {
    schema: Schema,
    slots: Vec<Slot>,
}

impl Snapshot {
    pub(crate) fn new(schema: Schema, slots: Vec<Slot>) -> Self {
        Snapshot { schema, slots }
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Slot] {
        &mut self.slots
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Reads a field.
    pub fn get(&self, name: &str) -> Result<Value, AccessError> {
        let (i, field) = self.schema.lookup(name)?;
        Ok(field.load(&self.slots[i]))
    }

    /// Writes a field. Integers are truncated to the field width; signed
    /// fields read the truncated bits back sign-extended.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), AccessError> {
        let (i, field) = self.schema.lookup(name)?;
        let slot = field
            .store(&value.into())
            .ok_or_else(|| AccessError::TypeMismatch {
                field: name.to_string(),
                expected: field.expected(),
            })?;

        self.slots[i] = slot;
        Ok(())
    }

    /// Packs every field, padding included, into the container value.
    pub fn pack(&self) -> u64 {
        self.schema.pack_slots(&self.slots)
    }

    /// Accessible fields and their values, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> + '_ {
        self.schema
            .fields()
            .iter()
            .zip(&self.slots)
            .filter(|(field, _)| !field.is_padding())
            .map(|(field, slot)| (field.name(), field.load(slot)))
    }

    /// Builder seeded by packing this snapshot and unpacking the result.
    pub fn to_builder(&self) -> Builder {
        self.schema.builder_from_raw(self.pack())
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.slots == other.slots
    }
}

impl Eq for Snapshot {}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.schema.name());
        for (name, value) in self.iter() {
            out.field(name, &value);
        }
        out.finish()
    }
}
