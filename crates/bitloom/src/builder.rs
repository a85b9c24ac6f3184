//! Fluent construction of snapshots.

use crate::{errors::AccessError, snapshot::Snapshot, value::Value};

/// Wraps a snapshot and mutates it one field at a time.
///
/// Obtain one from [crate::schema::Schema::builder],
/// [crate::schema::Schema::builder_from_raw],
/// [crate::schema::Schema::builder_zeroed] or [Snapshot::to_builder].
#[derive(Debug, Clone)]
pub struct Builder {
    snapshot: Snapshot,
}

impl Builder {
    pub(crate) fn new(snapshot: Snapshot) -> Self {
        Builder { snapshot }
    }

    /// Sets a field and returns the builder for chaining.
    pub fn with(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self, AccessError> {
        self.snapshot.set(name, value)?;
        Ok(self)
    }

    /// Returns a copy of the current state. Later calls to [Builder::with]
    /// do not affect snapshots already built.
    pub fn build(&self) -> Snapshot {
        self.snapshot.clone()
    }
}
