//! Initial field states for newly constructed snapshots.

use crate::compiled::{CompiledField, Slot};

/// How accessible fields are initialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Init {
    /// Every field is 0, `false`, or its codec's decoding of 0. Declared
    /// defaults are ignored.
    Zeroed,
    /// Fields with a literal default take it; the rest are zeroed.
    Defaulted,
}

/// Builds one slot per field. Padding fields always hold their literal,
/// whichever mode is requested.
pub(crate) fn initial_slots(fields: &[CompiledField], init: Init) -> Vec<Slot> {
    fields
        .iter()
        .map(|field| match init {
            _ if field.is_padding() => field.default_slot(),
            Init::Zeroed => field.zero_slot(),
            Init::Defaulted => field.default_slot(),
        })
        .collect()
}

/// Overwrites every accessible field that declares a default with that
/// default. Decoded values are replaced, not merged.
pub(crate) fn apply_defaults(fields: &[CompiledField], slots: &mut [Slot]) {
    for (field, slot) in fields.iter().zip(slots.iter_mut()) {
        if field.is_padding() {
            continue;
        }
        if let Some(stored) = field.default().and_then(|value| field.store(value)) {
            *slot = stored;
        }
    }
}
