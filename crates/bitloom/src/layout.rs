//! Bit offset assignment and width conservation.

use log::trace;

use crate::{
    container::{BitOrder, Container},
    errors::{SchemaError, SchemaErrorKind},
};

/// Offset of a field `width` bits wide after `consumed` bits have been
/// assigned, in a container `container_width` bits wide.
///
/// MSB-first offsets that would fall below bit 0 resolve to 0; the overflow
/// is reported by [check_width] once every field has been counted.
pub fn offset_for(order: BitOrder, container_width: u32, consumed: u32, width: u32) -> u32 {
    match order {
        BitOrder::LsbFirst => consumed,
        BitOrder::MsbFirst => match consumed.checked_add(width) {
            Some(end) if end < container_width => container_width - width - consumed,
            _ => 0,
        },
    }
}

/// Assigns an offset to every `(name, width)` pair in declaration order, then
/// checks that the widths sum to exactly the container width.
pub fn resolve<'a>(
    container: &Container,
    fields: impl IntoIterator<Item = (&'a str, u32)>,
) -> Result<Vec<u32>, SchemaError> {
    let container_width = container.width();
    let mut consumed: u32 = 0;
    let mut offsets = Vec::new();

    for (name, width) in fields {
        let offset = offset_for(container.order, container_width, consumed, width);
        trace!(
            "{}.{}: {} bit(s) at offset {}",
            container.name, name, width, offset
        );
        offsets.push(offset);
        consumed = consumed.saturating_add(width);
    }

    check_width(container, consumed)?;
    Ok(offsets)
}

/// Fails unless `used` equals the container width, naming the exact deficit
/// or excess.
pub fn check_width(container: &Container, used: u32) -> Result<(), SchemaError> {
    let width = container.width();

    if used < width {
        return Err(SchemaError::container(
            &container.name,
            SchemaErrorKind::InsufficientWidth {
                used,
                width,
                missing: width - used,
            },
        ));
    }

    if used > width {
        return Err(SchemaError::container(
            &container.name,
            SchemaErrorKind::ExcessWidth {
                used,
                width,
                excess: used - width,
            },
        ));
    }

    Ok(())
}
