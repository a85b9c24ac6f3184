//! Low-level mask and sign-extension arithmetic over native integers.
//!
//! All values travel as `u64`. Widths are in bits and callers guarantee
//! `1 <= field_width <= container_width <= 64`.

/// Mask covering the low `field_width` bits, derived from the container's
/// maximum value: `max >> (container_width - field_width)`.
///
/// Shifting the container maximum right instead of computing
/// `(1 << field_width) - 1` keeps a field that spans the whole container from
/// overflowing the shift.
pub fn field_mask(container_width: u32, field_width: u32) -> u64 {
    debug_assert!(field_width >= 1 && field_width <= container_width && container_width <= 64);
    width_max(container_width) >> (container_width - field_width)
}

/// Largest value representable in `width` bits (`width` in `1..=64`).
pub fn width_max(width: u32) -> u64 {
    u64::MAX >> (64 - width)
}

/// Extracts `width` bits of `raw` starting at `offset`, for a field living in
/// a container `container_width` bits wide.
pub fn extract(raw: u64, container_width: u32, offset: u32, width: u32) -> u64 {
    (raw >> offset) & field_mask(container_width, width)
}

/// Sign-extends the low `field_width` bits of `raw` to `type_width` bits,
/// then widens the two's-complement result to `i64`.
///
/// `type_width` is the natural width of the declared signed type (8, 16, 32
/// or 64): `shift = type_width - field_width`, the raw bits are shifted up
/// into the type, reinterpreted as signed, and arithmetically shifted back.
pub fn sign_extend(raw: u64, field_width: u32, type_width: u32) -> i64 {
    debug_assert!(field_width >= 1 && field_width <= type_width);
    let shift = type_width - field_width;

    match type_width {
        8 => (((raw as u8) << shift) as i8 >> shift) as i64,
        16 => (((raw as u16) << shift) as i16 >> shift) as i64,
        32 => (((raw as u32) << shift) as i32 >> shift) as i64,
        _ => ((raw << shift) as i64) >> shift,
    }
}
