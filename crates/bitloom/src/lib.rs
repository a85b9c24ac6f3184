//! # bitloom
//!
//! Packs typed fields into a single fixed-width unsigned integer.
//!
//! Declare a container and its ordered fields, register them as a
//! [schema::Schema], then construct, read, write, pack and unpack values.
//! Registration resolves every field's bit offset under the container's bit
//! order and rejects layouts whose widths do not add up to the container
//! width. After that nothing fails: unpacking accepts any raw value, and
//! writes truncate to the field width.
//!
//! Fields may be booleans, signed or unsigned integers of any width up to
//! their type's natural width, or custom types interpreted by a
//! [codec::Codec]: another schema, an [codec::EnumCodec], or a user codec.
//!
//! ## Example
//!
//! ```
//! use bitloom::container::{BitOrder, Container, StorageWidth};
//! use bitloom::field::FieldSpec;
//! use bitloom::schema::Schema;
//! use bitloom::value::Value;
//!
//! let schema = Schema::register(
//!     Container::new("Header", StorageWidth::U16).with_order(BitOrder::MsbFirst),
//!     vec![
//!         FieldSpec::new("version", "u8").bits(4).default_value(2u8),
//!         FieldSpec::new("delta", "i8").bits(4),
//!         FieldSpec::new("length", "u8"),
//!     ],
//! )
//! .unwrap();
//!
//! let header = schema
//!     .builder()
//!     .with("delta", -1i8)
//!     .unwrap()
//!     .with("length", 0x40u8)
//!     .unwrap()
//!     .build();
//! assert_eq!(header.pack(), 0x2F40);
//!
//! let parsed = schema.unpack(0x2F40);
//! assert_eq!(parsed.get("delta").unwrap(), Value::Signed(-1));
//! assert_eq!(schema.field("length").unwrap().offset(), 0);
//! ```

pub mod bits;
pub mod builder;
pub mod codec;
pub mod compiled;
pub mod container;
pub mod defaults;
pub mod errors;
pub mod field;
pub mod layout;
pub mod schema;
#[cfg(feature = "serde")]
pub mod serde;
pub mod snapshot;
pub mod types;
pub mod value;
