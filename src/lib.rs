//! # netpack
//!
//! A deterministic, schema-less binary packet codec for game netcode.
//!
//! - Encodes primitives, text, fixed-size vectors and colors, enumerations, arrays, lists, maps and
//!   arbitrary composite records into a compact little-endian byte stream
//! - The stream carries no type tags and no field names: both sides agree on the layout through the
//!   type being written or read
//! - Composite layouts follow member declaration order (fields first, then properties) and are
//!   computed once per type and cached process-wide
//! - A dynamic [`Value`] entry point encodes values whose type is only known at runtime, and decodes
//!   against a [`Shape`] supplied by the caller
//!
//! ## Attribute Macros
//!
//! `#[derive(Packet)]` works on structs (named, tuple and unit) and on fieldless enums.
//!
//! - Only fields with a visibility modifier (`pub`, `pub(crate)`, ...) are part of the wire layout.
//! - `#[netpack(exclude)]` - The field never crosses the wire. On decode it keeps its `Default` value.
//! - `#[netpack(property(name = "...", ty = T, get = getter, set = setter))]` - Declares a computed
//!   member on the struct. Properties are written after all fields, in declaration order. Without
//!   `set` the property is read-only: its value is still consumed on decode, then dropped.
//!   Add `exclude` inside the parentheses to keep a declared property off the wire.
//!
//! Decoding a struct starts from `Default::default()`, so derived structs must implement `Default`.
//!
//! ## Feature Flags
//!
//! - `indexmap` - Enables `IndexMap` as an insertion-ordered map.
//! - `ahash` - Enables `ahash::AHashMap`.
//! - `smol_str` - Enables `smol_str::SmolStr` as text.
//!
//! ## Example
//!
//! ```rust
//! use netpack::{pack, unpack, Packet, Vector2};
//!
//! #[derive(Packet, Debug, Default, PartialEq)]
//! struct PlayerState {
//!     pub id: u32,
//!     pub position: Vector2,
//!     pub inventory: Vec<String>,
//!     #[netpack(exclude)]
//!     pub dirty: bool,
//! }
//!
//! let state = PlayerState {
//!     id: 7,
//!     position: Vector2::new(3.5, -2.0),
//!     inventory: vec!["sword".to_string()],
//!     dirty: true,
//! };
//! let mut bytes = pack(&state).unwrap();
//! let decoded: PlayerState = unpack(&mut bytes).unwrap();
//! assert_eq!(decoded.position, state.position);
//! assert!(!decoded.dirty);
//! ```

pub mod buffer;
pub mod collections;
pub mod composite;
mod dispatch;
pub mod enums;
mod features;
pub mod geometry;
pub mod primitives;
pub mod shape;
pub mod value;

use bytes::Bytes;

pub use buffer::{Limits, PacketReader, PacketWriter};
pub use composite::{Composite, DescriptorCache, FieldDescriptor, MemberCodec, MemberKind, TypeDescriptor};
pub use enums::PacketEnum;
pub use geometry::{Color, FixedVector, Vector2, Vector3};
pub use netpack_derive::Packet;
pub use primitives::Primitive;
pub use shape::{Category, CompositeShape, MemberShape, PrimitiveKind, Shape, VectorKind};
pub use value::Value;

/// Errors that can occur during write or read operations.
///
/// Every error aborts the operation it was raised in. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    /// An absent value (`None`, [`Value::Null`]) was handed to the writer.
    #[error("Cannot write an absent value")]
    NullValue,
    /// The value belongs to no category the codec knows how to encode.
    #[error("Unsupported type: {type_name}")]
    UnsupportedType { type_name: String },
    /// The reader ran out of bytes.
    #[error("Unexpected end of stream: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },
    /// An enum discriminant does not fit in a single unsigned byte.
    #[error("Enum value {value} of {type_name} does not fit in one byte")]
    EnumRange { type_name: String, value: i64 },
    /// A decoded byte matches none of the enum's discriminants.
    #[error("Unknown discriminant {value} for enum {type_name}")]
    UnknownDiscriminant { type_name: &'static str, value: u8 },
    /// A fixed-size array was decoded from a count that differs from its length.
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    /// A count or text length exceeds the configured [`Limits`].
    #[error("Length {len} exceeds limit {limit}")]
    LengthLimit { len: usize, limit: usize },
    /// Values are nested deeper than the configured [`Limits`].
    #[error("Nesting depth exceeds limit {limit}")]
    DepthLimit { limit: usize },
    /// The bytes are well-sized but not a valid encoding (bad UTF-8, bad bool byte, ...).
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// The result type used throughout this crate for write/read operations.
pub type Result<T> = std::result::Result<T, PacketError>;

/// Trait for types that can be written into the packet format.
///
/// Most users should use `#[derive(Packet)]` instead of a manual implementation.
pub trait Packer: Sized {
    /// The category of this type and, recursively, of everything it contains.
    fn shape() -> Shape;

    /// Append the encoding of `self` to `writer`.
    ///
    /// # Errors
    /// Returns `PacketError` if the value (or anything nested in it) cannot be encoded.
    fn pack(&self, writer: &mut PacketWriter) -> Result<()>;
}

/// Trait for types that can be read back from the packet format.
pub trait Unpacker: Sized {
    /// Consume the encoding of one value from `reader`.
    ///
    /// # Errors
    /// Returns `PacketError` if the input is truncated or is not a valid encoding of `Self`.
    fn unpack(reader: &mut PacketReader) -> Result<Self>;
}

/// Convenience function to pack a value to bytes.
///
/// # Example
/// ```rust
/// let bytes = netpack::pack(&vec![1i32, 2, 3]).unwrap();
/// assert_eq!(bytes.len(), 4 + 3 * 4);
/// ```
pub fn pack<T: Packer>(value: &T) -> Result<Bytes> {
    let mut writer = PacketWriter::new();
    writer.write(value)?;
    Ok(writer.freeze())
}

/// Convenience function to unpack a value from bytes.
///
/// On return `reader` holds whatever followed the decoded value.
///
/// # Example
/// ```rust
/// let mut bytes = netpack::pack(&(String::from("hello"))).unwrap();
/// let text: String = netpack::unpack(&mut bytes).unwrap();
/// assert_eq!(text, "hello");
/// assert!(bytes.is_empty());
/// ```
pub fn unpack<T: Unpacker>(reader: &mut Bytes) -> Result<T> {
    let mut packet = PacketReader::new(std::mem::take(reader));
    let result = packet.read();
    *reader = packet.into_remaining();
    result
}
