//! Fieldless enums, narrowed to one unsigned byte on the wire.

use bytes::BufMut;

use crate::*;

/// A fieldless enum whose discriminants are the wire values.
///
/// `#[derive(Packet)]` implements this for enums with unit variants only.
pub trait PacketEnum: Sized + 'static {
    const TYPE_NAME: &'static str;

    /// The variant's underlying integer value.
    fn discriminant(&self) -> i64;

    /// The variant whose discriminant equals `value`, if any.
    fn from_discriminant(value: i64) -> Option<Self>;
}

/// Narrows a discriminant to the single byte that goes on the wire.
///
/// # Errors
/// Returns `PacketError::EnumRange` when `value` is outside `0..=255`.
pub fn narrow(type_name: &str, value: i64) -> Result<u8> {
    u8::try_from(value).map_err(|_| PacketError::EnumRange {
        type_name: type_name.to_string(),
        value,
    })
}

pub fn enum_shape<E: PacketEnum>() -> Shape {
    Shape::Enum {
        type_name: E::TYPE_NAME,
    }
}

pub fn pack_enum<E: PacketEnum>(value: &E, writer: &mut PacketWriter) -> Result<()> {
    let byte = narrow(E::TYPE_NAME, value.discriminant())?;
    writer.buf_mut().put_u8(byte);
    Ok(())
}

pub fn unpack_enum<E: PacketEnum>(reader: &mut PacketReader) -> Result<E> {
    let byte = reader.take_u8()?;
    E::from_discriminant(i64::from(byte)).ok_or(PacketError::UnknownDiscriminant {
        type_name: E::TYPE_NAME,
        value: byte,
    })
}
