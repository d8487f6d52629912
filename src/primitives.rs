use std::rc::Rc;
use std::sync::Arc;

use bytes::BufMut;

use crate::*;

/// Scalars and text: the leaves every other category bottoms out in.
pub trait Primitive: Packer + Unpacker {
    const KIND: PrimitiveKind;
}

// --- Fixed-width numbers ---
/// Numbers are written as their little-endian bytes, with no tag and no compaction.
macro_rules! impl_fixed_width {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const KIND: PrimitiveKind = PrimitiveKind::$kind;
            }

            impl Packer for $ty {
                fn shape() -> Shape {
                    Shape::Primitive(<Self as Primitive>::KIND)
                }

                fn pack(&self, writer: &mut PacketWriter) -> Result<()> {
                    writer.buf_mut().put_slice(&self.to_le_bytes());
                    Ok(())
                }
            }

            impl Unpacker for $ty {
                fn unpack(reader: &mut PacketReader) -> Result<Self> {
                    Ok(<$ty>::from_le_bytes(reader.take()?))
                }
            }
        )*
    };
}

impl_fixed_width! {
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
    f32 => F32,
    f64 => F64,
}

// --- bool ---
impl Primitive for bool {
    const KIND: PrimitiveKind = PrimitiveKind::Bool;
}

/// Encodes a `bool` as a single byte: 0 for `false`, 1 for `true`.
impl Packer for bool {
    fn shape() -> Shape {
        Shape::Primitive(PrimitiveKind::Bool)
    }

    fn pack(&self, writer: &mut PacketWriter) -> Result<()> {
        writer.buf_mut().put_u8(u8::from(*self));
        Ok(())
    }
}

/// # Errors
/// Any byte other than 0 or 1 is rejected.
impl Unpacker for bool {
    fn unpack(reader: &mut PacketReader) -> Result<Self> {
        match reader.take_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(PacketError::InvalidData(format!(
                "Expected bool byte (0 or 1), got {}",
                other
            ))),
        }
    }
}

// --- char ---
impl Primitive for char {
    const KIND: PrimitiveKind = PrimitiveKind::Char;
}

/// Encodes a `char` as its UTF-8 bytes. ASCII characters take one byte.
impl Packer for char {
    fn shape() -> Shape {
        Shape::Primitive(PrimitiveKind::Char)
    }

    fn pack(&self, writer: &mut PacketWriter) -> Result<()> {
        let mut utf8 = [0u8; 4];
        writer.buf_mut().put_slice(self.encode_utf8(&mut utf8).as_bytes());
        Ok(())
    }
}

impl Unpacker for char {
    fn unpack(reader: &mut PacketReader) -> Result<Self> {
        let lead = reader.take_u8()?;
        let width = match lead {
            0x00..=0x7F => 1,
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            other => {
                return Err(PacketError::InvalidData(format!(
                    "Invalid UTF-8 lead byte for char: 0x{:02X}",
                    other
                )))
            }
        };
        let mut utf8 = [lead, 0, 0, 0];
        if width > 1 {
            let tail = reader.take_bytes(width - 1)?;
            utf8[1..width].copy_from_slice(&tail);
        }
        std::str::from_utf8(&utf8[..width])
            .map_err(|e| PacketError::InvalidData(e.to_string()))?
            .chars()
            .next()
            .ok_or_else(|| PacketError::InvalidData("Empty char encoding".to_string()))
    }
}

// --- Text ---
/// Writes text as a 7-bit encoded byte length followed by the UTF-8 bytes.
pub fn write_text(writer: &mut PacketWriter, text: &str) -> Result<()> {
    let len = text.len();
    let limit = writer.limits().max_len.min(u32::MAX as usize);
    if len > limit {
        return Err(PacketError::LengthLimit { len, limit });
    }
    writer.put_varint(len as u32);
    writer.buf_mut().put_slice(text.as_bytes());
    Ok(())
}

/// Reads text written by [`write_text`].
pub fn read_text(reader: &mut PacketReader) -> Result<String> {
    let len = reader.read_varint()? as usize;
    reader.check_len(len)?;
    let bytes = reader.take_bytes(len)?;
    String::from_utf8(bytes.to_vec()).map_err(|e| PacketError::InvalidData(e.to_string()))
}

impl Primitive for String {
    const KIND: PrimitiveKind = PrimitiveKind::Text;
}

impl Packer for String {
    fn shape() -> Shape {
        Shape::Primitive(PrimitiveKind::Text)
    }

    fn pack(&self, writer: &mut PacketWriter) -> Result<()> {
        write_text(writer, self)
    }
}

impl Unpacker for String {
    fn unpack(reader: &mut PacketReader) -> Result<Self> {
        read_text(reader)
    }
}

// --- Option ---
/// `Some` is written as the inner value with no marker; `None` cannot be written.
///
/// # Errors
/// Returns `PacketError::NullValue` for `None`, before any byte is appended.
impl<T: Packer> Packer for Option<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn pack(&self, writer: &mut PacketWriter) -> Result<()> {
        match self {
            Some(value) => value.pack(writer),
            None => Err(PacketError::NullValue),
        }
    }
}

impl<T: Unpacker> Unpacker for Option<T> {
    fn unpack(reader: &mut PacketReader) -> Result<Self> {
        T::unpack(reader).map(Some)
    }
}

// --- Pointers ---
macro_rules! impl_transparent {
    ($($wrapper:ident),*) => {
        $(
            impl<T: Packer> Packer for $wrapper<T> {
                fn shape() -> Shape {
                    T::shape()
                }

                fn pack(&self, writer: &mut PacketWriter) -> Result<()> {
                    (**self).pack(writer)
                }
            }

            impl<T: Unpacker> Unpacker for $wrapper<T> {
                fn unpack(reader: &mut PacketReader) -> Result<Self> {
                    T::unpack(reader).map($wrapper::new)
                }
            }
        )*
    };
}

impl_transparent!(Box, Arc, Rc);

/// References encode as the referenced value.
impl<T: Packer> Packer for &T {
    fn shape() -> Shape {
        T::shape()
    }

    fn pack(&self, writer: &mut PacketWriter) -> Result<()> {
        (*self).pack(writer)
    }
}
