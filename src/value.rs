//! Dynamically typed values, for callers that only know what they hold at runtime.
//!
//! Writing a [`Value`] produces exactly the bytes the equivalent typed value would. Reading needs
//! a [`Shape`] because the stream itself carries no type information.

use crate::*;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An absent value. Never encodable.
    Null,
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    Char(char),
    Text(String),
    Vector2(Vector2),
    Vector3(Vector3),
    Color(Color),
    Enum {
        type_name: String,
        value: i64,
    },
    Array(Vec<Value>),
    List(Vec<Value>),
    /// Entries in iteration order.
    Map(Vec<(Value, Value)>),
    /// Members in wire order.
    Composite {
        type_name: String,
        members: Vec<(String, Value)>,
    },
    /// A value handed over from outside that matches no category.
    Unsupported {
        type_name: String,
    },
}

impl Value {
    /// `None` for [`Value::Null`], which has no category of its own.
    pub fn category(&self) -> Option<Category> {
        let category = match self {
            Self::Null => return None,
            Self::Bool(_)
            | Self::U8(_)
            | Self::I8(_)
            | Self::U16(_)
            | Self::I16(_)
            | Self::U32(_)
            | Self::I32(_)
            | Self::U64(_)
            | Self::I64(_)
            | Self::F32(_)
            | Self::F64(_)
            | Self::Char(_)
            | Self::Text(_) => Category::Primitive,
            Self::Vector2(_) | Self::Vector3(_) | Self::Color(_) => Category::FixedVector,
            Self::Enum { .. } => Category::Enum,
            Self::Array(_) => Category::Array,
            Self::List(_) => Category::List,
            Self::Map(_) => Category::Map,
            Self::Composite { .. } => Category::Composite,
            Self::Unsupported { .. } => Category::Unsupported,
        };
        Some(category)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn enumeration(type_name: impl Into<String>, value: i64) -> Self {
        Self::Enum {
            type_name: type_name.into(),
            value,
        }
    }

    pub fn composite<N: Into<String>>(
        type_name: impl Into<String>,
        members: impl IntoIterator<Item = (N, Value)>,
    ) -> Self {
        Self::Composite {
            type_name: type_name.into(),
            members: members
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }

    /// Looks up a composite member by name.
    pub fn member(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Composite { members, .. } => members
                .iter()
                .find(|(member, _)| member == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
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
    char => Char,
    String => Text,
    Vector2 => Vector2,
    Vector3 => Vector3,
    Color => Color,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Encodes `value`, classifying it by variant.
pub(crate) fn encode(writer: &mut PacketWriter, value: &Value) -> Result<()> {
    match value {
        Value::Null => Err(PacketError::NullValue),
        Value::Bool(v) => v.pack(writer),
        Value::U8(v) => v.pack(writer),
        Value::I8(v) => v.pack(writer),
        Value::U16(v) => v.pack(writer),
        Value::I16(v) => v.pack(writer),
        Value::U32(v) => v.pack(writer),
        Value::I32(v) => v.pack(writer),
        Value::U64(v) => v.pack(writer),
        Value::I64(v) => v.pack(writer),
        Value::F32(v) => v.pack(writer),
        Value::F64(v) => v.pack(writer),
        Value::Char(v) => v.pack(writer),
        Value::Text(v) => primitives::write_text(writer, v),
        Value::Vector2(v) => v.pack(writer),
        Value::Vector3(v) => v.pack(writer),
        Value::Color(v) => v.pack(writer),
        Value::Enum { type_name, value } => {
            let byte = enums::narrow(type_name, *value)?;
            byte.pack(writer)
        }
        Value::Array(items) | Value::List(items) => writer.nested(|writer| {
            writer.put_len(items.len())?;
            for item in items {
                encode(writer, item)?;
            }
            Ok(())
        }),
        Value::Map(entries) => writer.nested(|writer| {
            writer.put_len(entries.len())?;
            for (key, value) in entries {
                encode(writer, key)?;
                encode(writer, value)?;
            }
            Ok(())
        }),
        Value::Composite { members, .. } => writer.nested(|writer| {
            for (_, member) in members {
                encode(writer, member)?;
            }
            Ok(())
        }),
        Value::Unsupported { type_name } => Err(PacketError::UnsupportedType {
            type_name: type_name.clone(),
        }),
    }
}

/// Decodes one value of the given shape.
pub(crate) fn decode(reader: &mut PacketReader, shape: &Shape) -> Result<Value> {
    match shape {
        Shape::Primitive(kind) => decode_primitive(reader, *kind),
        Shape::Vector(VectorKind::Vector2) => Vector2::unpack(reader).map(Value::Vector2),
        Shape::Vector(VectorKind::Vector3) => Vector3::unpack(reader).map(Value::Vector3),
        Shape::Vector(VectorKind::Color) => Color::unpack(reader).map(Value::Color),
        Shape::Enum { type_name } => Ok(Value::Enum {
            type_name: type_name.to_string(),
            value: i64::from(reader.take_u8()?),
        }),
        Shape::Array { element, len } => reader.nested(|reader| {
            let count = reader.read_len()?;
            if let Some(expected) = *len {
                if count != expected {
                    return Err(PacketError::LengthMismatch {
                        expected,
                        actual: count,
                    });
                }
            }
            decode_n(reader, element, count).map(Value::Array)
        }),
        Shape::List(element) => reader.nested(|reader| {
            let count = reader.read_len()?;
            decode_n(reader, element, count).map(Value::List)
        }),
        Shape::Map(key, value) => reader.nested(|reader| {
            let count = reader.read_len()?;
            let mut entries = Vec::with_capacity(reader.capacity_hint(count));
            for _ in 0..count {
                let k = decode(reader, key)?;
                let v = decode(reader, value)?;
                entries.push((k, v));
            }
            Ok(Value::Map(entries))
        }),
        Shape::Composite(composite) => {
            let layout = composite.members();
            reader.nested(|reader| {
                let mut members = Vec::with_capacity(layout.len());
                for member in &layout {
                    members.push((member.name.to_string(), decode(reader, &member.shape)?));
                }
                Ok(Value::Composite {
                    type_name: composite.type_name().to_string(),
                    members,
                })
            })
        }
    }
}

fn decode_n(reader: &mut PacketReader, element: &Shape, count: usize) -> Result<Vec<Value>> {
    let mut items = Vec::with_capacity(reader.capacity_hint(count));
    for _ in 0..count {
        items.push(decode(reader, element)?);
    }
    Ok(items)
}

fn decode_primitive(reader: &mut PacketReader, kind: PrimitiveKind) -> Result<Value> {
    let value = match kind {
        PrimitiveKind::Bool => Value::Bool(reader.read()?),
        PrimitiveKind::U8 => Value::U8(reader.read()?),
        PrimitiveKind::I8 => Value::I8(reader.read()?),
        PrimitiveKind::U16 => Value::U16(reader.read()?),
        PrimitiveKind::I16 => Value::I16(reader.read()?),
        PrimitiveKind::U32 => Value::U32(reader.read()?),
        PrimitiveKind::I32 => Value::I32(reader.read()?),
        PrimitiveKind::U64 => Value::U64(reader.read()?),
        PrimitiveKind::I64 => Value::I64(reader.read()?),
        PrimitiveKind::F32 => Value::F32(reader.read()?),
        PrimitiveKind::F64 => Value::F64(reader.read()?),
        PrimitiveKind::Char => Value::Char(reader.read()?),
        PrimitiveKind::Text => Value::Text(primitives::read_text(reader)?),
    };
    Ok(value)
}
