//! The closed set of categories a packable type can fall into.
//!
//! A [`Shape`] is what a reader needs to know to decode a value without any type information in
//! the stream. Typed code gets it from [`Packer::shape`](crate::Packer::shape); dynamic callers
//! build it by hand or reuse a typed one.

use std::fmt;

use crate::composite::MemberKind;

/// Fixed-width scalars and text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    /// UTF-8 encoded, 1 to 4 bytes.
    Char,
    /// 7-bit encoded byte length followed by UTF-8.
    Text,
}

impl PrimitiveKind {
    /// Encoded size in bytes, or `None` for the variable-width kinds.
    pub const fn width(self) -> Option<usize> {
        match self {
            Self::Bool | Self::U8 | Self::I8 => Some(1),
            Self::U16 | Self::I16 => Some(2),
            Self::U32 | Self::I32 | Self::F32 => Some(4),
            Self::U64 | Self::I64 | Self::F64 => Some(8),
            Self::Char | Self::Text => None,
        }
    }
}

/// Small fixed-arity `f32` tuples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorKind {
    Vector2,
    Vector3,
    Color,
}

impl VectorKind {
    /// Number of `f32` components on the wire.
    pub const fn arity(self) -> usize {
        match self {
            Self::Vector2 => 2,
            Self::Vector3 => 3,
            Self::Color => 4,
        }
    }
}

/// Coarse classification, in the order the dispatcher tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Primitive,
    FixedVector,
    Enum,
    Array,
    List,
    Map,
    Composite,
    Unsupported,
}

/// Full description of how a type is laid out on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Primitive(PrimitiveKind),
    Vector(VectorKind),
    Enum {
        type_name: &'static str,
    },
    /// `len` is `Some` when the array length is part of the type.
    Array {
        element: Box<Shape>,
        len: Option<usize>,
    },
    List(Box<Shape>),
    Map(Box<Shape>, Box<Shape>),
    Composite(CompositeShape),
}

impl Shape {
    pub fn category(&self) -> Category {
        match self {
            Self::Primitive(_) => Category::Primitive,
            Self::Vector(_) => Category::FixedVector,
            Self::Enum { .. } => Category::Enum,
            Self::Array { .. } => Category::Array,
            Self::List(_) => Category::List,
            Self::Map(..) => Category::Map,
            Self::Composite(_) => Category::Composite,
        }
    }

    pub fn list(element: Shape) -> Self {
        Self::List(Box::new(element))
    }

    pub fn map(key: Shape, value: Shape) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }
}

/// Shape of a composite type.
///
/// Members are resolved on demand so that a type may contain lists or maps of itself.
#[derive(Clone, Copy)]
pub struct CompositeShape {
    type_name: &'static str,
    members: fn() -> Vec<MemberShape>,
}

impl CompositeShape {
    pub fn new(type_name: &'static str, members: fn() -> Vec<MemberShape>) -> Self {
        Self { type_name, members }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Non-excluded members in wire order.
    pub fn members(&self) -> Vec<MemberShape> {
        (self.members)()
    }
}

impl fmt::Debug for CompositeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CompositeShape")
            .field(&self.type_name)
            .finish()
    }
}

impl PartialEq for CompositeShape {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
    }
}

/// One wire-visible member of a composite.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberShape {
    pub name: &'static str,
    pub kind: MemberKind,
    pub ordinal: u32,
    pub shape: Shape,
}
