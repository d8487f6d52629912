//! Fixed-arity `f32` tuples: 2D/3D vectors and RGBA colors.
//!
//! Their arity is part of the type, so they are written as consecutive `f32` components with no
//! count in front.

use crate::*;

/// A vector type with a statically known number of `f32` components.
pub trait FixedVector: Packer + Unpacker {
    const KIND: VectorKind;
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<[f32; 2]> for Vector2 {
    fn from([x, y]: [f32; 2]) -> Self {
        Self::new(x, y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

/// RGBA color with `f32` channels, written in r, g, b, a order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

macro_rules! impl_fixed_vector {
    ($ty:ident => $kind:ident { $($component:ident),+ }) => {
        impl FixedVector for $ty {
            const KIND: VectorKind = VectorKind::$kind;
        }

        impl Packer for $ty {
            fn shape() -> Shape {
                Shape::Vector(VectorKind::$kind)
            }

            fn pack(&self, writer: &mut PacketWriter) -> Result<()> {
                $(self.$component.pack(writer)?;)+
                Ok(())
            }
        }

        impl Unpacker for $ty {
            fn unpack(reader: &mut PacketReader) -> Result<Self> {
                reader.ensure(VectorKind::$kind.arity() * 4)?;
                Ok(Self {
                    $($component: f32::unpack(reader)?,)+
                })
            }
        }
    };
}

impl_fixed_vector!(Vector2 => Vector2 { x, y });
impl_fixed_vector!(Vector3 => Vector3 { x, y, z });
impl_fixed_vector!(Color => Color { r, g, b, a });
