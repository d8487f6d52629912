//! Structured records encoded member by member, driven by a per-type descriptor.
//!
//! A [`TypeDescriptor`] lists a type's wire-visible members in a fixed order: every field by
//! declaration position, then every property by declaration position. Excluded members are kept
//! aside and never touch the stream. Descriptors are built once per type by
//! [`Composite::describe`] and then served from a [`DescriptorCache`].

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::*;

/// Whether a member is a stored field or a getter/setter property.
///
/// Fields sort before properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemberKind {
    Field,
    Property,
}

pub type EncodeFn<T> = fn(&T, &mut PacketWriter) -> Result<()>;
pub type DecodeFn<T> = fn(&mut T, &mut PacketReader) -> Result<()>;

/// Accessors for one wire-visible member of `T`.
pub struct MemberCodec<T> {
    /// Shape of the member's declared type.
    pub shape: fn() -> Shape,
    /// Reads the member off an instance and writes it.
    pub encode: EncodeFn<T>,
    /// Reads a value of the member's type and assigns it into an instance.
    pub decode: DecodeFn<T>,
}

impl<T> Clone for MemberCodec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MemberCodec<T> {}

/// One member of a composite type.
pub struct FieldDescriptor<T> {
    name: &'static str,
    type_name: &'static str,
    kind: MemberKind,
    ordinal: u32,
    codec: Option<MemberCodec<T>>,
}

impl<T> FieldDescriptor<T> {
    pub fn included(
        kind: MemberKind,
        ordinal: u32,
        name: &'static str,
        type_name: &'static str,
        codec: MemberCodec<T>,
    ) -> Self {
        Self {
            name,
            type_name,
            kind,
            ordinal,
            codec: Some(codec),
        }
    }

    /// A member carrying the exclusion marker. It has no accessors at all.
    pub fn excluded(kind: MemberKind, ordinal: u32, name: &'static str, type_name: &'static str) -> Self {
        Self {
            name,
            type_name,
            kind,
            ordinal,
            codec: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    pub fn is_excluded(&self) -> bool {
        self.codec.is_none()
    }

    pub fn shape(&self) -> Option<Shape> {
        self.codec.map(|codec| (codec.shape)())
    }

    pub fn encode(&self, value: &T, writer: &mut PacketWriter) -> Result<()> {
        match &self.codec {
            Some(codec) => (codec.encode)(value, writer),
            None => Ok(()),
        }
    }

    pub fn decode(&self, target: &mut T, reader: &mut PacketReader) -> Result<()> {
        match &self.codec {
            Some(codec) => (codec.decode)(target, reader),
            None => Ok(()),
        }
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .field("ordinal", &self.ordinal)
            .field("excluded", &self.is_excluded())
            .finish()
    }
}

/// The wire layout of a composite type.
pub struct TypeDescriptor<T> {
    type_name: &'static str,
    members: Vec<FieldDescriptor<T>>,
    excluded: Vec<FieldDescriptor<T>>,
}

impl<T> TypeDescriptor<T> {
    /// Splits off excluded members and orders the rest: fields, then properties, each by ordinal.
    pub fn new(type_name: &'static str, declared: Vec<FieldDescriptor<T>>) -> Self {
        let (mut members, excluded): (Vec<_>, Vec<_>) =
            declared.into_iter().partition(|member| !member.is_excluded());
        members.sort_by_key(|member| (member.kind, member.ordinal));
        Self {
            type_name,
            members,
            excluded,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Wire-visible members in wire order.
    pub fn members(&self) -> &[FieldDescriptor<T>] {
        &self.members
    }

    pub fn excluded(&self) -> &[FieldDescriptor<T>] {
        &self.excluded
    }

    pub fn member_shapes(&self) -> Vec<MemberShape> {
        self.members
            .iter()
            .filter_map(|member| {
                member.shape().map(|shape| MemberShape {
                    name: member.name,
                    kind: member.kind,
                    ordinal: member.ordinal,
                    shape,
                })
            })
            .collect()
    }

    pub fn encode(&self, value: &T, writer: &mut PacketWriter) -> Result<()> {
        for member in &self.members {
            member.encode(value, writer)?;
        }
        Ok(())
    }

    pub fn decode_into(&self, target: &mut T, reader: &mut PacketReader) -> Result<()> {
        for member in &self.members {
            member.decode(target, reader)?;
        }
        Ok(())
    }
}

impl<T> fmt::Debug for TypeDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("members", &self.members)
            .field("excluded", &self.excluded)
            .finish()
    }
}

/// A structured record whose layout is given by a [`TypeDescriptor`].
///
/// Implemented by `#[derive(Packet)]` on structs.
pub trait Composite: Sized + 'static {
    /// Builds the descriptor from scratch. Normally only reached through the cache.
    fn describe() -> TypeDescriptor<Self>;

    /// The cached descriptor.
    fn descriptor() -> Arc<TypeDescriptor<Self>> {
        DescriptorCache::global().get_or_describe::<Self>()
    }
}

pub fn composite_shape<T: Composite>() -> Shape {
    Shape::Composite(CompositeShape::new(std::any::type_name::<T>(), member_shapes::<T>))
}

fn member_shapes<T: Composite>() -> Vec<MemberShape> {
    T::descriptor().member_shapes()
}

pub fn pack_composite<T: Composite>(value: &T, writer: &mut PacketWriter) -> Result<()> {
    let descriptor = T::descriptor();
    writer.nested(|writer| descriptor.encode(value, writer))
}

/// Starts from `T::default()` so excluded members keep their default value.
pub fn unpack_composite<T: Composite + Default>(reader: &mut PacketReader) -> Result<T> {
    let descriptor = T::descriptor();
    reader.nested(|reader| {
        let mut target = T::default();
        descriptor.decode_into(&mut target, reader)?;
        Ok(target)
    })
}

type Entry = Arc<dyn Any + Send + Sync>;

/// Populate-once, read-many store of descriptors keyed by type.
///
/// Descriptors are built outside the lock; when two threads race on the same type the first
/// insert wins and both get the same `Arc`.
#[derive(Default)]
pub struct DescriptorCache {
    entries: RwLock<HashMap<TypeId, Entry>>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by [`Composite::descriptor`].
    pub fn global() -> &'static DescriptorCache {
        static GLOBAL: OnceLock<DescriptorCache> = OnceLock::new();
        GLOBAL.get_or_init(DescriptorCache::new)
    }

    pub fn get_or_describe<T: Composite>(&self) -> Arc<TypeDescriptor<T>> {
        if let Some(found) = self.get::<T>() {
            return found;
        }

        let computed = Arc::new(T::describe());
        let entry = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            entries
                .entry(TypeId::of::<T>())
                .or_insert_with(|| {
                    tracing::debug!(
                        type_name = computed.type_name(),
                        members = computed.members().len(),
                        excluded = computed.excluded().len(),
                        "cached composite descriptor"
                    );
                    computed.clone() as Entry
                })
                .clone()
        };
        entry.downcast::<TypeDescriptor<T>>().unwrap_or(computed)
    }

    pub fn get<T: Composite>(&self) -> Option<Arc<TypeDescriptor<T>>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|entry| entry.downcast::<TypeDescriptor<T>>().ok())
    }

    pub fn contains<T: Composite>(&self) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for DescriptorCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorCache")
            .field("len", &self.len())
            .finish()
    }
}
