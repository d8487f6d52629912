#[cfg(feature = "ahash")]
use ahash::AHashMap;
#[cfg(feature = "indexmap")]
use indexmap::IndexMap;
#[cfg(feature = "smol_str")]
use smol_str::SmolStr;

#[allow(unused_imports)]
use crate::collections::{pack_entries, unpack_entries};
#[allow(unused_imports)]
use crate::*;

// --- IndexMap ---
/// Keeps insertion order, so a decoded map re-encodes to identical bytes.
#[cfg(feature = "indexmap")]
impl<K: Packer, V: Packer, S> Packer for IndexMap<K, V, S> {
    fn shape() -> Shape {
        Shape::map(K::shape(), V::shape())
    }

    fn pack(&self, writer: &mut PacketWriter) -> Result<()> {
        pack_entries(writer, self.len(), self)
    }
}
#[cfg(feature = "indexmap")]
impl<K, V, S> Unpacker for IndexMap<K, V, S>
where
    K: Unpacker + Eq + std::hash::Hash,
    V: Unpacker,
    S: std::hash::BuildHasher + Default,
{
    fn unpack(reader: &mut PacketReader) -> Result<Self> {
        Ok(unpack_entries::<K, V>(reader)?.into_iter().collect())
    }
}

// --- AHashMap ---
#[cfg(feature = "ahash")]
impl<K: Packer, V: Packer> Packer for AHashMap<K, V> {
    fn shape() -> Shape {
        Shape::map(K::shape(), V::shape())
    }

    fn pack(&self, writer: &mut PacketWriter) -> Result<()> {
        pack_entries(writer, self.len(), self.iter())
    }
}
#[cfg(feature = "ahash")]
impl<K: Unpacker + Eq + std::hash::Hash, V: Unpacker> Unpacker for AHashMap<K, V> {
    fn unpack(reader: &mut PacketReader) -> Result<Self> {
        Ok(unpack_entries::<K, V>(reader)?.into_iter().collect())
    }
}

// --- SmolStr ---
#[cfg(feature = "smol_str")]
impl Primitive for SmolStr {
    const KIND: PrimitiveKind = PrimitiveKind::Text;
}
#[cfg(feature = "smol_str")]
impl Packer for SmolStr {
    fn shape() -> Shape {
        Shape::Primitive(PrimitiveKind::Text)
    }

    fn pack(&self, writer: &mut PacketWriter) -> Result<()> {
        primitives::write_text(writer, self.as_str())
    }
}
#[cfg(feature = "smol_str")]
impl Unpacker for SmolStr {
    fn unpack(reader: &mut PacketReader) -> Result<Self> {
        primitives::read_text(reader).map(SmolStr::from)
    }
}
