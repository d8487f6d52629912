//! Arrays, lists and maps: a 4-byte count followed by the recursively encoded items.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::{BuildHasher, Hash};

use crate::*;

/// Writes `len` followed by every item, in iteration order.
///
/// # Errors
/// Returns `PacketError::LengthMismatch` if `items` does not yield exactly `len` items.
pub fn pack_items<'a, T, I>(writer: &mut PacketWriter, len: usize, items: I) -> Result<()>
where
    T: Packer + 'a,
    I: IntoIterator<Item = &'a T>,
{
    writer.nested(|writer| {
        writer.put_len(len)?;
        let mut written = 0;
        for item in items {
            item.pack(writer)?;
            written += 1;
        }
        check_written(len, written)
    })
}

/// Reads a count and that many items.
pub fn unpack_items<T: Unpacker>(reader: &mut PacketReader) -> Result<Vec<T>> {
    reader.nested(|reader| {
        let len = reader.read_len()?;
        read_n(reader, len)
    })
}

/// Writes `len` followed by every key/value pair, in iteration order.
pub fn pack_entries<'a, K, V, I>(writer: &mut PacketWriter, len: usize, entries: I) -> Result<()>
where
    K: Packer + 'a,
    V: Packer + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    writer.nested(|writer| {
        writer.put_len(len)?;
        let mut written = 0;
        for (key, value) in entries {
            key.pack(writer)?;
            value.pack(writer)?;
            written += 1;
        }
        check_written(len, written)
    })
}

/// The count prefix is written up front, so a sequence that lied about its size is an error.
fn check_written(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(PacketError::LengthMismatch { expected, actual });
    }
    Ok(())
}

/// Reads a count and that many key/value pairs, in stream order.
pub fn unpack_entries<K: Unpacker, V: Unpacker>(reader: &mut PacketReader) -> Result<Vec<(K, V)>> {
    reader.nested(|reader| {
        let len = reader.read_len()?;
        let mut entries = Vec::with_capacity(reader.capacity_hint(len));
        for _ in 0..len {
            let key = K::unpack(reader)?;
            let value = V::unpack(reader)?;
            entries.push((key, value));
        }
        Ok(entries)
    })
}

fn read_n<T: Unpacker>(reader: &mut PacketReader, len: usize) -> Result<Vec<T>> {
    let mut items = Vec::with_capacity(reader.capacity_hint(len));
    for _ in 0..len {
        items.push(T::unpack(reader)?);
    }
    Ok(items)
}

// --- Array ---
/// Encodes a fixed-size array as a count-prefixed sequence.
impl<T: Packer, const N: usize> Packer for [T; N] {
    fn shape() -> Shape {
        Shape::Array {
            element: Box::new(T::shape()),
            len: Some(N),
        }
    }

    fn pack(&self, writer: &mut PacketWriter) -> Result<()> {
        pack_items(writer, N, self)
    }
}

/// # Errors
/// Returns `PacketError::LengthMismatch` if the stored count is not `N`.
impl<T: Unpacker, const N: usize> Unpacker for [T; N] {
    fn unpack(reader: &mut PacketReader) -> Result<Self> {
        reader.nested(|reader| {
            let len = reader.read_len()?;
            if len != N {
                return Err(PacketError::LengthMismatch {
                    expected: N,
                    actual: len,
                });
            }
            read_n::<T>(reader, N)?
                .try_into()
                .map_err(|items: Vec<T>| PacketError::LengthMismatch {
                    expected: N,
                    actual: items.len(),
                })
        })
    }
}

/// Boxed slices carry their length at runtime, so any count is accepted on decode.
impl<T: Packer> Packer for Box<[T]> {
    fn shape() -> Shape {
        Shape::Array {
            element: Box::new(T::shape()),
            len: None,
        }
    }

    fn pack(&self, writer: &mut PacketWriter) -> Result<()> {
        pack_items(writer, self.len(), self.iter())
    }
}

impl<T: Unpacker> Unpacker for Box<[T]> {
    fn unpack(reader: &mut PacketReader) -> Result<Self> {
        unpack_items::<T>(reader).map(Vec::into_boxed_slice)
    }
}

// --- Lists ---
impl<T: Packer> Packer for Vec<T> {
    fn shape() -> Shape {
        Shape::list(T::shape())
    }

    fn pack(&self, writer: &mut PacketWriter) -> Result<()> {
        pack_items(writer, self.len(), self)
    }
}

impl<T: Unpacker> Unpacker for Vec<T> {
    fn unpack(reader: &mut PacketReader) -> Result<Self> {
        unpack_items(reader)
    }
}

impl<T: Packer> Packer for VecDeque<T> {
    fn shape() -> Shape {
        Shape::list(T::shape())
    }

    fn pack(&self, writer: &mut PacketWriter) -> Result<()> {
        pack_items(writer, self.len(), self)
    }
}

impl<T: Unpacker> Unpacker for VecDeque<T> {
    fn unpack(reader: &mut PacketReader) -> Result<Self> {
        unpack_items::<T>(reader).map(VecDeque::from)
    }
}

// --- Maps ---
/// Entries are written in the map's own iteration order. Re-encoding a decoded `HashMap` may
/// order them differently; use `BTreeMap` or `IndexMap` when byte-identical output matters.
impl<K: Packer, V: Packer, S> Packer for HashMap<K, V, S> {
    fn shape() -> Shape {
        Shape::map(K::shape(), V::shape())
    }

    fn pack(&self, writer: &mut PacketWriter) -> Result<()> {
        pack_entries(writer, self.len(), self)
    }
}

impl<K, V, S> Unpacker for HashMap<K, V, S>
where
    K: Unpacker + Eq + Hash,
    V: Unpacker,
    S: BuildHasher + Default,
{
    fn unpack(reader: &mut PacketReader) -> Result<Self> {
        Ok(unpack_entries::<K, V>(reader)?.into_iter().collect())
    }
}

impl<K: Packer, V: Packer> Packer for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::map(K::shape(), V::shape())
    }

    fn pack(&self, writer: &mut PacketWriter) -> Result<()> {
        pack_entries(writer, self.len(), self)
    }
}

impl<K: Unpacker + Ord, V: Unpacker> Unpacker for BTreeMap<K, V> {
    fn unpack(reader: &mut PacketReader) -> Result<Self> {
        Ok(unpack_entries::<K, V>(reader)?.into_iter().collect())
    }
}
