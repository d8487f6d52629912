//! Entry points: the generic `write`/`read`, one typed pair per category, and the dynamic pair.
//!
//! Every `write*` call is all-or-nothing: on failure the writer is truncated back to where the
//! call started. Reads only ever move forward.

use crate::composite::{pack_composite, unpack_composite};
use crate::enums::{pack_enum, unpack_enum};
use crate::*;

impl PacketWriter {
    /// Appends the encoding of `value`.
    ///
    /// # Errors
    /// `PacketError::NullValue` if `value` (or something inside it) is `None`; other errors as
    /// raised by the value's category.
    pub fn write<T: Packer>(&mut self, value: &T) -> Result<()> {
        self.guarded(|writer| value.pack(writer))
    }

    /// Appends the encoding of a dynamically typed value.
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        self.guarded(|writer| crate::value::encode(writer, value))
    }

    pub fn write_primitive<P: Primitive>(&mut self, value: &P) -> Result<()> {
        self.write(value)
    }

    pub fn write_vector<V: FixedVector>(&mut self, value: &V) -> Result<()> {
        self.write(value)
    }

    pub fn write_enum<E: PacketEnum>(&mut self, value: &E) -> Result<()> {
        self.guarded(|writer| pack_enum(value, writer))
    }

    pub fn write_array<T: Packer>(&mut self, items: &[T]) -> Result<()> {
        self.guarded(|writer| collections::pack_items(writer, items.len(), items))
    }

    /// Writes any sized sequence as a list, in iteration order.
    pub fn write_list<'a, T, I>(&mut self, items: I) -> Result<()>
    where
        T: Packer + 'a,
        I: IntoIterator<Item = &'a T>,
        I::IntoIter: ExactSizeIterator,
    {
        let items = items.into_iter();
        self.guarded(|writer| collections::pack_items(writer, items.len(), items))
    }

    /// Writes any sized sequence of pairs as a map, in iteration order.
    pub fn write_map<'a, K, V, I>(&mut self, entries: I) -> Result<()>
    where
        K: Packer + 'a,
        V: Packer + 'a,
        I: IntoIterator<Item = (&'a K, &'a V)>,
        I::IntoIter: ExactSizeIterator,
    {
        let entries = entries.into_iter();
        self.guarded(|writer| collections::pack_entries(writer, entries.len(), entries))
    }

    pub fn write_composite<C: Composite>(&mut self, value: &C) -> Result<()> {
        self.guarded(|writer| pack_composite(value, writer))
    }
}

impl PacketReader {
    /// Consumes one value of type `T`.
    ///
    /// # Errors
    /// `PacketError::UnexpectedEnd` if the input is truncated.
    pub fn read<T: Unpacker>(&mut self) -> Result<T> {
        T::unpack(self)
    }

    /// Consumes one value of the given shape.
    pub fn read_value(&mut self, shape: &Shape) -> Result<Value> {
        crate::value::decode(self, shape)
    }

    pub fn read_primitive<P: Primitive>(&mut self) -> Result<P> {
        self.read()
    }

    pub fn read_vector<V: FixedVector>(&mut self) -> Result<V> {
        self.read()
    }

    pub fn read_enum<E: PacketEnum>(&mut self) -> Result<E> {
        unpack_enum(self)
    }

    /// Reads an array of any length.
    pub fn read_array<T: Unpacker>(&mut self) -> Result<Vec<T>> {
        collections::unpack_items(self)
    }

    pub fn read_list<T: Unpacker>(&mut self) -> Result<Vec<T>> {
        collections::unpack_items(self)
    }

    /// Reads a map into any collection of pairs, keeping stream order.
    pub fn read_map<K, V, M>(&mut self) -> Result<M>
    where
        K: Unpacker,
        V: Unpacker,
        M: FromIterator<(K, V)>,
    {
        Ok(collections::unpack_entries::<K, V>(self)?.into_iter().collect())
    }

    pub fn read_composite<C: Composite + Default>(&mut self) -> Result<C> {
        unpack_composite(self)
    }
}
