//! Byte sink and byte cursor owned by a single write or read operation.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{PacketError, Result};

/// Nesting bound of [`Limits::strict`].
pub const STRICT_MAX_DEPTH: usize = 64;
/// Element count and text byte length bound of [`Limits::strict`].
pub const STRICT_MAX_LEN: usize = 16 * 1024 * 1024;

/// Bounds applied while writing or reading a packet.
///
/// The default is unbounded: nesting is limited only by the host stack and lengths only by the
/// u32 count prefix, so everything a default writer produces a default reader accepts. Readers
/// facing untrusted input opt in with [`Limits::strict`] or their own values. Counts and text
/// lengths above `max_len` are then rejected before anything is allocated, and containers nested
/// deeper than `max_depth` fail instead of recursing further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_depth: usize,
    pub max_len: usize,
}

impl Limits {
    pub const UNBOUNDED: Self = Self {
        max_depth: usize::MAX,
        max_len: u32::MAX as usize,
    };

    /// 64 levels of nesting and 16 Mi elements or bytes per length.
    pub const fn strict() -> Self {
        Self {
            max_depth: STRICT_MAX_DEPTH,
            max_len: STRICT_MAX_LEN,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// Growable, append-only byte sink for one encode operation.
#[derive(Debug, Default)]
pub struct PacketWriter {
    buf: BytesMut,
    depth: usize,
    limits: Limits,
}

impl PacketWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Raw access for `Packer` implementations that emit fixed-width data.
    pub fn buf_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }

    /// Writes a 4-byte little-endian element count.
    pub fn put_len(&mut self, len: usize) -> Result<()> {
        let limit = self.limits.max_len.min(u32::MAX as usize);
        if len > limit {
            return Err(PacketError::LengthLimit { len, limit });
        }
        self.buf.put_u32_le(len as u32);
        Ok(())
    }

    /// Writes a 7-bit variable-length unsigned integer (low groups first, high bit = continue).
    pub fn put_varint(&mut self, mut value: u32) {
        while value >= 0x80 {
            self.buf.put_u8((value as u8) | 0x80);
            value >>= 7;
        }
        self.buf.put_u8(value as u8);
    }

    /// Runs `op` one nesting level deeper.
    pub fn nested<R>(&mut self, op: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        if self.depth >= self.limits.max_depth {
            tracing::debug!(limit = self.limits.max_depth, "packet nesting limit hit");
            return Err(PacketError::DepthLimit {
                limit: self.limits.max_depth,
            });
        }
        self.depth += 1;
        let result = op(self);
        self.depth -= 1;
        result
    }

    /// Runs `op` and, if it fails, drops everything it appended.
    pub(crate) fn guarded(&mut self, op: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        let mark = self.buf.len();
        let result = op(self);
        if let Err(error) = &result {
            tracing::trace!(
                discarded = self.buf.len() - mark,
                %error,
                "packet write failed, buffer rolled back"
            );
            self.buf.truncate(mark);
        }
        result
    }
}

/// Forward-only cursor over the bytes of one decode operation.
#[derive(Debug, Clone, Default)]
pub struct PacketReader {
    buf: Bytes,
    depth: usize,
    limits: Limits,
}

impl PacketReader {
    pub fn new(buf: impl Into<Bytes>) -> Self {
        Self {
            buf: buf.into(),
            ..Self::default()
        }
    }

    pub fn with_limits(buf: impl Into<Bytes>, limits: Limits) -> Self {
        Self {
            buf: buf.into(),
            limits,
            depth: 0,
        }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The unread tail.
    pub fn into_remaining(self) -> Bytes {
        self.buf
    }

    /// Fails unless at least `needed` bytes are left.
    pub fn ensure(&self, needed: usize) -> Result<()> {
        let remaining = self.buf.remaining();
        if remaining < needed {
            return Err(PacketError::UnexpectedEnd { needed, remaining });
        }
        Ok(())
    }

    /// Consumes exactly `N` bytes.
    pub fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        self.buf.copy_to_slice(&mut out);
        Ok(out)
    }

    pub fn take_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    /// Consumes `len` bytes without copying them.
    pub fn take_bytes(&mut self, len: usize) -> Result<Bytes> {
        self.ensure(len)?;
        Ok(self.buf.split_to(len))
    }

    /// Reads a 4-byte little-endian element count and checks it against the limits.
    pub fn read_len(&mut self) -> Result<usize> {
        let len = u32::from_le_bytes(self.take()?) as usize;
        self.check_len(len)?;
        Ok(len)
    }

    /// Reads a value written by [`PacketWriter::put_varint`].
    pub fn read_varint(&mut self) -> Result<u32> {
        let mut value = 0u32;
        let mut shift = 0;
        loop {
            let byte = self.take_u8()?;
            // fifth byte may only carry the top 4 bits
            if shift == 28 && byte > 0x0F {
                return Err(PacketError::InvalidData(
                    "7-bit encoded length overflows 32 bits".to_string(),
                ));
            }
            value |= u32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    pub fn check_len(&self, len: usize) -> Result<()> {
        if len > self.limits.max_len {
            tracing::debug!(len, limit = self.limits.max_len, "packet length limit hit");
            return Err(PacketError::LengthLimit {
                len,
                limit: self.limits.max_len,
            });
        }
        Ok(())
    }

    /// Preallocation size for `len` upcoming elements; never more than the bytes left.
    pub fn capacity_hint(&self, len: usize) -> usize {
        len.min(self.buf.remaining())
    }

    /// Runs `op` one nesting level deeper.
    pub fn nested<R>(&mut self, op: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        if self.depth >= self.limits.max_depth {
            tracing::debug!(limit = self.limits.max_depth, "packet nesting limit hit");
            return Err(PacketError::DepthLimit {
                limit: self.limits.max_depth,
            });
        }
        self.depth += 1;
        let result = op(self);
        self.depth -= 1;
        result
    }
}
