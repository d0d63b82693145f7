//! Growable byte buffer with fallible allocation.
use crate::{
    constants::MIN_BUFFER_CAPACITY,
    error::{EncodeError, KfuzzResult},
    layout::round_up,
    source::ByteSource,
};

/// Append-only byte buffer.
///
/// Capacity doubles whenever it runs out, and every allocation is
/// checked so that running out of memory is reported as an error
/// instead of aborting the process.
#[derive(Debug, Default)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> KfuzzResult<Self> {
        let mut buf = Self::new();
        buf.reserve(capacity)?;
        Ok(buf)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.bytes
    }

    /// Make room for `additional` more bytes.
    fn reserve(&mut self, additional: usize) -> KfuzzResult<()> {
        let required = self
            .bytes
            .len()
            .checked_add(additional)
            .ok_or(EncodeError::Overflow("buffer length"))?;

        if required <= self.bytes.capacity() {
            return Ok(());
        }

        let mut capacity = self.bytes.capacity().max(MIN_BUFFER_CAPACITY);
        while capacity < required {
            capacity = capacity.checked_mul(2).unwrap_or(required);
        }

        self.bytes.try_reserve_exact(capacity - self.bytes.len())?;
        Ok(())
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) -> KfuzzResult<()> {
        self.reserve(bytes.len())?;
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    pub fn push_zeros(&mut self, count: usize) -> KfuzzResult<()> {
        self.reserve(count)?;
        self.bytes.resize(self.bytes.len() + count, 0);
        Ok(())
    }

    #[inline]
    pub fn push_u32_le(&mut self, value: u32) -> KfuzzResult<()> {
        self.push_bytes(&value.to_le_bytes())
    }

    #[inline]
    pub fn push_u64_le(&mut self, value: u64) -> KfuzzResult<()> {
        self.push_bytes(&value.to_le_bytes())
    }

    /// Zero pad until the length is a multiple of `alignment`.
    ///
    /// Returns the number of padding bytes added.
    pub fn align_to(&mut self, alignment: u64) -> KfuzzResult<usize> {
        let len = self.bytes.len() as u64;
        let padding = (round_up(len, alignment) - len) as usize;
        self.push_zeros(padding)?;
        Ok(padding)
    }

    /// Append `count` bytes pulled from the byte source.
    pub fn push_from<S: ByteSource>(&mut self, source: &mut S, count: usize) -> KfuzzResult<()> {
        self.reserve(count)?;

        let start = self.bytes.len();
        self.bytes.resize(start + count, 0);
        source.fill(&mut self.bytes[start..])?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::source::SeedSlice;

    #[test]
    fn test_capacity_doubles() {
        let mut buf = ByteBuffer::new();
        buf.push_bytes(&[1]).unwrap();
        assert_eq!(buf.capacity(), 8);

        buf.push_zeros(8).unwrap();
        assert_eq!(buf.capacity(), 16);

        buf.push_zeros(40).unwrap();
        assert_eq!(buf.capacity(), 64);
        assert_eq!(buf.len(), 49);
    }

    #[test]
    fn test_align_to() {
        let mut buf = ByteBuffer::new();
        buf.push_bytes(&[0xAA; 3]).unwrap();

        assert_eq!(buf.align_to(4).unwrap(), 1);
        assert_eq!(buf.align_to(4).unwrap(), 0);
        assert_eq!(buf.align_to(8).unwrap(), 4);
        assert_eq!(buf.as_slice(), &[0xAA, 0xAA, 0xAA, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_little_endian() {
        let mut buf = ByteBuffer::new();
        buf.push_u32_le(0x000B_FACE).unwrap();
        buf.push_u64_le(u64::MAX).unwrap();
        assert_eq!(buf.as_slice()[..4], [0xCE, 0xFA, 0x0B, 0x00]);
        assert!(buf.as_slice()[4..].iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn test_push_from_source() {
        let seed = [1, 2, 3];
        let mut source = SeedSlice::new(&seed).unwrap();
        let mut buf = ByteBuffer::new();
        buf.push_from(&mut source, 5).unwrap();
        assert_eq!(buf.into_inner(), vec![1, 2, 3, 1, 2]);
    }

    #[test]
    fn test_out_of_memory() {
        let mut buf = ByteBuffer::new();
        let err = buf.push_zeros(usize::MAX / 2).unwrap_err();
        assert!(matches!(
            err,
            crate::error::KfuzzError::Encode(EncodeError::OutOfMemory(_))
        ));
    }
}
