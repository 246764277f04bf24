//! Sequential big-endian primitive decode/encode over a byte buffer.
//!
//! The course container uses console byte order (big-endian) throughout.
//! [`ByteReader`] is a positioned reader that fails with
//! [`TrackError::Truncated`] instead of panicking when a record runs past the
//! end of the buffer, which is what lets the section codecs treat truncation
//! as a structural-corruption condition. [`ByteWriter`] is append-only over a
//! [`BytesMut`], with one random-access patch used to back-fill the total
//! file length in the header.

use bytes::{BufMut, BytesMut};

use crate::error::TrackError;
use crate::math::{Vec2, Vec3};

/// Positioned big-endian reader over a borrowed byte buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Wrap a buffer, starting at offset 0.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current absolute offset.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Total buffer length.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes left between the cursor and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Move the cursor to an absolute offset. The offset may equal the
    /// buffer length (cursor at end); anything past that is rejected.
    pub fn seek(&mut self, pos: usize) -> Result<(), TrackError> {
        if pos > self.buf.len() {
            return Err(TrackError::Truncated {
                offset: pos,
                needed: 0,
                len: self.buf.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Advance the cursor by `n` bytes without decoding them.
    pub fn skip(&mut self, n: usize) -> Result<(), TrackError> {
        self.take(n).map(|_| ())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], TrackError> {
        if self.remaining() < n {
            return Err(TrackError::Truncated {
                offset: self.pos,
                needed: n,
                len: self.buf.len(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8, TrackError> {
        Ok(self.take(1)?[0])
    }

    /// Read a big-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16, TrackError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Read a big-endian `i16`.
    pub fn read_i16(&mut self) -> Result<i16, TrackError> {
        let b = self.take(2)?;
        Ok(i16::from_be_bytes([b[0], b[1]]))
    }

    /// Read a big-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32, TrackError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a big-endian IEEE-754 `f32`.
    pub fn read_f32(&mut self) -> Result<f32, TrackError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Read a 4-byte tag (file or section magic).
    pub fn read_magic(&mut self) -> Result<[u8; 4], TrackError> {
        let b = self.take(4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    /// Read three consecutive `f32`s as a [`Vec3`].
    pub fn read_vec3(&mut self) -> Result<Vec3, TrackError> {
        Ok(Vec3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    /// Read two consecutive `f32`s as a ground-plane [`Vec2`].
    pub fn read_vec2(&mut self) -> Result<Vec2, TrackError> {
        Ok(Vec2::new(self.read_f32()?, self.read_f32()?))
    }
}

/// Append-only big-endian writer.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: BytesMut,
}

impl ByteWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Write one byte.
    pub fn put_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    /// Write a big-endian `u16`.
    pub fn put_u16(&mut self, v: u16) {
        self.buf.put_u16(v);
    }

    /// Write a big-endian `i16`.
    pub fn put_i16(&mut self, v: i16) {
        self.buf.put_i16(v);
    }

    /// Write a big-endian `u32`.
    pub fn put_u32(&mut self, v: u32) {
        self.buf.put_u32(v);
    }

    /// Write a big-endian IEEE-754 `f32`.
    pub fn put_f32(&mut self, v: f32) {
        self.buf.put_u32(v.to_bits());
    }

    /// Write a 4-byte tag.
    pub fn put_magic(&mut self, magic: [u8; 4]) {
        self.buf.put_slice(&magic);
    }

    /// Append raw bytes (used to join an independently written body onto a
    /// header).
    pub fn put_slice(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Write a [`Vec3`] as three `f32`s.
    pub fn put_vec3(&mut self, v: Vec3) {
        self.put_f32(v.x);
        self.put_f32(v.y);
        self.put_f32(v.z);
    }

    /// Write a [`Vec2`] as two `f32`s.
    pub fn put_vec2(&mut self, v: Vec2) {
        self.put_f32(v.x);
        self.put_f32(v.z);
    }

    /// Overwrite a previously written big-endian `u32` at `offset`.
    /// Used to back-fill the header's total-length field after the body is
    /// known. Panics on an out-of-range offset; callers patch only offsets
    /// they have already written.
    pub fn patch_u32(&mut self, offset: usize, v: u32) {
        self.buf[offset..offset + 4].copy_from_slice(&v.to_be_bytes());
    }

    /// Finish and take the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.freeze().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_round_trip() {
        let mut w = ByteWriter::new();
        w.put_u8(0xab);
        w.put_u16(0x1234);
        w.put_i16(-5);
        w.put_u32(0xdead_beef);
        w.put_f32(3.5);
        w.put_vec3(Vec3::new(1.0, -2.0, 0.25));
        let bytes = w.into_bytes();

        let mut r = ByteReader::new(&bytes);
        assert_eq!(r.read_u8().unwrap(), 0xab);
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.read_i16().unwrap(), -5);
        assert_eq!(r.read_u32().unwrap(), 0xdead_beef);
        assert_eq!(r.read_f32().unwrap(), 3.5);
        assert_eq!(r.read_vec3().unwrap(), Vec3::new(1.0, -2.0, 0.25));
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn big_endian_layout() {
        let mut w = ByteWriter::new();
        w.put_u16(0x0102);
        w.put_u32(0x0304_0506);
        assert_eq!(w.into_bytes(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn truncated_read_reports_offsets() {
        let mut r = ByteReader::new(&[0x00, 0x01, 0x02]);
        r.read_u16().unwrap();
        let err = r.read_u32().unwrap_err();
        assert_eq!(
            err,
            TrackError::Truncated {
                offset: 2,
                needed: 4,
                len: 3
            }
        );
        // The failed read must not have moved the cursor.
        assert_eq!(r.pos(), 2);
        assert_eq!(r.read_u8().unwrap(), 0x02);
    }

    #[test]
    fn seek_bounds() {
        let mut r = ByteReader::new(&[0u8; 4]);
        r.seek(4).unwrap();
        assert_eq!(r.remaining(), 0);
        assert!(r.seek(5).is_err());
    }

    #[test]
    fn patch_u32_overwrites_in_place() {
        let mut w = ByteWriter::new();
        w.put_magic(*b"RKTD");
        w.put_u32(0);
        w.put_u16(7);
        w.patch_u32(4, 0x11_22_33_44);
        let bytes = w.into_bytes();
        assert_eq!(&bytes[4..8], &[0x11, 0x22, 0x33, 0x44]);
        assert_eq!(&bytes[0..4], b"RKTD");
    }
}
