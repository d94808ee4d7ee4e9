//! Byte-level readers and the matching writer.
//!
//! [`ByteView`] reads at explicit offsets and never moves. [`Cursor`] wraps a
//! view with a position and consumes as it reads. Both fail with
//! [`DecodeError::OutOfBounds`] instead of panicking on short input.

use glam::{Quat, Vec2, Vec3};

use crate::error::{DecodeError, DecodeResult};

/// Byte order for multi-byte reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

/// Size of a checksummed string header (checksum word + length word).
pub const STRING_HEADER_LEN: usize = 8;

/// Convert a 16-bit normalized value to a float in `[0, 2]`.
///
/// This is the format's own fixed-point encoding, not IEEE half precision.
#[must_use]
pub fn unorm16(value: u16) -> f32 {
    f32::from(value) / f32::from(u16::MAX) * 2.0
}

/// Offset-addressed reads over a byte slice.
#[derive(Debug, Clone, Copy)]
pub struct ByteView<'a> {
    data: &'a [u8],
    endian: Endian,
}

impl<'a> ByteView<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            endian: Endian::Little,
        }
    }

    #[must_use]
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    #[must_use]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The underlying bytes.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Borrow `n` bytes starting at `offset`.
    pub fn bytes_at(&self, offset: usize, n: usize) -> DecodeResult<&'a [u8]> {
        match offset.checked_add(n) {
            Some(end) if end <= self.data.len() => Ok(&self.data[offset..end]),
            _ => Err(DecodeError::OutOfBounds {
                offset,
                need: n,
                have: self.data.len().saturating_sub(offset),
            }),
        }
    }

    fn array_at<const N: usize>(&self, offset: usize) -> DecodeResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes_at(offset, N)?);
        Ok(out)
    }

    pub fn u8_at(&self, offset: usize) -> DecodeResult<u8> {
        Ok(self.bytes_at(offset, 1)?[0])
    }

    pub fn u16_at(&self, offset: usize) -> DecodeResult<u16> {
        let bytes = self.array_at::<2>(offset)?;
        Ok(match self.endian {
            Endian::Little => u16::from_le_bytes(bytes),
            Endian::Big => u16::from_be_bytes(bytes),
        })
    }

    pub fn u32_at(&self, offset: usize) -> DecodeResult<u32> {
        let bytes = self.array_at::<4>(offset)?;
        Ok(match self.endian {
            Endian::Little => u32::from_le_bytes(bytes),
            Endian::Big => u32::from_be_bytes(bytes),
        })
    }

    pub fn f32_at(&self, offset: usize) -> DecodeResult<f32> {
        Ok(f32::from_bits(self.u32_at(offset)?))
    }

    /// Read a 16-bit normalized value (see [`unorm16`]).
    pub fn unorm16_at(&self, offset: usize) -> DecodeResult<f32> {
        Ok(unorm16(self.u16_at(offset)?))
    }

    pub fn vec3_at(&self, offset: usize) -> DecodeResult<Vec3> {
        Ok(Vec3::new(
            self.f32_at(offset)?,
            self.f32_at(offset + 4)?,
            self.f32_at(offset + 8)?,
        ))
    }

    /// Read a quaternion stored as `x, y, z, w`. The value is not normalized.
    pub fn quat_at(&self, offset: usize) -> DecodeResult<Quat> {
        Ok(Quat::from_xyzw(
            self.f32_at(offset)?,
            self.f32_at(offset + 4)?,
            self.f32_at(offset + 8)?,
            self.f32_at(offset + 12)?,
        ))
    }

    /// Read a length-prefixed string at `offset`.
    ///
    /// With `checksum` the string is preceded by a word that must equal
    /// `length + 8`; otherwise [`DecodeError::InvalidString`] is returned.
    pub fn string_at(&self, offset: usize, checksum: bool) -> DecodeResult<String> {
        let mut text_offset = offset;
        let mut check = None;
        if checksum {
            check = Some(self.u32_at(text_offset)?);
            text_offset += 4;
        }
        let length = self.u32_at(text_offset)?;
        text_offset += 4;

        if let Some(check) = check {
            if u64::from(check) != u64::from(length) + STRING_HEADER_LEN as u64 {
                return Err(DecodeError::InvalidString {
                    offset,
                    checksum: check,
                    length,
                });
            }
        }

        let bytes = self.bytes_at(text_offset, length as usize)?;
        decode_text(bytes, offset)
    }
}

/// Decode UTF-8 text and strip the NUL/newline padding names carry.
fn decode_text(bytes: &[u8], offset: usize) -> DecodeResult<String> {
    let text = String::from_utf8(bytes.to_vec())
        .map_err(|source| DecodeError::InvalidEncoding { offset, source })?;
    let trimmed = text.trim_matches(|c: char| c == '\0' || c == '\n');
    if trimmed.len() == text.len() {
        Ok(text)
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Sequential reader over a byte slice.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    view: ByteView<'a>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            view: ByteView::new(data),
            pos: 0,
        }
    }

    #[must_use]
    pub fn with_endian(data: &'a [u8], endian: Endian) -> Self {
        Self {
            view: ByteView::new(data).with_endian(endian),
            pos: 0,
        }
    }

    pub fn set_endian(&mut self, endian: Endian) {
        self.view = self.view.with_endian(endian);
    }

    #[must_use]
    pub fn endian(&self) -> Endian {
        self.view.endian()
    }

    /// Offset-addressed view of the same buffer.
    #[must_use]
    pub fn view(&self) -> ByteView<'a> {
        self.view
    }

    /// Current byte position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.view.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// Whether every byte has been consumed.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.view.len()
    }

    /// Bytes left after the current position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.view.len().saturating_sub(self.pos)
    }

    /// Seek to an absolute position. Seeking to the very end is allowed.
    pub fn seek(&mut self, pos: usize) -> DecodeResult<()> {
        if pos > self.view.len() {
            return Err(DecodeError::OutOfBounds {
                offset: pos,
                need: 0,
                have: 0,
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Move the position by `delta` bytes in either direction.
    pub fn seek_relative(&mut self, delta: isize) -> DecodeResult<()> {
        let target = self
            .pos
            .checked_add_signed(delta)
            .ok_or(DecodeError::OutOfBounds {
                offset: self.pos,
                need: delta.unsigned_abs(),
                have: self.pos,
            })?;
        self.seek(target)
    }

    /// Skip `n` bytes forward.
    pub fn skip(&mut self, n: usize) -> DecodeResult<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Read `n` bytes without copying.
    pub fn read_bytes(&mut self, n: usize) -> DecodeResult<&'a [u8]> {
        let bytes = self.view.bytes_at(self.pos, n)?;
        self.pos += n;
        Ok(bytes)
    }

    /// Read an opaque region into an owned buffer.
    pub fn read_opaque(&mut self, n: usize) -> DecodeResult<Vec<u8>> {
        Ok(self.read_bytes(n)?.to_vec())
    }

    /// Read a 4-byte tag.
    pub fn read_magic(&mut self) -> DecodeResult<[u8; 4]> {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(self.read_bytes(4)?);
        Ok(magic)
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        let v = self.view.u8_at(self.pos)?;
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> DecodeResult<u16> {
        let v = self.view.u16_at(self.pos)?;
        self.pos += 2;
        Ok(v)
    }

    pub fn read_u32(&mut self) -> DecodeResult<u32> {
        let v = self.view.u32_at(self.pos)?;
        self.pos += 4;
        Ok(v)
    }

    /// Read `N` consecutive words.
    pub fn read_words<const N: usize>(&mut self) -> DecodeResult<[u32; N]> {
        let mut words = [0u32; N];
        for word in &mut words {
            *word = self.read_u32()?;
        }
        Ok(words)
    }

    pub fn read_f32(&mut self) -> DecodeResult<f32> {
        let v = self.view.f32_at(self.pos)?;
        self.pos += 4;
        Ok(v)
    }

    /// Read a 16-bit normalized value (see [`unorm16`]).
    pub fn read_unorm16(&mut self) -> DecodeResult<f32> {
        Ok(unorm16(self.read_u16()?))
    }

    pub fn read_vec2(&mut self) -> DecodeResult<Vec2> {
        Ok(Vec2::new(self.read_f32()?, self.read_f32()?))
    }

    pub fn read_vec3(&mut self) -> DecodeResult<Vec3> {
        let v = self.view.vec3_at(self.pos)?;
        self.pos += 12;
        Ok(v)
    }

    pub fn read_quat(&mut self) -> DecodeResult<Quat> {
        let q = self.view.quat_at(self.pos)?;
        self.pos += 16;
        Ok(q)
    }

    /// Read a length-prefixed string.
    ///
    /// When the checksum does not match, [`DecodeError::InvalidString`] is
    /// returned and the cursor is left just past the 8-byte header.
    pub fn read_prefixed_string(&mut self, checksum: bool) -> DecodeResult<String> {
        let offset = self.pos;
        let check = if checksum { Some(self.read_u32()?) } else { None };
        let length = self.read_u32()?;

        if let Some(check) = check {
            if u64::from(check) != u64::from(length) + STRING_HEADER_LEN as u64 {
                return Err(DecodeError::InvalidString {
                    offset,
                    checksum: check,
                    length,
                });
            }
        }

        let bytes = self.read_bytes(length as usize)?;
        decode_text(bytes, offset)
    }

    /// Read a `u32` at an absolute offset without moving the cursor.
    pub fn peek_u32_at(&self, offset: usize) -> DecodeResult<u32> {
        self.view.u32_at(offset)
    }

    /// Clamp an on-disk element count to what the remaining bytes could hold.
    ///
    /// Used for `Vec::with_capacity` so corrupt counts cannot force huge
    /// allocations.
    #[must_use]
    pub fn capacity_hint(&self, count: u32, min_element_size: usize) -> usize {
        let fits = self.remaining() / min_element_size.max(1);
        (count as usize).min(fits)
    }
}

/// Little-endian byte builder, the inverse of [`Cursor`].
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
        }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write `n` zero bytes.
    pub fn write_zeros(&mut self, n: usize) {
        self.buf.resize(self.buf.len() + n, 0);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_words(&mut self, words: &[u32]) {
        for &w in words {
            self.write_u32(w);
        }
    }

    pub fn write_f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_vec3(&mut self, v: Vec3) {
        self.write_f32(v.x);
        self.write_f32(v.y);
        self.write_f32(v.z);
    }

    pub fn write_quat(&mut self, q: Quat) {
        self.write_f32(q.x);
        self.write_f32(q.y);
        self.write_f32(q.z);
        self.write_f32(q.w);
    }

    /// Write a length-prefixed string, with the `length + 8` checksum word if requested.
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_prefixed_string(&mut self, s: &str, checksum: bool) {
        let len = s.len() as u32;
        if checksum {
            self.write_u32(len + STRING_HEADER_LEN as u32);
        }
        self.write_u32(len);
        self.buf.extend_from_slice(s.as_bytes());
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
