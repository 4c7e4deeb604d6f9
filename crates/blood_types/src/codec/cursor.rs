//! Forward-reading and writing byte cursor.

use super::CodecError;

/// A byte buffer with a single read/write position.
///
/// Reads advance the position and fail with
/// [`CodecError::TruncatedInput`] when the buffer is exhausted. Writes
/// overwrite in place and extend the buffer once the position passes the
/// end, which is what the archive writers need to patch a header after
/// the fact. Cursors are single-threaded objects; callers keep one per
/// decode or encode.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
	buf: Vec<u8>,
	pos: usize,
}

impl Cursor {
	/// Creates a cursor over an owned buffer, positioned at the start.
	pub fn new(buf: Vec<u8>) -> Self {
		Self {
			buf,
			pos: 0,
		}
	}

	/// Creates an empty cursor for writing.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Creates a cursor over a copy of the given bytes.
	pub fn from_slice(data: &[u8]) -> Self {
		Self::new(data.to_vec())
	}

	/// Current position in the buffer.
	pub fn position(&self) -> usize {
		self.pos
	}

	/// Total buffer length.
	pub fn len(&self) -> usize {
		self.buf.len()
	}

	/// Returns `true` if the buffer is empty.
	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	/// Bytes left between the position and the end of the buffer.
	pub fn remaining(&self) -> usize {
		self.buf.len().saturating_sub(self.pos)
	}

	/// Moves the position to an absolute offset.
	///
	/// Seeking past the end is allowed; the next read fails and the next
	/// write zero-fills the gap.
	pub fn seek(&mut self, offset: usize) {
		self.pos = offset;
	}

	/// Moves the position by a relative amount, which may be negative.
	/// Saturates at zero.
	pub fn advance(&mut self, delta: isize) {
		self.pos = self.pos.saturating_add_signed(delta);
	}

	/// Reads `n` bytes and advances.
	pub fn read_bytes(&mut self, n: usize) -> Result<&[u8], CodecError> {
		if self.remaining() < n {
			return Err(CodecError::TruncatedInput {
				needed: n,
				offset: self.pos,
				remaining: self.remaining(),
			});
		}
		let slice = &self.buf[self.pos..self.pos + n];
		self.pos += n;
		Ok(slice)
	}

	/// Reads a little-endian unsigned integer of `size` bytes (1, 2 or 4).
	pub fn read_uint(&mut self, size: usize) -> Result<u64, CodecError> {
		let bytes = self.read_bytes(size)?;
		let mut out = 0u64;
		for (i, b) in bytes.iter().enumerate() {
			out |= u64::from(*b) << (i * 8);
		}
		Ok(out)
	}

	/// Reads one byte.
	pub fn read_u8(&mut self) -> Result<u8, CodecError> {
		Ok(self.read_uint(1)? as u8)
	}

	/// Reads a little-endian `u16`.
	pub fn read_u16(&mut self) -> Result<u16, CodecError> {
		Ok(self.read_uint(2)? as u16)
	}

	/// Reads a little-endian `u32`.
	pub fn read_u32(&mut self) -> Result<u32, CodecError> {
		Ok(self.read_uint(4)? as u32)
	}

	/// Writes bytes at the position, overwriting what is there and
	/// extending the buffer as needed, then advances. Writing past the end
	/// zero-fills any gap left by a prior `seek`.
	pub fn write_bytes(&mut self, data: &[u8]) {
		if self.pos > self.buf.len() {
			self.buf.resize(self.pos, 0);
		}
		let overlap = (self.buf.len() - self.pos).min(data.len());
		self.buf[self.pos..self.pos + overlap].copy_from_slice(&data[..overlap]);
		self.buf.extend_from_slice(&data[overlap..]);
		self.pos += data.len();
	}

	/// Writes a little-endian unsigned integer of `size` bytes.
	pub fn write_uint(&mut self, value: u64, size: usize) {
		let bytes = value.to_le_bytes();
		self.write_bytes(&bytes[..size]);
	}

	/// Borrows the underlying buffer.
	pub fn as_slice(&self) -> &[u8] {
		&self.buf
	}

	/// Consumes the cursor and returns the buffer.
	pub fn into_inner(self) -> Vec<u8> {
		self.buf
	}
}
