//! SEQ animation sequences.
//!
//! A SEQ names the tile shown on each animation frame plus per-frame
//! render state, packed into eight bytes a frame. Sequences live inside
//! the resource archive as `*.SEQ` entries and are addressed by index,
//! so a small cache ([`Bucket`]) remembers both loads and misses.

use std::collections::HashMap;
use std::sync::LazyLock;

use log::trace;

use crate::codec::{Cursor, Descriptor, Schema, StructValue, Value, decode_struct, encode_struct};

use super::error::{BloodFileError, FileType};
use super::rff;

mod constants {
	/// Magic bytes opening every sequence
	pub const MAGIC: [u8; 4] = *b"SEQ\x1A";
}

/// On-disk header (16 bytes).
static HEADER_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
	Schema::new("SeqHeader")
		.field("magic", Descriptor::Bytes(4))
		.field("version", Descriptor::U16)
		.field("reserved_1", Descriptor::U8)
		.field("reserved_2", Descriptor::U8)
		.field("frame_count", Descriptor::U16)
		.field("ticks_per_frame", Descriptor::U16)
		.field("flags", Descriptor::U32)
});

/// One frame (8 bytes).
static FRAME_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
	fn bit() -> Descriptor {
		Descriptor::Partial {
			parent_bits: 16,
			width: 1,
		}
	}
	Schema::new("SeqFrame")
		.field(
			"tile",
			Descriptor::Partial {
				parent_bits: 16,
				width: 12,
			},
		)
		.field("translucent", bit())
		.field("translucent_reverse", bit())
		.field("blocking", bit())
		.field("hitscan", bit())
		.field(
			"palette",
			Descriptor::Partial {
				parent_bits: 16,
				width: 4,
			},
		)
		.field("trigger", bit())
		.field("x_flip", bit())
		.field("y_flip", bit())
		.field("play_sound", bit())
		.field("invisible", bit())
		.field("smoke", bit())
		.field("aim", bit())
		.field(
			"sound_range",
			Descriptor::Partial {
				parent_bits: 16,
				width: 5,
			},
		)
		.field("x_repeat", Descriptor::U8)
		.field("y_repeat", Descriptor::U8)
		.field("shade", Descriptor::I8)
		.field("sound", Descriptor::U8)
});

/// An animation sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
	version: u16,
	ticks_per_frame: u16,
	flags: u32,
	frames: Vec<StructValue>,
}

impl File {
	/// Parses a sequence from raw bytes.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, BloodFileError> {
		let header_size = HEADER_SCHEMA.size_bytes();
		if bytes.len() < header_size {
			return Err(BloodFileError::insufficient_data(
				FileType::Seq,
				header_size,
				bytes.len(),
			));
		}
		let mut cur = Cursor::from_slice(bytes);
		let header = decode_struct(&HEADER_SCHEMA, &mut cur)?;
		let magic = header["magic"].as_bytes().unwrap_or_default();
		if magic != constants::MAGIC {
			return Err(BloodFileError::invalid_magic(
				FileType::Seq,
				&constants::MAGIC,
				magic,
			));
		}
		let frame_count = header.int("frame_count") as usize;
		let needed = header_size + frame_count * FRAME_SCHEMA.size_bytes();
		if bytes.len() < needed {
			return Err(BloodFileError::insufficient_data(
				FileType::Seq,
				needed,
				bytes.len(),
			));
		}
		let mut frames = Vec::with_capacity(frame_count);
		for _ in 0..frame_count {
			frames.push(decode_struct(&FRAME_SCHEMA, &mut cur)?);
		}
		Ok(Self {
			version: header.int("version") as u16,
			ticks_per_frame: header.int("ticks_per_frame") as u16,
			flags: header.int("flags") as u32,
			frames,
		})
	}

	/// Serialises the sequence.
	pub fn to_bytes(&self) -> Result<Vec<u8>, BloodFileError> {
		let mut header = HEADER_SCHEMA.default_value();
		header.set("magic", Value::Bytes(constants::MAGIC.to_vec()));
		header.set_int("version", i64::from(self.version));
		header.set_int("frame_count", self.frames.len() as i64);
		header.set_int("ticks_per_frame", i64::from(self.ticks_per_frame));
		header.set_int("flags", i64::from(self.flags));

		let mut cur = Cursor::empty();
		encode_struct(&HEADER_SCHEMA, &header, &mut cur)?;
		for frame in &self.frames {
			encode_struct(&FRAME_SCHEMA, frame, &mut cur)?;
		}
		Ok(cur.into_inner())
	}

	/// Sequence format version.
	pub fn version(&self) -> u16 {
		self.version
	}

	/// Game ticks each frame is held for.
	pub fn ticks_per_frame(&self) -> u16 {
		self.ticks_per_frame
	}

	/// Sequence-level flag word.
	pub fn flags(&self) -> u32 {
		self.flags
	}

	/// Frames in playback order.
	pub fn frames(&self) -> &[StructValue] {
		&self.frames
	}

	/// Mutable frames.
	pub fn frames_mut(&mut self) -> &mut Vec<StructValue> {
		&mut self.frames
	}

	/// The tile shown on frame `i`, if the frame exists.
	pub fn tile(&self, i: usize) -> Option<i64> {
		self.frames.get(i).map(|f| f.int("tile"))
	}
}

/// One cached lookup result.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
	/// The archive has no sequence at this index
	Absent,
	/// A parsed sequence
	Loaded(File),
}

/// An index-keyed sequence cache over a resource archive. Misses are
/// cached too, so repeated probes of a sparse index space stay cheap.
#[derive(Debug, Default)]
pub struct Bucket {
	slots: HashMap<usize, Slot>,
}

impl Bucket {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the sequence at `index`, loading it from the archive on
	/// first use. `Ok(None)` means the archive has no such sequence;
	/// parse failures and archive errors other than a missing entry
	/// propagate.
	pub fn sequence(
		&mut self,
		archive: &rff::File,
		index: usize,
	) -> Result<Option<&File>, BloodFileError> {
		if !self.slots.contains_key(&index) {
			let slot = match archive.data_for_entry_by_index("SEQ", index) {
				Ok(bytes) => Slot::Loaded(File::from_bytes(&bytes)?),
				Err(BloodFileError::EntryNotFound { .. }) => {
					trace!("SEQ {index}: absent");
					Slot::Absent
				}
				Err(e) => return Err(e),
			};
			self.slots.insert(index, slot);
		}
		match self.slots.get(&index) {
			Some(Slot::Loaded(file)) => Ok(Some(file)),
			_ => Ok(None),
		}
	}

	/// Number of cached lookups, hits and misses both.
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Whether nothing has been looked up yet.
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Forgets every cached lookup.
	pub fn clear(&mut self) {
		self.slots.clear();
	}
}
