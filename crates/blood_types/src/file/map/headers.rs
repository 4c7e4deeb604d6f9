//! The five MAP headers.
//!
//! A map opens with five fixed records: the magic and version, the
//! player start, the signature block, the counts block, and the notes
//! block. On encrypted maps (major version 7 and up) headers 1-4 are
//! each obfuscated with their own single-byte seed; the seeds are the
//! four bytes of the `"Matt"` signature constant.

use std::sync::LazyLock;

use crate::codec::{Descriptor, Schema};

/// Magic bytes opening every map
pub const MAGIC: [u8; 4] = *b"BLM\x1A";

/// The signature constant stored in header 2 (`"Matt"` little-endian)
pub const SIGNATURE: u32 = 0x7474_614D;

/// Major versions from this one on store obfuscated headers and records
pub const ENCRYPTED_MAJOR: u8 = 7;

/// Per-header XOR seeds for headers 1-4, in order
pub const HEADER_KEYS: [u8; 4] = [0x4D, 0x61, 0x74, 0x74];

/// Header 0: magic plus the split version word (6 bytes).
pub static IDENT: LazyLock<Schema> = LazyLock::new(|| {
	Schema::new("MapIdent")
		.field("magic", Descriptor::Bytes(4))
		.field("version_minor", Descriptor::U8)
		.field("version_major", Descriptor::U8)
});

/// Header 1: the player start position (14 bytes).
pub static PLAYER_START: LazyLock<Schema> = LazyLock::new(|| {
	Schema::new("PlayerStart")
		.field("x", Descriptor::I32)
		.field("y", Descriptor::I32)
		.field("z", Descriptor::I32)
		.field("angle", Descriptor::I16)
});

/// Header 2: start sector, sky parameters, and the signature (12 bytes).
pub static SIGNATURE_BLOCK: LazyLock<Schema> = LazyLock::new(|| {
	Schema::new("SignatureBlock")
		.field("sector", Descriptor::I16)
		.field("sky_bits", Descriptor::I16)
		.field("visibility", Descriptor::I32)
		.field("signature", Descriptor::U32)
});

/// Header 3: revision count and the three record counts (10 bytes).
pub static COUNTS: LazyLock<Schema> = LazyLock::new(|| {
	Schema::new("Counts")
		.field("revisions", Descriptor::I32)
		.field("sector_count", Descriptor::I16)
		.field("wall_count", Descriptor::I16)
		.field("sprite_count", Descriptor::I16)
});

/// Header 4: copyright text and extra-record sizes (128 bytes).
pub static NOTES: LazyLock<Schema> = LazyLock::new(|| {
	Schema::new("Notes")
		.field("copyright", Descriptor::Str(64))
		.field("sprite_data_size", Descriptor::I32)
		.field("wall_data_size", Descriptor::I32)
		.field("sector_data_size", Descriptor::I32)
		.field("reserved", Descriptor::Bytes(52))
});

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn header_sizes_match_the_format() {
		assert_eq!(IDENT.size_bytes(), 6);
		assert_eq!(PLAYER_START.size_bytes(), 14);
		assert_eq!(SIGNATURE_BLOCK.size_bytes(), 12);
		assert_eq!(COUNTS.size_bytes(), 10);
		assert_eq!(NOTES.size_bytes(), 128);
	}

	#[test]
	fn schemas_are_well_formed() {
		for schema in [&*IDENT, &*PLAYER_START, &*SIGNATURE_BLOCK, &*COUNTS, &*NOTES] {
			schema.validate().unwrap();
		}
	}

	#[test]
	fn signature_spells_matt() {
		assert_eq!(&SIGNATURE.to_le_bytes(), b"Matt");
		assert_eq!(HEADER_KEYS, *b"Matt");
	}
}
