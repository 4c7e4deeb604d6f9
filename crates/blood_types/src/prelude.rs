//! Prelude module for `blood_types`.
//!
//! This module provides a convenient way to import commonly used types, traits, and constants.
//!
//! # Examples
//!
//! ```no_run
//! use blood_types::prelude::*;
//!
//! // Now you can use all common types directly
//! let rff = RffFile::open("BLOOD.RFF")?;
//! let art = ArtFile::from_bytes(&rff.data_for_entry("TILES000.ART")?)?;
//! # Ok::<(), BloodFileError>(())
//! ```

// File module types
#[doc(inline)]
pub use crate::file::{
	// ART types
	ArtFile,
	ArtManager,

	// Error types
	BloodFileError,
	Color,
	FileType,
	Lookup,

	// MAP types
	MapFile,
	Palette,

	// RFF types
	RffEntry,
	RffFile,
	Sector,

	// SEQ types
	SeqBucket,
	SeqFile,
	SeqSlot,
	Sprite,
	Tile,
	Wall,
};

// Descriptor table types
#[doc(inline)]
pub use crate::file::tables::{PropertyDescriptor, PropertyKind, TypeDescriptor};

// MAP helpers
#[doc(inline)]
pub use crate::file::map::fix_sectors;

// Codec types, for building custom record schemas
#[doc(inline)]
pub use crate::codec::{CodecError, Cursor, Descriptor, Schema, StructValue, Value};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
