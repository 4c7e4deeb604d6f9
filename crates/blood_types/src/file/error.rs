//! Unified error type for file format parsing and manipulation.

use std::fmt;

use thiserror::Error;

use crate::codec::CodecError;

/// Which on-disk format an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
	/// RFF resource archive
	Rff,
	/// ART tile atlas
	Art,
	/// PAL palette entry
	Palette,
	/// PLU shade lookup
	Lookup,
	/// MAP level file
	Map,
	/// SEQ animation sequence
	Seq,
	/// Type descriptor tables
	Tables,
}

impl fmt::Display for FileType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Rff => "RFF",
			Self::Art => "ART",
			Self::Palette => "PAL",
			Self::Lookup => "PLU",
			Self::Map => "MAP",
			Self::Seq => "SEQ",
			Self::Tables => "TABLES",
		};
		write!(f, "{name}")
	}
}

/// Errors that can occur when loading or saving game assets.
#[derive(Debug, Error)]
pub enum BloodFileError {
	/// Not enough data to parse
	#[error("{file_type}: insufficient data: expected {expected} bytes, got {actual} bytes")]
	InsufficientData {
		/// Format being parsed
		file_type: FileType,
		/// Expected number of bytes
		expected: usize,
		/// Actual number of bytes
		actual: usize,
	},

	/// File header's magic does not match the expected bytes
	#[error("{file_type}: invalid magic: expected {expected:02X?}, got {actual:02X?}")]
	InvalidMagic {
		/// Format being parsed
		file_type: FileType,
		/// Expected magic bytes
		expected: Vec<u8>,
		/// Bytes actually found
		actual: Vec<u8>,
	},

	/// Known magic, unrecognised version
	#[error("{file_type}: unsupported version {version:#06X}")]
	UnsupportedVersion {
		/// Format being parsed
		file_type: FileType,
		/// Version found in the header
		version: u32,
	},

	/// A map record carries an illegal value, e.g. a negative extra-data
	/// tag other than -1
	#[error("MAP: {reason}")]
	MapParse {
		/// What was illegal about the record
		reason: String,
	},

	/// Queried tile number is outside every loaded atlas's range
	#[error("tile {tile} is not covered by any loaded atlas")]
	TileNotFound {
		/// Tile number that was requested
		tile: usize,
	},

	/// Archive entry lookup by name missed on retrieval
	#[error("{file_type}: entry `{name}` not found")]
	EntryNotFound {
		/// Format holding the entry
		file_type: FileType,
		/// Name that was requested
		name: String,
	},

	/// A structural count disagrees with the data that follows it
	#[error("{file_type}: {reason}")]
	Malformed {
		/// Format being parsed
		file_type: FileType,
		/// What is inconsistent
		reason: String,
	},

	/// The descriptor tables were loaded a second time
	#[error("descriptor tables are already loaded")]
	TablesAlreadyLoaded,

	/// Record codec error
	#[error(transparent)]
	Codec(#[from] CodecError),

	/// Descriptor table deserialisation error
	#[error(transparent)]
	Yaml(#[from] serde_yaml::Error),

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}

impl BloodFileError {
	/// Shorthand for [`BloodFileError::InsufficientData`].
	pub fn insufficient_data(file_type: FileType, expected: usize, actual: usize) -> Self {
		Self::InsufficientData {
			file_type,
			expected,
			actual,
		}
	}

	/// Shorthand for [`BloodFileError::InvalidMagic`].
	pub fn invalid_magic(file_type: FileType, expected: &[u8], actual: &[u8]) -> Self {
		Self::InvalidMagic {
			file_type,
			expected: expected.to_vec(),
			actual: actual.to_vec(),
		}
	}

	/// Shorthand for [`BloodFileError::MapParse`].
	pub fn map_parse(reason: impl Into<String>) -> Self {
		Self::MapParse {
			reason: reason.into(),
		}
	}

	/// Shorthand for [`BloodFileError::Malformed`].
	pub fn malformed(file_type: FileType, reason: impl Into<String>) -> Self {
		Self::Malformed {
			file_type,
			reason: reason.into(),
		}
	}
}
