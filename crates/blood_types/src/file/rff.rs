//! RFF resource archive support.
//!
//! An RFF file is an indexed bundle of named entries. The directory sits
//! at the offset named in the header and may itself be XOR-obfuscated
//! (archives of version 3.01 and later). Individual entries can
//! additionally have the first 256 bytes of their body obfuscated, marked
//! by a flag bit in their directory record.
//!
//! # File Format
//!
//! ```text
//! ┌─────────────────────────────────┐
//! │ Header (32 bytes)               │  magic "RFF\x1A", version,
//! ├─────────────────────────────────┤  flags, dir offset, entry count
//! │ Entry bodies (back to back)     │
//! ├─────────────────────────────────┤
//! │ Directory (48 bytes per entry)  │  offset, size, flags, ext, name
//! └─────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use log::debug;
use regex::RegexBuilder;

use crate::codec::{Cursor, Descriptor, Schema, StructValue, Value, crypt_in_place, decode_struct, encode_struct};

use super::{BloodFileError, FileType};

mod constants {
	/// Magic bytes for RFF archives
	pub const MAGIC: [u8; 4] = *b"RFF\x1A";

	/// Size of the archive header in bytes
	pub const HEADER_SIZE: usize = 32;

	/// Size of one directory record in bytes
	pub const ENTRY_SIZE: usize = 48;

	/// Directories are obfuscated from this version on
	pub const DIR_CRYPT_VERSION: u32 = 0x301;

	/// Directory flag bit marking an obfuscated entry body
	pub const FLAG_ENCRYPTED: u8 = 0x10;

	/// Number of body bytes covered by the per-entry stream
	pub const CRYPT_PREFIX: usize = 256;

	/// Key for obfuscated entry bodies
	pub const BODY_KEY: u8 = 0;
}

static HEADER_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
	Schema::new("RffHeader")
		.field("magic", Descriptor::Bytes(4))
		.field("version", Descriptor::U32)
		.field("flags", Descriptor::U32)
		.field("dir_offset", Descriptor::U32)
		.field("entry_count", Descriptor::U32)
		.field("reserved", Descriptor::Bytes(12))
});

static ENTRY_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
	Schema::new("RffEntry")
		.field("reserved_1", Descriptor::Bytes(16))
		.field("offset", Descriptor::U32)
		.field("size", Descriptor::U32)
		.field("reserved_2", Descriptor::Bytes(8))
		.field("flags", Descriptor::U8)
		.field("extension", Descriptor::Str(4))
		.field("name", Descriptor::Str(11))
});

/// One named entry of an archive.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
	/// Upper-cased base name, at most 11 bytes
	pub name: String,
	/// Upper-cased extension, at most 4 bytes
	pub extension: String,
	/// Body offset within the archive
	pub offset: u32,
	/// Body size in bytes
	pub size: u32,
	/// Whether the first 256 body bytes are obfuscated
	pub encrypted: bool,
	/// Body bytes for entries added in memory; loaded entries slice the
	/// archive lazily instead
	pub data: Option<Vec<u8>>,
}

impl Entry {
	/// `NAME.EXT`, the key entries are looked up by.
	pub fn full_name(&self) -> String {
		format!("{}.{}", self.name, self.extension)
	}

	fn from_value(v: &StructValue) -> Self {
		let flags = v.int("flags") as u8;
		let name = v["name"].as_str().unwrap_or_default().to_ascii_uppercase();
		let extension = v["extension"].as_str().unwrap_or_default().to_ascii_uppercase();
		Self {
			name,
			extension,
			offset: v.int("offset") as u32,
			size: v.int("size") as u32,
			encrypted: flags & constants::FLAG_ENCRYPTED != 0,
			data: None,
		}
	}

	fn to_value(&self) -> StructValue {
		let mut v = ENTRY_SCHEMA.default_value();
		v.set_int("offset", i64::from(self.offset));
		v.set_int("size", i64::from(self.size));
		let flags = if self.encrypted {
			constants::FLAG_ENCRYPTED
		} else {
			0
		};
		v.set_int("flags", i64::from(flags));
		v.set("extension", Value::Str(self.extension.clone()));
		v.set("name", Value::Str(self.name.clone()));
		v
	}
}

impl std::fmt::Display for Entry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"Entry {{ name: '{}', offset: {}, size: {}, encrypted: {} }}",
			self.full_name(),
			self.offset,
			self.size,
			self.encrypted
		)
	}
}

/// An RFF archive: its directory plus the raw bytes entries slice into.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
	version: u32,
	flags: u32,
	entries: Vec<Entry>,
	index: HashMap<String, usize>,
	raw: Vec<u8>,
}

impl File {
	/// Creates an empty archive at the given directory version.
	pub fn new(version: u32) -> Self {
		Self {
			version,
			flags: 0,
			entries: Vec::new(),
			index: HashMap::new(),
			raw: Vec::new(),
		}
	}

	/// Reads an archive from disk.
	pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, BloodFileError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(data)
	}

	/// Parses an archive from its full byte content.
	///
	/// Unlike the other formats this takes the buffer by value: only the
	/// directory is decoded up front, and the archive keeps the bytes so
	/// entry bodies can be sliced lazily on request.
	pub fn from_bytes(data: Vec<u8>) -> Result<Self, BloodFileError> {
		if data.len() < constants::HEADER_SIZE {
			return Err(BloodFileError::insufficient_data(
				FileType::Rff,
				constants::HEADER_SIZE,
				data.len(),
			));
		}
		let mut cur = Cursor::from_slice(&data);
		let header = decode_struct(&HEADER_SCHEMA, &mut cur)?;

		let magic = header["magic"].as_bytes().unwrap_or_default();
		if magic != constants::MAGIC {
			return Err(BloodFileError::invalid_magic(FileType::Rff, &constants::MAGIC, magic));
		}
		let version = header.int("version") as u32;
		if !matches!(version >> 8, 2 | 3) {
			return Err(BloodFileError::UnsupportedVersion {
				file_type: FileType::Rff,
				version,
			});
		}

		let dir_offset = header.int("dir_offset") as usize;
		let entry_count = header.int("entry_count") as usize;
		let dir_size = entry_count * constants::ENTRY_SIZE;
		if data.len() < dir_offset + dir_size {
			return Err(BloodFileError::insufficient_data(
				FileType::Rff,
				dir_offset + dir_size,
				data.len(),
			));
		}

		let mut dir = data[dir_offset..dir_offset + dir_size].to_vec();
		if version >= constants::DIR_CRYPT_VERSION {
			crypt_in_place(&mut dir, version as u8);
		}

		let mut dir_cur = Cursor::new(dir);
		let mut entries = Vec::with_capacity(entry_count);
		let mut index = HashMap::with_capacity(entry_count);
		for i in 0..entry_count {
			let entry = Entry::from_value(&decode_struct(&ENTRY_SCHEMA, &mut dir_cur)?);
			index.insert(entry.full_name(), i);
			entries.push(entry);
		}
		debug!("loaded RFF v{:X}: {} entries", version, entries.len());

		Ok(Self {
			version,
			flags: header.int("flags") as u32,
			entries,
			index,
			raw: data,
		})
	}

	/// Archive version word.
	pub fn version(&self) -> u32 {
		self.version
	}

	/// Number of directory entries.
	pub fn entry_count(&self) -> usize {
		self.entries.len()
	}

	/// All entries in directory order.
	pub fn entries(&self) -> &[Entry] {
		&self.entries
	}

	/// Full names of all entries, in directory order.
	pub fn names(&self) -> Vec<String> {
		self.entries.iter().map(Entry::full_name).collect()
	}

	/// Looks up an entry by `NAME.EXT`, case-insensitively. A miss is not
	/// an error at lookup time.
	pub fn entry(&self, name: &str) -> Option<&Entry> {
		self.index.get(&name.to_ascii_uppercase()).map(|&i| &self.entries[i])
	}

	/// Returns the plain body bytes of an entry, stripping the body
	/// obfuscation when the entry's flag is set.
	pub fn data_for_entry(&self, name: &str) -> Result<Vec<u8>, BloodFileError> {
		let entry = self.entry(name).ok_or_else(|| BloodFileError::EntryNotFound {
			file_type: FileType::Rff,
			name: name.to_string(),
		})?;
		self.entry_body(entry)
	}

	/// Returns the plain body of the `index`-th entry (in directory
	/// order) whose extension matches, case-insensitively.
	pub fn data_for_entry_by_index(
		&self,
		extension: &str,
		index: usize,
	) -> Result<Vec<u8>, BloodFileError> {
		let wanted = extension.to_ascii_uppercase();
		let entry = self
			.entries
			.iter()
			.filter(|e| e.extension == wanted)
			.nth(index)
			.ok_or_else(|| BloodFileError::EntryNotFound {
				file_type: FileType::Rff,
				name: format!("*.{wanted}[{index}]"),
			})?;
		self.entry_body(entry)
	}

	/// Full names matching a shell-style glob (`*` and `?`),
	/// case-insensitively, in directory order.
	pub fn find_matching_entries(&self, pattern: &str) -> Vec<String> {
		let mut regex = String::with_capacity(pattern.len() + 2);
		regex.push('^');
		for c in pattern.chars() {
			match c {
				'*' => regex.push_str(".*"),
				'?' => regex.push('.'),
				other => regex.push_str(&regex::escape(&other.to_string())),
			}
		}
		regex.push('$');
		let Ok(matcher) = RegexBuilder::new(&regex).case_insensitive(true).build() else {
			return Vec::new();
		};
		self.entries
			.iter()
			.map(Entry::full_name)
			.filter(|name| matcher.is_match(name))
			.collect()
	}

	/// Adds an in-memory entry with a plain (non-obfuscated) body.
	pub fn add_entry(&mut self, name: &str, extension: &str, data: Vec<u8>) {
		let entry = Entry {
			name: name.to_ascii_uppercase(),
			extension: extension.to_ascii_uppercase(),
			offset: 0,
			size: data.len() as u32,
			encrypted: false,
			data: Some(data),
		};
		self.index.insert(entry.full_name(), self.entries.len());
		self.entries.push(entry);
	}

	fn entry_body(&self, entry: &Entry) -> Result<Vec<u8>, BloodFileError> {
		let mut body = match &entry.data {
			Some(data) => data.clone(),
			None => self.raw_body(entry)?,
		};
		if entry.encrypted {
			let n = body.len().min(constants::CRYPT_PREFIX);
			crypt_in_place(&mut body[..n], constants::BODY_KEY);
		}
		Ok(body)
	}

	/// Stored-form body bytes, exactly as they sit in the archive.
	fn raw_body(&self, entry: &Entry) -> Result<Vec<u8>, BloodFileError> {
		let start = entry.offset as usize;
		let end = start + entry.size as usize;
		if end > self.raw.len() {
			return Err(BloodFileError::insufficient_data(FileType::Rff, end, self.raw.len()));
		}
		Ok(self.raw[start..end].to_vec())
	}

	/// Serialises the archive: bodies first, then the directory, then the
	/// header's directory offset is patched in. Stored-form bytes are
	/// passed through untouched, so an unmodified archive round-trips.
	pub fn to_bytes(&self) -> Result<Vec<u8>, BloodFileError> {
		let mut cur = Cursor::empty();
		cur.write_bytes(&[0u8; constants::HEADER_SIZE]);

		let mut written = Vec::with_capacity(self.entries.len());
		for entry in &self.entries {
			let body = match &entry.data {
				Some(data) => data.clone(),
				None => self.raw_body(entry)?,
			};
			let offset = cur.position() as u32;
			cur.write_bytes(&body);
			let mut updated = entry.clone();
			updated.offset = offset;
			updated.size = body.len() as u32;
			written.push(updated);
		}

		let dir_offset = cur.position();
		let mut dir = Cursor::empty();
		for entry in &written {
			encode_struct(&ENTRY_SCHEMA, &entry.to_value(), &mut dir)?;
		}
		let mut dir = dir.into_inner();
		if self.version >= constants::DIR_CRYPT_VERSION {
			crypt_in_place(&mut dir, self.version as u8);
		}
		cur.write_bytes(&dir);

		let mut header = HEADER_SCHEMA.default_value();
		header.set("magic", Value::Bytes(constants::MAGIC.to_vec()));
		header.set_int("version", i64::from(self.version));
		header.set_int("flags", i64::from(self.flags));
		header.set_int("dir_offset", dir_offset as i64);
		header.set_int("entry_count", written.len() as i64);
		cur.seek(0);
		encode_struct(&HEADER_SCHEMA, &header, &mut cur)?;

		debug!("saved RFF v{:X}: {} entries, dir at {}", self.version, written.len(), dir_offset);
		Ok(cur.into_inner())
	}
}
