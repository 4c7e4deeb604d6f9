//! MAP level files.
//!
//! A map stores five headers followed by the sector, wall, and sprite
//! arrays. From major version 7 on, headers 1-4 and every engine record
//! are XOR-obfuscated; each record category derives its key from the
//! revision counter and the record size. An engine record whose third
//! tag is positive is followed by a game extra-data record, stored
//! plain.

pub mod fixup;
pub mod headers;
pub mod records;
pub mod xdata;

use std::collections::BTreeMap;
use std::path::Path;

use log::debug;

use crate::codec::{
	Cursor, Schema, StructValue, Value, decode_struct, decode_struct_encrypted, encode_struct,
	encode_struct_encrypted,
};

use super::error::{BloodFileError, FileType};

pub use fixup::fix_sectors;

/// One sector: the engine record plus the optional game extra data.
#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
	/// Engine record, per [`records::BUILD_SECTOR`]
	pub build: StructValue,
	/// Game extra data, per [`xdata::BLOOD_SECTOR_DATA`]
	pub data: Option<StructValue>,
}

/// One wall: the engine record plus the optional game extra data.
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
	/// Engine record, per [`records::BUILD_WALL`]
	pub build: StructValue,
	/// Game extra data, per [`xdata::BLOOD_WALL_DATA`]
	pub data: Option<StructValue>,
}

/// One sprite: the engine record plus the optional game extra data.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
	/// Engine record, per [`records::BUILD_SPRITE`]
	pub build: StructValue,
	/// Game extra data, per [`xdata::BLOOD_SPRITE_DATA`]
	pub data: Option<StructValue>,
}

/// Reads the extra-data indicator, the third engine tag.
fn extra_indicator(build: &StructValue) -> i64 {
	build
		.list("tags")
		.get(2)
		.and_then(Value::as_int)
		.unwrap_or(0)
}

macro_rules! record_kind {
	($ty:ty) => {
		impl $ty {
			/// Whether the engine record's third tag asks for extra data.
			pub fn wants_data(&self) -> bool {
				extra_indicator(&self.build) > 0
			}
		}
	};
}

record_kind!(Sector);
record_kind!(Wall);
record_kind!(Sprite);

/// An in-memory MAP level.
#[derive(Debug, Clone)]
pub struct File {
	version_minor: u8,
	version_major: u8,
	revisions: i32,
	player_start: StructValue,
	signature_block: StructValue,
	notes: StructValue,
	sectors: Vec<Sector>,
	walls: Vec<Wall>,
	sprites: Vec<Sprite>,
}

impl File {
	/// Loads a map from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, BloodFileError> {
		Self::from_bytes(&std::fs::read(path)?)
	}

	/// Parses a map from raw bytes.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, BloodFileError> {
		let headers_size = headers::IDENT.size_bytes()
			+ headers::PLAYER_START.size_bytes()
			+ headers::SIGNATURE_BLOCK.size_bytes()
			+ headers::COUNTS.size_bytes()
			+ headers::NOTES.size_bytes();
		if bytes.len() < headers_size {
			return Err(BloodFileError::insufficient_data(
				FileType::Map,
				headers_size,
				bytes.len(),
			));
		}

		let mut cur = Cursor::from_slice(bytes);
		let ident = decode_struct(&headers::IDENT, &mut cur)?;
		let magic = ident["magic"].as_bytes().unwrap_or_default();
		if magic != headers::MAGIC {
			return Err(BloodFileError::invalid_magic(
				FileType::Map,
				&headers::MAGIC,
				magic,
			));
		}
		let version_minor = ident.int("version_minor") as u8;
		let version_major = ident.int("version_major") as u8;
		if !matches!(version_major, 6 | 7) {
			return Err(BloodFileError::UnsupportedVersion {
				file_type: FileType::Map,
				version: u32::from(version_major) << 8 | u32::from(version_minor),
			});
		}
		let encrypted = version_major >= headers::ENCRYPTED_MAJOR;

		let mut header = |schema: &Schema, key: u8| {
			if encrypted {
				decode_struct_encrypted(schema, &mut cur, key)
			} else {
				decode_struct(schema, &mut cur)
			}
		};
		let player_start = header(&headers::PLAYER_START, headers::HEADER_KEYS[0])?;
		let signature_block = header(&headers::SIGNATURE_BLOCK, headers::HEADER_KEYS[1])?;
		let counts = header(&headers::COUNTS, headers::HEADER_KEYS[2])?;
		let notes = header(&headers::NOTES, headers::HEADER_KEYS[3])?;

		let signature = signature_block.int("signature") as u32;
		if signature != headers::SIGNATURE {
			return Err(BloodFileError::malformed(
				FileType::Map,
				format!("bad signature {signature:#010X}"),
			));
		}

		let revisions = counts.int("revisions") as i32;
		let sector_count = counts.int("sector_count");
		let wall_count = counts.int("wall_count");
		let sprite_count = counts.int("sprite_count");
		if sector_count < 0 || wall_count < 0 || sprite_count < 0 {
			return Err(BloodFileError::map_parse(format!(
				"negative record count: {sector_count}/{wall_count}/{sprite_count}"
			)));
		}

		debug!(
			"MAP v{version_major}.{version_minor}: rev {revisions}, \
			 {sector_count} sectors, {wall_count} walls, {sprite_count} sprites"
		);

		let sectors = read_records(
			&mut cur,
			&records::BUILD_SECTOR,
			&xdata::BLOOD_SECTOR_DATA,
			sector_count as usize,
			record_key(encrypted, revisions, records::SECTOR_SIZE),
			"sector",
		)?
		.into_iter()
		.map(|(build, data)| Sector { build, data })
		.collect();
		let walls = read_records(
			&mut cur,
			&records::BUILD_WALL,
			&xdata::BLOOD_WALL_DATA,
			wall_count as usize,
			record_key(encrypted, revisions, records::WALL_SIZE),
			"wall",
		)?
		.into_iter()
		.map(|(build, data)| Wall { build, data })
		.collect();
		let sprites = read_records(
			&mut cur,
			&records::BUILD_SPRITE,
			&xdata::BLOOD_SPRITE_DATA,
			sprite_count as usize,
			record_key(encrypted, revisions, records::SPRITE_SIZE),
			"sprite",
		)?
		.into_iter()
		.map(|(build, data)| Sprite { build, data })
		.collect();

		Ok(Self {
			version_minor,
			version_major,
			revisions,
			player_start,
			signature_block,
			notes,
			sectors,
			walls,
			sprites,
		})
	}

	/// Serialises the map, bumping the revision counter. The record keys
	/// are re-derived from the new revision. Fails without touching the
	/// counter if any record's extra-data tag disagrees with its data;
	/// run [`fix_sectors`] (or reconcile by hand) first.
	pub fn to_bytes(&mut self) -> Result<Vec<u8>, BloodFileError> {
		let revisions = self.revisions.wrapping_add(1);
		let encrypted = self.version_major >= headers::ENCRYPTED_MAJOR;
		let mut cur = Cursor::empty();

		let mut ident = headers::IDENT.default_value();
		ident.set("magic", Value::Bytes(headers::MAGIC.to_vec()));
		ident.set_int("version_minor", i64::from(self.version_minor));
		ident.set_int("version_major", i64::from(self.version_major));
		encode_struct(&headers::IDENT, &ident, &mut cur)?;

		let mut signature_block = self.signature_block.clone();
		signature_block.set_int("signature", i64::from(headers::SIGNATURE));

		let mut counts = headers::COUNTS.default_value();
		counts.set_int("revisions", i64::from(revisions));
		counts.set_int("sector_count", self.sectors.len() as i64);
		counts.set_int("wall_count", self.walls.len() as i64);
		counts.set_int("sprite_count", self.sprites.len() as i64);

		let blocks: [(&Schema, &StructValue); 4] = [
			(&headers::PLAYER_START, &self.player_start),
			(&headers::SIGNATURE_BLOCK, &signature_block),
			(&headers::COUNTS, &counts),
			(&headers::NOTES, &self.notes),
		];
		for ((schema, value), key) in blocks.iter().zip(headers::HEADER_KEYS) {
			if encrypted {
				encode_struct_encrypted(schema, value, &mut cur, key)?;
			} else {
				encode_struct(schema, value, &mut cur)?;
			}
		}

		let sector_key = record_key(encrypted, revisions, records::SECTOR_SIZE);
		for (i, sector) in self.sectors.iter().enumerate() {
			write_record(
				&mut cur,
				&records::BUILD_SECTOR,
				&xdata::BLOOD_SECTOR_DATA,
				&sector.build,
				sector.data.as_ref(),
				sector_key,
				"sector",
				i,
			)?;
		}
		let wall_key = record_key(encrypted, revisions, records::WALL_SIZE);
		for (i, wall) in self.walls.iter().enumerate() {
			write_record(
				&mut cur,
				&records::BUILD_WALL,
				&xdata::BLOOD_WALL_DATA,
				&wall.build,
				wall.data.as_ref(),
				wall_key,
				"wall",
				i,
			)?;
		}
		let sprite_key = record_key(encrypted, revisions, records::SPRITE_SIZE);
		for (i, sprite) in self.sprites.iter().enumerate() {
			write_record(
				&mut cur,
				&records::BUILD_SPRITE,
				&xdata::BLOOD_SPRITE_DATA,
				&sprite.build,
				sprite.data.as_ref(),
				sprite_key,
				"sprite",
				i,
			)?;
		}

		self.revisions = revisions;
		Ok(cur.into_inner())
	}

	/// Saves the map to disk, bumping the revision counter.
	pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), BloodFileError> {
		let bytes = self.to_bytes()?;
		std::fs::write(path, bytes)?;
		Ok(())
	}

	/// Map version as `(major, minor)`.
	pub fn version(&self) -> (u8, u8) {
		(self.version_major, self.version_minor)
	}

	/// Whether this map's headers and records are stored obfuscated.
	pub fn encrypted(&self) -> bool {
		self.version_major >= headers::ENCRYPTED_MAJOR
	}

	/// Times the map has been saved.
	pub fn revisions(&self) -> i32 {
		self.revisions
	}

	/// Player start header.
	pub fn player_start(&self) -> &StructValue {
		&self.player_start
	}

	/// Mutable player start header.
	pub fn player_start_mut(&mut self) -> &mut StructValue {
		&mut self.player_start
	}

	/// Signature block header.
	pub fn signature_block(&self) -> &StructValue {
		&self.signature_block
	}

	/// Notes header.
	pub fn notes(&self) -> &StructValue {
		&self.notes
	}

	/// Sectors in file order.
	pub fn sectors(&self) -> &[Sector] {
		&self.sectors
	}

	/// Mutable sectors.
	pub fn sectors_mut(&mut self) -> &mut [Sector] {
		&mut self.sectors
	}

	/// Walls in file order.
	pub fn walls(&self) -> &[Wall] {
		&self.walls
	}

	/// Mutable walls.
	pub fn walls_mut(&mut self) -> &mut [Wall] {
		&mut self.walls
	}

	/// Sprites in file order.
	pub fn sprites(&self) -> &[Sprite] {
		&self.sprites
	}

	/// Mutable sprites.
	pub fn sprites_mut(&mut self) -> &mut [Sprite] {
		&mut self.sprites
	}

	/// Counts sprites per picnum, a quick census for reporting.
	pub fn sprite_census(&self) -> BTreeMap<i64, usize> {
		let mut census = BTreeMap::new();
		for sprite in &self.sprites {
			*census.entry(sprite.build.int("picnum")).or_insert(0) += 1;
		}
		census
	}
}

/// Derives one record category's XOR key, or `None` on plain maps.
fn record_key(encrypted: bool, revisions: i32, record_size: usize) -> Option<u8> {
	encrypted.then(|| (revisions as u32).wrapping_mul(record_size as u32) as u8)
}

fn read_records(
	cur: &mut Cursor,
	engine: &Schema,
	extra: &Schema,
	count: usize,
	key: Option<u8>,
	kind: &str,
) -> Result<Vec<(StructValue, Option<StructValue>)>, BloodFileError> {
	let mut out = Vec::with_capacity(count);
	for i in 0..count {
		let build = match key {
			Some(key) => decode_struct_encrypted(engine, cur, key)?,
			None => decode_struct(engine, cur)?,
		};
		let data = match extra_indicator(&build) {
			tag if tag > 0 => Some(decode_struct(extra, cur)?),
			0 | -1 => None,
			tag => {
				return Err(BloodFileError::map_parse(format!(
					"{kind} {i}: illegal extra-data tag {tag}"
				)));
			}
		};
		out.push((build, data));
	}
	Ok(out)
}

#[allow(clippy::too_many_arguments)]
fn write_record(
	cur: &mut Cursor,
	engine: &Schema,
	extra: &Schema,
	build: &StructValue,
	data: Option<&StructValue>,
	key: Option<u8>,
	kind: &str,
	i: usize,
) -> Result<(), BloodFileError> {
	// The tag decides presence on load; a disagreeing save would emit a
	// file that no longer parses.
	let tag = extra_indicator(build);
	match (tag > 0, data) {
		(true, None) => {
			return Err(BloodFileError::map_parse(format!(
				"{kind} {i}: extra-data tag {tag} with no extra record"
			)));
		}
		(false, Some(_)) => {
			return Err(BloodFileError::map_parse(format!(
				"{kind} {i}: extra record present despite extra-data tag {tag}"
			)));
		}
		_ => {}
	}
	match key {
		Some(key) => encode_struct_encrypted(engine, build, cur, key)?,
		None => encode_struct(engine, build, cur)?,
	}
	if let Some(data) = data {
		encode_struct(extra, data, cur)?;
	}
	Ok(())
}
