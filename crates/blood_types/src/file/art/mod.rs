//! ART tile atlas support.
//!
//! An ART file packs a run of numbered tiles: a 16-byte header naming the
//! tile range, dimension tables, per-tile bit-packed animation metadata,
//! and then the paletted pixel bodies back to back with no padding.
//! Pixels are stored column-major; [`File::tile_image`] reshapes them to
//! a row-major image of palette indices on first request and caches the
//! result.

pub mod lookup;
pub mod palette;

use std::sync::LazyLock;

use log::debug;

use crate::codec::{Cursor, Descriptor, Schema, StructValue, decode_struct, encode_struct};

use super::{BloodFileError, FileType};

mod constants {
	/// Size of the atlas header in bytes
	pub const HEADER_SIZE: usize = 16;

	/// Size of one animation record in bytes
	pub const ANIMATION_SIZE: usize = 8;

	/// Highest tile number the engine addresses
	pub const MAX_TILES: usize = 16384;
}

/// Highest tile number the engine addresses.
pub const MAX_TILES: usize = constants::MAX_TILES;

static HEADER_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
	Schema::new("ArtHeader")
		.field("version", Descriptor::U32)
		.field("tile_count", Descriptor::U32)
		.field("tile_start", Descriptor::U32)
		.field("tile_end", Descriptor::U32)
});

static ANIMATION_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
	Schema::new("AnimationData")
		.field("frame_count", Descriptor::Partial { parent_bits: 16, width: 6 })
		.field("kind", Descriptor::Partial { parent_bits: 16, width: 2 })
		.field("speed", Descriptor::Partial { parent_bits: 16, width: 4 })
		.field("view", Descriptor::Partial { parent_bits: 16, width: 3 })
		.field("flags", Descriptor::Partial { parent_bits: 16, width: 1 })
		.field("x_offset", Descriptor::I8)
		.field("y_offset", Descriptor::I8)
		.field("reserved", Descriptor::Bytes(4))
});

/// One tile of an atlas: dimensions, animation metadata, and the lazily
/// materialised row-major image.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
	/// Tile width in pixels
	pub width: u16,
	/// Tile height in pixels
	pub height: u16,
	/// Bit-packed animation metadata
	pub animation: StructValue,
	/// Offset of the pixel body within the atlas's data region
	data_offset: usize,
	/// Cached row-major palette indices
	image: Option<Vec<u8>>,
}

impl Tile {
	/// Returns `true` if the tile has no pixel body.
	pub fn is_empty(&self) -> bool {
		self.width == 0 || self.height == 0
	}

	/// Pixel body size in bytes.
	pub fn body_size(&self) -> usize {
		usize::from(self.width) * usize::from(self.height)
	}
}

/// A parsed ART atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
	version: u32,
	tile_start: u32,
	tile_end: u32,
	tiles: Vec<Tile>,
	/// Pixel bodies, tightly packed from the end of the tables
	data: Vec<u8>,
}

impl File {
	/// Reads an atlas from disk.
	pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, BloodFileError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Parses an atlas from its full byte content.
	pub fn from_bytes(data: &[u8]) -> Result<Self, BloodFileError> {
		if data.len() < constants::HEADER_SIZE {
			return Err(BloodFileError::insufficient_data(
				FileType::Art,
				constants::HEADER_SIZE,
				data.len(),
			));
		}
		let mut cur = Cursor::from_slice(data);
		let header = decode_struct(&HEADER_SCHEMA, &mut cur)?;
		let tile_start = header.int("tile_start") as u32;
		let tile_end = header.int("tile_end") as u32;
		if tile_end < tile_start {
			return Err(BloodFileError::malformed(
				FileType::Art,
				format!("tile range {tile_start}..{tile_end} is inverted"),
			));
		}
		let count = (u64::from(tile_end) - u64::from(tile_start) + 1) as usize;
		if count > constants::MAX_TILES {
			return Err(BloodFileError::malformed(
				FileType::Art,
				format!("tile range {tile_start}..{tile_end} exceeds {} tiles", constants::MAX_TILES),
			));
		}

		let mut widths = Vec::with_capacity(count);
		for _ in 0..count {
			widths.push(cur.read_u16()?);
		}
		let mut heights = Vec::with_capacity(count);
		for _ in 0..count {
			heights.push(cur.read_u16()?);
		}

		let mut tiles = Vec::with_capacity(count);
		let mut offset = 0usize;
		for i in 0..count {
			let animation = decode_struct(&ANIMATION_SCHEMA, &mut cur)?;
			let tile = Tile {
				width: widths[i],
				height: heights[i],
				animation,
				data_offset: offset,
				image: None,
			};
			offset += tile.body_size();
			tiles.push(tile);
		}

		// Everything from here is the packed pixel region.
		let base = cur.position();
		if data.len() < base + offset {
			return Err(BloodFileError::insufficient_data(FileType::Art, base + offset, data.len()));
		}
		debug!("loaded ART tiles {tile_start}..{tile_end}, {offset} pixel bytes");

		Ok(Self {
			version: header.int("version") as u32,
			tile_start,
			tile_end,
			tiles,
			data: data[base..].to_vec(),
		})
	}

	/// First tile number covered by this atlas.
	pub fn tile_start(&self) -> u32 {
		self.tile_start
	}

	/// Last tile number covered by this atlas.
	pub fn tile_end(&self) -> u32 {
		self.tile_end
	}

	/// Returns `true` if the atlas covers the given tile number.
	pub fn has_tile(&self, tile: usize) -> bool {
		(self.tile_start as usize..=self.tile_end as usize).contains(&tile)
	}

	/// The tile with the given global number, if covered.
	pub fn tile(&self, tile: usize) -> Option<&Tile> {
		self.has_tile(tile).then(|| &self.tiles[tile - self.tile_start as usize])
	}

	/// Row-major palette indices of a tile, materialised on first request.
	///
	/// The stored body is column-major (`width` columns of `height`
	/// pixels); the returned image is `height` rows of `width` indices.
	pub fn tile_image(&mut self, tile: usize) -> Result<&[u8], BloodFileError> {
		if !self.has_tile(tile) {
			return Err(BloodFileError::TileNotFound {
				tile,
			});
		}
		let local = tile - self.tile_start as usize;
		let Self {
			tiles,
			data,
			..
		} = self;
		let t = &mut tiles[local];
		let (w, h, off) = (usize::from(t.width), usize::from(t.height), t.data_offset);
		let image = t.image.get_or_insert_with(|| {
			let body = &data[off..off + w * h];
			let mut image = vec![0u8; w * h];
			for c in 0..w {
				for r in 0..h {
					image[r * w + c] = body[c * h + r];
				}
			}
			image
		});
		Ok(image)
	}

	/// Serialises the atlas back to its on-disk form.
	pub fn to_bytes(&self) -> Result<Vec<u8>, BloodFileError> {
		let mut cur = Cursor::empty();
		let mut header = HEADER_SCHEMA.default_value();
		header.set_int("version", i64::from(self.version));
		header.set_int("tile_count", self.tiles.len() as i64);
		header.set_int("tile_start", i64::from(self.tile_start));
		header.set_int("tile_end", i64::from(self.tile_end));
		encode_struct(&HEADER_SCHEMA, &header, &mut cur)?;

		for tile in &self.tiles {
			cur.write_uint(u64::from(tile.width), 2);
		}
		for tile in &self.tiles {
			cur.write_uint(u64::from(tile.height), 2);
		}
		for tile in &self.tiles {
			encode_struct(&ANIMATION_SCHEMA, &tile.animation, &mut cur)?;
		}
		cur.write_bytes(&self.data);
		Ok(cur.into_inner())
	}
}

/// Several atlases addressed as one continuous tile space.
#[derive(Debug, Clone, Default)]
pub struct Manager {
	files: Vec<File>,
}

impl Manager {
	/// Creates an empty manager.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an atlas to the managed set.
	pub fn add(&mut self, file: File) {
		self.files.push(file);
	}

	/// Returns `true` if any atlas covers the tile number.
	pub fn has_tile(&self, tile: usize) -> bool {
		tile < MAX_TILES && self.files.iter().any(|f| f.has_tile(tile))
	}

	/// The tile with the given number, if any atlas covers it.
	pub fn tile(&self, tile: usize) -> Result<&Tile, BloodFileError> {
		self.files
			.iter()
			.find_map(|f| f.tile(tile))
			.ok_or(BloodFileError::TileNotFound {
				tile,
			})
	}

	/// Row-major image of the tile with the given number.
	pub fn tile_image(&mut self, tile: usize) -> Result<(u16, u16, &[u8]), BloodFileError> {
		let slot = self
			.files
			.iter()
			.position(|f| f.has_tile(tile))
			.ok_or(BloodFileError::TileNotFound {
				tile,
			})?;
		let file = &mut self.files[slot];
		let local = tile - file.tile_start as usize;
		let (w, h) = (file.tiles[local].width, file.tiles[local].height);
		Ok((w, h, file.tile_image(tile)?))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Builds an atlas body: tiles 0 and 1, widths (2, 0), heights
	/// (2, 0), pixel bytes 01 02 03 04.
	fn two_tile_atlas() -> Vec<u8> {
		let mut out = Vec::new();
		out.extend_from_slice(&1u32.to_le_bytes()); // version
		out.extend_from_slice(&2u32.to_le_bytes()); // tile_count
		out.extend_from_slice(&0u32.to_le_bytes()); // tile_start
		out.extend_from_slice(&1u32.to_le_bytes()); // tile_end
		out.extend_from_slice(&2u16.to_le_bytes()); // widths
		out.extend_from_slice(&0u16.to_le_bytes());
		out.extend_from_slice(&2u16.to_le_bytes()); // heights
		out.extend_from_slice(&0u16.to_le_bytes());
		out.extend_from_slice(&[0u8; 16]); // two animation records
		out.extend_from_slice(&[1, 2, 3, 4]); // tile 0 body, column-major
		out
	}

	#[test]
	fn column_major_bodies_transpose_to_row_major() {
		let mut art = File::from_bytes(&two_tile_atlas()).unwrap();
		// Columns (1, 2) and (3, 4) become rows (1, 3) and (2, 4).
		assert_eq!(art.tile_image(0).unwrap(), &[1, 3, 2, 4]);
	}

	#[test]
	fn empty_tiles_occupy_zero_body_bytes() {
		let mut art = File::from_bytes(&two_tile_atlas()).unwrap();
		assert!(art.tile(1).unwrap().is_empty());
		assert_eq!(art.tile_image(1).unwrap(), &[] as &[u8]);
		// Tile 1 starts where tile 0 ends; nothing shifted.
		assert_eq!(art.tile(1).unwrap().data_offset, 4);
	}

	#[test]
	fn rejects_hostile_tile_ranges() {
		// An inverted range and a range claiming ~2^32 tiles; both must
		// fail before any table allocation.
		let mut inverted = two_tile_atlas();
		inverted[8..12].copy_from_slice(&9u32.to_le_bytes()); // tile_start
		assert!(matches!(
			File::from_bytes(&inverted),
			Err(BloodFileError::Malformed { .. })
		));

		let mut absurd = two_tile_atlas();
		absurd[12..16].copy_from_slice(&u32::MAX.to_le_bytes()); // tile_end
		assert!(matches!(
			File::from_bytes(&absurd),
			Err(BloodFileError::Malformed { .. })
		));
	}

	#[test]
	fn round_trips_to_identical_bytes() {
		let bytes = two_tile_atlas();
		let art = File::from_bytes(&bytes).unwrap();
		assert_eq!(art.to_bytes().unwrap(), bytes);
	}

	#[test]
	fn shaded_tile_resolves_through_palette() {
		// The identity lookup and a grayscale palette: pixel index i maps
		// to colour (i, i, i, 255) for i < 255.
		let mut art = File::from_bytes(&two_tile_atlas()).unwrap();
		let plu = lookup::Lookup::identity();
		let mut pal_bytes = Vec::with_capacity(palette::Palette::FILE_SIZE);
		for i in 0..256u32 {
			let v = i as u8;
			pal_bytes.extend_from_slice(&[v, v, v]);
		}
		let pal = palette::Palette::from_bytes(&pal_bytes).unwrap();

		let image = art.tile_image(0).unwrap();
		let shaded = plu.translate_image(0, image);
		let colors: Vec<_> = shaded.iter().map(|&i| pal.color(i)).collect();
		assert_eq!(colors[0], palette::Color::new(1, 1, 1, 255));
		assert_eq!(colors[1], palette::Color::new(3, 3, 3, 255));
	}

	#[test]
	fn manager_delegates_by_range() {
		let mut mgr = Manager::new();
		mgr.add(File::from_bytes(&two_tile_atlas()).unwrap());
		assert!(mgr.has_tile(0));
		assert!(!mgr.has_tile(2));
		assert!(!mgr.has_tile(MAX_TILES));
		let (w, h, image) = mgr.tile_image(0).unwrap();
		assert_eq!((w, h), (2, 2));
		assert_eq!(image, &[1, 3, 2, 4]);
		assert!(matches!(mgr.tile(99), Err(BloodFileError::TileNotFound { tile: 99 })));
	}

	#[test]
	fn animation_metadata_unpacks() {
		let mut bytes = two_tile_atlas();
		// Tile 0 animation: frame_count=3, kind=1, speed=2, view=0.
		let stat: u16 = 3 | (1 << 6) | (2 << 8);
		bytes[24..26].copy_from_slice(&stat.to_le_bytes());
		bytes[26] = (-4i8) as u8; // x_offset
		let art = File::from_bytes(&bytes).unwrap();
		let anim = &art.tile(0).unwrap().animation;
		assert_eq!(anim.int("frame_count"), 3);
		assert_eq!(anim.int("kind"), 1);
		assert_eq!(anim.int("speed"), 2);
		assert_eq!(anim.int("x_offset"), -4);
	}
}
