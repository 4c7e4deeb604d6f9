//! ART atlas round trips and image resolution.

use anyhow::Result;
use blood_rs::prelude::*;
use log::info;

/// Tiles 64 and 65: a 2x3 tile and an empty one.
fn build_atlas() -> Vec<u8> {
	let mut out = Vec::new();
	out.extend_from_slice(&1u32.to_le_bytes()); // version
	out.extend_from_slice(&2u32.to_le_bytes()); // tile_count
	out.extend_from_slice(&64u32.to_le_bytes()); // tile_start
	out.extend_from_slice(&65u32.to_le_bytes()); // tile_end
	out.extend_from_slice(&2u16.to_le_bytes()); // widths
	out.extend_from_slice(&0u16.to_le_bytes());
	out.extend_from_slice(&3u16.to_le_bytes()); // heights
	out.extend_from_slice(&0u16.to_le_bytes());
	out.extend_from_slice(&[0u8; 16]); // animation records
	out.extend_from_slice(&[10, 11, 12, 20, 21, 22]); // tile 64, column-major
	out
}

#[test]
fn atlas_reserialises_byte_identical() -> Result<()> {
	crate::init_logs();

	let bytes = build_atlas();
	let mut art = ArtFile::from_bytes(&bytes)?;
	// Materialising an image must not disturb the stored bytes.
	let _ = art.tile_image(64)?;
	assert_eq!(art.to_bytes()?, bytes);
	Ok(())
}

#[test]
fn manager_resolves_tiles_across_atlases() -> Result<()> {
	crate::init_logs();

	let mut manager = ArtManager::new();
	manager.add(ArtFile::from_bytes(&build_atlas())?);
	info!("atlas covers tiles 64..=65");

	assert!(manager.has_tile(64));
	assert!(!manager.has_tile(63));
	let (width, height, image) = manager.tile_image(64)?;
	assert_eq!((width, height), (2, 3));
	// Columns become rows.
	assert_eq!(image, &[10, 20, 11, 21, 12, 22]);
	assert!(matches!(
		manager.tile_image(1000),
		Err(BloodFileError::TileNotFound { tile: 1000 })
	));
	Ok(())
}

#[test]
fn shaded_pixels_resolve_to_colors() -> Result<()> {
	crate::init_logs();

	let mut palette_bytes = vec![0u8; 768];
	for i in 0..256 {
		// BGR on disk, brightness == index.
		palette_bytes[i * 3] = i as u8;
		palette_bytes[i * 3 + 1] = i as u8;
		palette_bytes[i * 3 + 2] = i as u8;
	}
	let palette = Palette::from_bytes(&palette_bytes)?;
	let lookup = Lookup::identity();

	let mut art = ArtFile::from_bytes(&build_atlas())?;
	let image = art.tile_image(64)?;
	let shaded = lookup.translate_image(0, image);
	let first = palette.color(shaded[0]);
	assert_eq!((first.r, first.g, first.b), (10, 10, 10));
	Ok(())
}
