//! Shade lookup (`*.PLU`) support.
//!
//! A lookup maps `(shade, palette index)` to a darkened palette index:
//! 64 rows of 256 bytes. Column 255 of every row is forced to 255 after
//! load so the transparent index survives shading.

use crate::file::{BloodFileError, FileType};

/// A 64-row shade translation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
	rows: Vec<[u8; Lookup::ROW_SIZE]>,
}

impl Lookup {
	/// Number of shade rows
	pub const SHADE_COUNT: usize = 64;

	/// Entries per row, one per palette index
	pub const ROW_SIZE: usize = 256;

	/// Size of a `*.PLU` file in bytes
	pub const FILE_SIZE: usize = Self::SHADE_COUNT * Self::ROW_SIZE;

	/// The identity table: every shade maps every index to itself,
	/// which leaves images untouched.
	pub fn identity() -> Self {
		let mut row = [0u8; Self::ROW_SIZE];
		for (i, v) in row.iter_mut().enumerate() {
			*v = i as u8;
		}
		Self {
			rows: vec![row; Self::SHADE_COUNT],
		}
	}

	/// Loads a lookup from the 16384-byte `*.PLU` body.
	pub fn from_bytes(data: &[u8]) -> Result<Self, BloodFileError> {
		if data.len() < Self::FILE_SIZE {
			return Err(BloodFileError::insufficient_data(
				FileType::Lookup,
				Self::FILE_SIZE,
				data.len(),
			));
		}
		let mut rows = Vec::with_capacity(Self::SHADE_COUNT);
		for r in 0..Self::SHADE_COUNT {
			let mut row = [0u8; Self::ROW_SIZE];
			row.copy_from_slice(&data[r * Self::ROW_SIZE..(r + 1) * Self::ROW_SIZE]);
			// Transparency must survive shading.
			row[Self::ROW_SIZE - 1] = 255;
			rows.push(row);
		}
		Ok(Self {
			rows,
		})
	}

	/// Translates a palette index under the given shade. Shades clamp to
	/// the darkest row.
	pub fn translate(&self, shade: usize, index: u8) -> u8 {
		let row = shade.min(Self::SHADE_COUNT - 1);
		self.rows[row][usize::from(index)]
	}

	/// Translates a whole image of palette indices under one shade.
	pub fn translate_image(&self, shade: usize, indices: &[u8]) -> Vec<u8> {
		indices.iter().map(|&i| self.translate(shade, i)).collect()
	}
}
