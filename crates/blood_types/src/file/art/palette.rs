//! Game palette support.
//!
//! A `*.PAL` entry holds 256 three-byte colour triples in **B, G, R**
//! order. Index 255 is the engine's transparent colour.

use std::fmt;

use crate::file::{BloodFileError, FileType};

/// RGBA colour representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
	/// Red component (0-255)
	pub r: u8,
	/// Green component (0-255)
	pub g: u8,
	/// Blue component (0-255)
	pub b: u8,
	/// Alpha component (0-255)
	pub a: u8,
}

impl Color {
	/// Creates a new RGBA colour.
	pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
		Self {
			r,
			g,
			b,
			a,
		}
	}

	/// Creates a new RGB colour with full opacity.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self::new(r, g, b, 255)
	}

	/// Creates a new grayscale colour.
	pub const fn gray(value: u8) -> Self {
		Self::rgb(value, value, value)
	}

	/// Creates a transparent black colour.
	pub const fn transparent() -> Self {
		Self::new(0, 0, 0, 0)
	}
}

impl Default for Color {
	fn default() -> Self {
		Self::transparent()
	}
}

impl fmt::Display for Color {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "RGBA({}, {}, {}, {})", self.r, self.g, self.b, self.a)
	}
}

/// The 256-colour game palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
	colors: [Color; 256],
}

impl Palette {
	/// Number of palette entries
	pub const COLOR_COUNT: usize = 256;

	/// Size of a `*.PAL` file in bytes (256 colours × 3 bytes)
	pub const FILE_SIZE: usize = Self::COLOR_COUNT * 3;

	/// Palette index reserved for transparency
	pub const TRANSPARENT_INDEX: usize = 255;

	/// Loads a palette from the 768-byte `*.PAL` body. Triples are
	/// stored B, G, R; alpha becomes 255 everywhere except the
	/// transparent index.
	pub fn from_bytes(data: &[u8]) -> Result<Self, BloodFileError> {
		if data.len() < Self::FILE_SIZE {
			return Err(BloodFileError::insufficient_data(
				FileType::Palette,
				Self::FILE_SIZE,
				data.len(),
			));
		}
		let mut colors = [Color::transparent(); Self::COLOR_COUNT];
		for (i, color) in colors.iter_mut().enumerate() {
			let b = data[i * 3];
			let g = data[i * 3 + 1];
			let r = data[i * 3 + 2];
			let a = if i == Self::TRANSPARENT_INDEX { 0 } else { 255 };
			*color = Color::new(r, g, b, a);
		}
		Ok(Self {
			colors,
		})
	}

	/// Serialises the palette back to its 768-byte B, G, R form.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(Self::FILE_SIZE);
		for color in &self.colors {
			out.push(color.b);
			out.push(color.g);
			out.push(color.r);
		}
		out
	}

	/// The colour at a palette index.
	pub fn color(&self, index: u8) -> Color {
		self.colors[usize::from(index)]
	}

	/// All 256 colours.
	pub fn colors(&self) -> &[Color; 256] {
		&self.colors
	}
}
