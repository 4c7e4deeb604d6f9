//! File type support for the `blood-rs` project.

mod error;

pub mod art;
pub mod map;
pub mod rff;
pub mod seq;
pub mod tables;

// Re-export unified error type
pub use error::{BloodFileError, FileType};

// Re-export main file types
pub use art::{
	File as ArtFile, Manager as ArtManager, Tile, lookup::Lookup, palette::Color,
	palette::Palette,
};
pub use map::{File as MapFile, Sector, Sprite, Wall};
pub use rff::{Entry as RffEntry, File as RffFile};
pub use seq::{Bucket as SeqBucket, File as SeqFile, Slot as SeqSlot};
pub use tables::{PropertyDescriptor, PropertyKind, TypeDescriptor};
