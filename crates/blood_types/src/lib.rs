//! This crate provides the codec framework and file format support for the `blood-rs` project.
//!
//! # File Formats
//!
//! - **RFF**: Indexed resource bundles holding named, optionally obfuscated entries
//! - **ART**: Paletted tile atlases with per-tile animation metadata
//! - **MAP**: Playable levels made of sectors, walls, and sprites
//! - **SEQ**: Tile animation sequences played at a fixed tick cadence
//!
//! All formats are built on the declarative record codec in [`codec`]: a
//! schema describes the byte-exact layout of a record (including sub-byte
//! bitfields) and both the reader and the writer walk the same schema, so
//! every format round-trips bit for bit.
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```no_run
//! use blood_types::prelude::*;
//!
//! # fn main() -> Result<(), BloodFileError> {
//! let rff = RffFile::open("BLOOD.RFF")?;
//! let map = MapFile::from_bytes(&rff.data_for_entry("E1M1.MAP")?)?;
//! println!("{} sectors", map.sectors().len());
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod file;

/// `use blood_types::prelude::*;` to import commonly used items.
pub mod prelude;
