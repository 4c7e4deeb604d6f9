//! Type descriptor tables.
//!
//! The editor labels sector, wall, and sprite type codes with names and
//! property lists so the UI can render e.g. "Z Motion" instead of a raw
//! number. The tables live in YAML next to the executable and are loaded
//! once per process into read-only globals.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use log::info;
use serde::{Deserialize, Serialize};

use super::error::{BloodFileError, FileType};

/// How a property's raw bits should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
	/// A plain number
	Int,
	/// A single bit rendered as a checkbox
	Bool,
	/// A sound id resolved against the sound table
	Sound,
	/// An index into `values`
	Enum,
}

/// One editable property of a typed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
	/// Label shown in the editor
	pub name: String,
	/// Presentation kind
	pub kind: PropertyKind,
	/// Extra-data member the property reads and writes
	pub source_field: String,
	/// Bit offset within the member, for properties narrower than it
	#[serde(default)]
	pub bit_offset: u8,
	/// Labels for [`PropertyKind::Enum`] properties, by index
	#[serde(default)]
	pub values: Vec<String>,
}

/// One record type: a code, a display name, and its properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
	/// Type code as stored in the record's first tag
	pub code: u16,
	/// Display name
	pub name: String,
	/// Editable properties
	#[serde(default)]
	pub properties: Vec<PropertyDescriptor>,
}

static SECTOR_TYPES: OnceLock<BTreeMap<u16, TypeDescriptor>> = OnceLock::new();
static WALL_TYPES: OnceLock<BTreeMap<u16, TypeDescriptor>> = OnceLock::new();
static SPRITE_TYPES: OnceLock<BTreeMap<u16, TypeDescriptor>> = OnceLock::new();

/// Parses one YAML table into a code-keyed map. Duplicate codes are an
/// error rather than a silent overwrite.
pub fn parse_table(yaml: &str) -> Result<BTreeMap<u16, TypeDescriptor>, BloodFileError> {
	let entries: Vec<TypeDescriptor> = serde_yaml::from_str(yaml)?;
	let mut table = BTreeMap::new();
	for entry in entries {
		let code = entry.code;
		if table.insert(code, entry).is_some() {
			return Err(BloodFileError::malformed(
				FileType::Tables,
				format!("duplicate type code {code}"),
			));
		}
	}
	Ok(table)
}

/// Parses and installs all three tables. May only be called once per
/// process; a partial earlier load never sticks, because all three
/// documents are parsed before any global is set.
pub fn load_tables(sectors: &str, walls: &str, sprites: &str) -> Result<(), BloodFileError> {
	if SECTOR_TYPES.get().is_some() || WALL_TYPES.get().is_some() || SPRITE_TYPES.get().is_some() {
		return Err(BloodFileError::TablesAlreadyLoaded);
	}
	let sectors = parse_table(sectors)?;
	let walls = parse_table(walls)?;
	let sprites = parse_table(sprites)?;
	info!(
		"loaded descriptor tables: {} sector, {} wall, {} sprite types",
		sectors.len(),
		walls.len(),
		sprites.len()
	);
	// A racing second load can still win one of these; report it.
	if SECTOR_TYPES.set(sectors).is_err()
		|| WALL_TYPES.set(walls).is_err()
		|| SPRITE_TYPES.set(sprites).is_err()
	{
		return Err(BloodFileError::TablesAlreadyLoaded);
	}
	Ok(())
}

/// All sector types, empty until [`load_tables`] runs.
pub fn sector_types() -> Option<&'static BTreeMap<u16, TypeDescriptor>> {
	SECTOR_TYPES.get()
}

/// Looks up one sector type.
pub fn sector_type(code: u16) -> Option<&'static TypeDescriptor> {
	SECTOR_TYPES.get()?.get(&code)
}

/// All wall types, empty until [`load_tables`] runs.
pub fn wall_types() -> Option<&'static BTreeMap<u16, TypeDescriptor>> {
	WALL_TYPES.get()
}

/// Looks up one wall type.
pub fn wall_type(code: u16) -> Option<&'static TypeDescriptor> {
	WALL_TYPES.get()?.get(&code)
}

/// All sprite types, empty until [`load_tables`] runs.
pub fn sprite_types() -> Option<&'static BTreeMap<u16, TypeDescriptor>> {
	SPRITE_TYPES.get()
}

/// Looks up one sprite type.
pub fn sprite_type(code: u16) -> Option<&'static TypeDescriptor> {
	SPRITE_TYPES.get()?.get(&code)
}

#[cfg(test)]
mod tests {
	use super::*;

	const SECTORS_YAML: &str = r"
- code: 600
  name: Z Motion
  properties:
    - name: Off Z
      kind: int
      source_field: off_floor_z
    - name: Locked
      kind: bool
      source_field: locked
- code: 602
  name: Z Motion Sprite
";

	#[test]
	fn parses_a_table() {
		let table = parse_table(SECTORS_YAML).unwrap();
		assert_eq!(table.len(), 2);
		let z_motion = &table[&600];
		assert_eq!(z_motion.name, "Z Motion");
		assert_eq!(z_motion.properties.len(), 2);
		assert_eq!(z_motion.properties[0].kind, PropertyKind::Int);
		assert_eq!(z_motion.properties[0].source_field, "off_floor_z");
		assert_eq!(z_motion.properties[1].kind, PropertyKind::Bool);
		assert!(table[&602].properties.is_empty());
	}

	#[test]
	fn enum_values_and_bit_offsets_deserialize() {
		let yaml = r"
- code: 1
  name: Switch
  properties:
    - name: Wave
      kind: enum
      source_field: wave
      bit_offset: 2
      values: [Sine, Linear, SlowOff, SlowOn]
";
		let table = parse_table(yaml).unwrap();
		let prop = &table[&1].properties[0];
		assert_eq!(prop.kind, PropertyKind::Enum);
		assert_eq!(prop.bit_offset, 2);
		assert_eq!(prop.values.len(), 4);
	}

	#[test]
	fn rejects_duplicate_codes() {
		let yaml = "
- code: 5
  name: A
- code: 5
  name: B
";
		assert!(matches!(
			parse_table(yaml),
			Err(BloodFileError::Malformed { .. })
		));
	}

	#[test]
	fn rejects_unknown_kinds() {
		let yaml = "
- code: 5
  name: A
  properties:
    - name: P
      kind: float
      source_field: x
";
		assert!(matches!(parse_table(yaml), Err(BloodFileError::Yaml(_))));
	}

	// Touches the process-wide globals, so everything lives in one test.
	#[test]
	fn globals_load_once() {
		assert!(sector_types().is_none());
		load_tables(SECTORS_YAML, "[]", "- {code: 20, name: Toggle Switch}").unwrap();
		assert_eq!(sector_type(600).unwrap().name, "Z Motion");
		assert!(wall_types().unwrap().is_empty());
		assert_eq!(sprite_type(20).unwrap().name, "Toggle Switch");
		assert!(sprite_type(21).is_none());
		assert!(matches!(
			load_tables("[]", "[]", "[]"),
			Err(BloodFileError::TablesAlreadyLoaded)
		));
	}
}
