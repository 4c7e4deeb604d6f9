//! RFF archive round trips through the public API.

use anyhow::Result;
use blood_rs::prelude::*;
use log::info;

fn build_archive() -> RffFile {
	let mut rff = RffFile::new(0x0301);
	rff.add_entry("E1M1", "MAP", vec![1, 2, 3, 4]);
	rff.add_entry("TILES000", "ART", vec![5; 300]);
	rff.add_entry("CULTIST", "SEQ", vec![9, 8, 7]);
	rff
}

#[test]
fn entry_set_survives_a_round_trip() -> Result<()> {
	crate::init_logs();

	let rff = build_archive();
	let bytes = rff.to_bytes()?;
	let reloaded = RffFile::from_bytes(bytes)?;
	info!("archive: {} entries", reloaded.entry_count());

	assert_eq!(reloaded.entry_count(), rff.entry_count());
	for entry in rff.entries() {
		let name = entry.full_name();
		let original = rff.data_for_entry(&name)?;
		let restored = reloaded.data_for_entry(&name)?;
		assert_eq!(original, restored, "{name} body changed");
	}
	Ok(())
}

#[test]
fn reserialising_an_unmodified_archive_is_byte_identical() -> Result<()> {
	crate::init_logs();

	let bytes = build_archive().to_bytes()?;
	let reloaded = RffFile::from_bytes(bytes.clone())?;
	assert_eq!(reloaded.to_bytes()?, bytes);
	Ok(())
}

#[test]
fn glob_and_index_lookups_agree() -> Result<()> {
	crate::init_logs();

	let rff = build_archive();
	assert_eq!(rff.find_matching_entries("*.SEQ"), vec!["CULTIST.SEQ"]);
	assert_eq!(rff.data_for_entry_by_index("seq", 0)?, vec![9, 8, 7]);
	assert!(matches!(
		rff.data_for_entry_by_index("SEQ", 1),
		Err(BloodFileError::EntryNotFound { .. })
	));
	Ok(())
}
