//! MAP level round trips through the public API.

use anyhow::Result;
use blood_rs::file::map::{fix_sectors, headers, records, xdata};
use blood_rs::prelude::*;
use log::info;

/// Encodes a two-sector encrypted map; sector 1 carries extra data.
fn build_level(revisions: i32) -> Result<Vec<u8>> {
	let mut cur = Cursor::empty();

	let mut ident = headers::IDENT.default_value();
	ident.set("magic", Value::Bytes(headers::MAGIC.to_vec()));
	ident.set_int("version_minor", 0);
	ident.set_int("version_major", 7);
	blood_rs::codec::encode_struct(&headers::IDENT, &ident, &mut cur)?;

	let mut player_start = headers::PLAYER_START.default_value();
	player_start.set_int("x", 102_400);
	player_start.set_int("angle", 512);

	let mut signature_block = headers::SIGNATURE_BLOCK.default_value();
	signature_block.set_int("signature", i64::from(headers::SIGNATURE));

	let mut counts = headers::COUNTS.default_value();
	counts.set_int("revisions", i64::from(revisions));
	counts.set_int("sector_count", 2);

	let notes = headers::NOTES.default_value();

	let blocks = [
		(&*headers::PLAYER_START, &player_start),
		(&*headers::SIGNATURE_BLOCK, &signature_block),
		(&*headers::COUNTS, &counts),
		(&*headers::NOTES, &notes),
	];
	for ((schema, value), key) in blocks.iter().zip(headers::HEADER_KEYS) {
		blood_rs::codec::encode_struct_encrypted(schema, value, &mut cur, key)?;
	}

	let key = (revisions as u32).wrapping_mul(records::SECTOR_SIZE as u32) as u8;
	let mut plain = records::BUILD_SECTOR.default_value();
	plain.set_int("floor_z", 0x4000);
	blood_rs::codec::encode_struct_encrypted(&records::BUILD_SECTOR, &plain, &mut cur, key)?;

	let mut wired = records::BUILD_SECTOR.default_value();
	if let Some(Value::List(tags)) = wired.get_mut("tags") {
		tags[0] = Value::Int(600);
		tags[2] = Value::Int(1);
	}
	blood_rs::codec::encode_struct_encrypted(&records::BUILD_SECTOR, &wired, &mut cur, key)?;
	let mut data = xdata::BLOOD_SECTOR_DATA.default_value();
	data.set_int("tx_id", 33);
	data.set_int("trigger_on", 1);
	blood_rs::codec::encode_struct(&xdata::BLOOD_SECTOR_DATA, &data, &mut cur)?;

	Ok(cur.into_inner())
}

#[test]
fn saving_changes_only_the_revision() -> Result<()> {
	crate::init_logs();

	let bytes = build_level(9)?;
	let mut map = MapFile::from_bytes(&bytes)?;
	assert_eq!(map.revisions(), 9);

	let saved = map.to_bytes()?;
	let reloaded = MapFile::from_bytes(&saved)?;
	info!("resaved at revision {}", reloaded.revisions());

	assert_eq!(reloaded.revisions(), 10);
	assert!(reloaded.player_start().diff(map.player_start()).is_empty());
	assert_eq!(reloaded.sectors().len(), map.sectors().len());
	for (a, b) in reloaded.sectors().iter().zip(map.sectors()) {
		assert!(a.build.diff(&b.build).is_empty());
		assert_eq!(a.data, b.data);
	}
	Ok(())
}

#[test]
fn wired_sectors_keep_their_extra_data() -> Result<()> {
	crate::init_logs();

	let map = MapFile::from_bytes(&build_level(1)?)?;
	let wired = &map.sectors()[1];
	assert_eq!(wired.build.list("tags")[0], Value::Int(600));
	let data = wired.data.as_ref().expect("sector 1 is wired");
	assert_eq!(data.int("tx_id"), 33);
	assert_eq!(data.int("trigger_on"), 1);
	assert!(map.sectors()[0].data.is_none());
	Ok(())
}

#[test]
fn fixup_reconciles_tags_and_data() -> Result<()> {
	crate::init_logs();

	let mut map = MapFile::from_bytes(&build_level(1)?)?;
	// Orphan sector 1's data, then let the fixer repair it.
	if let Some(Value::List(tags)) = map.sectors_mut()[1].build.get_mut("tags") {
		tags[2] = Value::Int(0);
	}
	let fixed = fix_sectors(map.sectors_mut(), 4);
	assert_eq!(fixed, 1);
	assert!(map.sectors()[1].data.is_none());

	// A resave of the repaired map parses cleanly.
	let reloaded = MapFile::from_bytes(&map.to_bytes()?)?;
	assert!(reloaded.sectors()[1].data.is_none());
	Ok(())
}
