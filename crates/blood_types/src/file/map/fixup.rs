//! Sector extra-data repair.
//!
//! Hand-edited maps drift: a sector's third tag may claim extra data the
//! record no longer carries, or carry data its tag disowns. The fixer
//! makes each sector's `data` agree with its tag, inserting a default
//! record or dropping the stale one.

use log::trace;

use super::{Sector, xdata};

/// Makes one sector's extra data agree with its tag. Returns `true` if
/// the sector was changed.
pub fn fix_sector(sector: &mut Sector) -> bool {
	match (sector.wants_data(), sector.data.is_some()) {
		(true, false) => {
			sector.data = Some(xdata::BLOOD_SECTOR_DATA.default_value());
			true
		}
		(false, true) => {
			sector.data = None;
			true
		}
		_ => false,
	}
}

/// Repairs every sector, splitting the work across `workers` threads.
/// Returns the number of sectors changed. With `workers <= 1` the pass
/// runs on the calling thread.
pub fn fix_sectors(sectors: &mut [Sector], workers: usize) -> usize {
	if sectors.is_empty() {
		return 0;
	}
	if workers <= 1 {
		return sectors.iter_mut().map(|s| fix_sector(s)).filter(|&c| c).count();
	}

	let chunk = sectors.len().div_ceil(workers);
	std::thread::scope(|scope| {
		let mut handles = Vec::with_capacity(workers);
		for (i, slice) in sectors.chunks_mut(chunk).enumerate() {
			handles.push(scope.spawn(move || {
				let fixed = slice.iter_mut().map(|s| fix_sector(s)).filter(|&c| c).count();
				trace!("fixup worker {i}: {fixed} of {} sectors", slice.len());
				fixed
			}));
		}
		handles.into_iter().map(|h| h.join().unwrap_or(0)).sum()
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::codec::Value;
	use crate::file::map::records;

	fn sector(tag: i64, with_data: bool) -> Sector {
		let mut build = records::BUILD_SECTOR.default_value();
		if let Some(Value::List(tags)) = build.get_mut("tags") {
			tags[2] = Value::Int(tag);
		}
		let data = with_data.then(|| xdata::BLOOD_SECTOR_DATA.default_value());
		Sector { build, data }
	}

	#[test]
	fn inserts_missing_data() {
		let mut s = sector(3, false);
		assert!(fix_sector(&mut s));
		assert!(s.data.is_some());
	}

	#[test]
	fn drops_stale_data() {
		let mut s = sector(0, true);
		assert!(fix_sector(&mut s));
		assert!(s.data.is_none());
	}

	#[test]
	fn leaves_consistent_sectors_alone() {
		let mut s = sector(3, true);
		assert!(!fix_sector(&mut s));
		let mut s = sector(-1, false);
		assert!(!fix_sector(&mut s));
	}

	#[test]
	fn sequential_pass_counts_only_changed_sectors() {
		let mut sectors = vec![
			sector(3, false), // inserts
			sector(3, true),  // consistent
			sector(0, true),  // drops
			sector(-1, false),
		];
		assert_eq!(fix_sectors(&mut sectors, 1), 2);
		assert!(sectors[0].data.is_some());
		assert!(sectors[2].data.is_none());
	}

	#[test]
	fn parallel_pass_matches_sequential() {
		let make = || -> Vec<Sector> {
			(0..64)
				.map(|i| sector(i % 3 - 1, i % 2 == 0))
				.collect()
		};
		let mut sequential = make();
		let mut parallel = make();
		let a = fix_sectors(&mut sequential, 1);
		let b = fix_sectors(&mut parallel, 4);
		assert_eq!(a, b);
		for (s, p) in sequential.iter().zip(&parallel) {
			assert_eq!(s.data.is_some(), p.data.is_some());
		}
	}

	#[test]
	fn empty_slice_is_a_no_op() {
		assert_eq!(fix_sectors(&mut [], 8), 0);
	}
}
