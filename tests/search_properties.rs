//! Property tests for the two-level search
//!
//! For any ascending set of upper bounds, a lookup must land on the
//! leftmost range whose upper bound is `>= ip`.

mod common;

use common::build;
use ip17mon::Database;
use proptest::prelude::*;

/// Sorted, distinct upper bounds ending at 255.255.255.255
fn upper_bounds() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(any::<u32>(), 0..200).prop_map(|mut bounds| {
        bounds.push(u32::MAX);
        bounds.sort_unstable();
        bounds.dedup();
        bounds
    })
}

/// Bounds clustered inside a few /8s, which stresses bucket starts
fn clustered_upper_bounds() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec((0u32..4, any::<u32>()), 1..200).prop_map(|pairs| {
        let mut bounds: Vec<u32> = pairs
            .into_iter()
            .map(|(top, low)| ((top * 60 + 10) << 24) | (low & 0x00FF_FFFF))
            .collect();
        bounds.push(u32::MAX);
        bounds.sort_unstable();
        bounds.dedup();
        bounds
    })
}

fn database_for(bounds: &[u32]) -> (Database, Vec<String>) {
    let records: Vec<String> = (0..bounds.len()).map(|i| format!("R{}\t\t\t\t", i)).collect();
    let ranges: Vec<(u32, &str)> = bounds
        .iter()
        .zip(&records)
        .map(|(&ub, record)| (ub, record.as_str()))
        .collect();
    (Database::from_bytes(build(&ranges)).unwrap(), records)
}

fn assert_partition(db: &Database, bounds: &[u32], addr: u32) -> Result<(), TestCaseError> {
    let expected = bounds.partition_point(|&ub| ub < addr);
    let entry = db.range_entry_for(addr).unwrap();
    prop_assert_eq!(entry.ordinal(), expected);

    let start = db.bucket_start(addr);
    prop_assert!(entry.position >= start);
    prop_assert!(entry.position <= db.header().max_range_end);

    let info = db.find_by_uint(addr).unwrap();
    prop_assert_eq!(info.country, format!("R{}", expected));
    Ok(())
}

proptest! {
    #[test]
    fn lookup_finds_leftmost_covering_range(
        bounds in upper_bounds(),
        addrs in prop::collection::vec(any::<u32>(), 1..32),
    ) {
        let (db, _) = database_for(&bounds);
        for addr in addrs {
            assert_partition(&db, &bounds, addr)?;
        }
    }

    #[test]
    fn range_edges_resolve_exactly(bounds in clustered_upper_bounds()) {
        let (db, _) = database_for(&bounds);
        let mut lower = 0u32;
        for &upper in &bounds {
            assert_partition(&db, &bounds, lower)?;
            assert_partition(&db, &bounds, upper)?;
            lower = upper.wrapping_add(1);
        }
    }

    #[test]
    fn lookups_are_pure(bounds in upper_bounds(), addr in any::<u32>()) {
        let (db, _) = database_for(&bounds);
        let first = db.find_by_uint(addr).unwrap();
        prop_assert_eq!(db.find_by_uint(addr).unwrap(), first);
    }
}
