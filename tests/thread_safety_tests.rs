//! Concurrent read-only queries against one shared database

mod common;

use ip17mon::{Database, LocationInfo};
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_lookups_match_sequential() {
    let db = Arc::new(Database::from_bytes(common::synthetic(10_000)).unwrap());

    let addrs: Vec<u32> = (0..4_000u32).map(|i| i.wrapping_mul(2_654_435_761)).collect();
    let expected: Vec<LocationInfo> = addrs.iter().map(|&a| db.find_by_uint(a).unwrap()).collect();
    let addrs = Arc::new(addrs);
    let expected = Arc::new(expected);

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let db = Arc::clone(&db);
            let addrs = Arc::clone(&addrs);
            let expected = Arc::clone(&expected);
            thread::spawn(move || {
                // each thread walks the addresses from a different starting point
                for i in 0..addrs.len() {
                    let idx = (i + t * 500) % addrs.len();
                    let info = db.find_by_uint(addrs[idx]).unwrap();
                    assert_eq!(info, expected[idx]);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("lookup thread panicked");
    }
}

#[test]
fn test_scoped_threads_share_reference() {
    let db = Database::from_bytes(common::sample()).unwrap();

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..1_000 {
                    assert_eq!(db.find("115.231.237.124").unwrap().region, "浙江");
                }
            });
        }
    });
}
