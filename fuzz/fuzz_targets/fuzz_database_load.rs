#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Loading, probing and validating garbage must never panic
    if let Ok(db) = ip17mon::Database::from_bytes(data.to_vec()) {
        for addr in [0u32, 1, 0x7F00_0001, 0x8000_0000, u32::MAX] {
            let _ = db.find_by_uint(addr);
        }
        let _ = db.fall_through_entry();
        let _ = db.ranges().count();
    }
    let _ = ip17mon::validation::validate_bytes(data.to_vec());
});
