#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First 4 bytes pick the address, the rest is the database
    if data.len() < 4 {
        return;
    }
    let (addr, buffer) = data.split_at(4);
    let addr = u32::from_be_bytes([addr[0], addr[1], addr[2], addr[3]]);

    if let Ok(db) = ip17mon::Database::from_bytes(buffer.to_vec()) {
        let _ = db.find_by_uint(addr);
        let _ = db.range_entry_for(addr);
        if let Ok(text) = std::str::from_utf8(buffer) {
            let _ = db.find(text);
        }
    }
});
