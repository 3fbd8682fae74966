//! Test-only builder for 17mon buffers
//!
//! Lays out the header, bucket table, range table, a zeroed 1024-byte
//! index tail, and a record blob with identical records stored once.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;

const HEADER_LEN: usize = 4;
const BUCKET_TABLE_LEN: usize = 1024;
const RANGE_ENTRY_LEN: usize = 8;
const INDEX_TAIL_LEN: usize = 1024;

/// Assemble a database from (inclusive upper bound, record) pairs.
///
/// Upper bounds must be ascending.
pub fn build(ranges: &[(u32, &str)]) -> Vec<u8> {
    let n = ranges.len();
    let header_offset = HEADER_LEN + BUCKET_TABLE_LEN + n * RANGE_ENTRY_LEN + INDEX_TAIL_LEN;
    let mut data = vec![0u8; header_offset];
    data[..4].copy_from_slice(&(header_offset as u32).to_be_bytes());

    for bucket in 0..256usize {
        let first = (bucket as u32) << 24;
        let start = ranges.partition_point(|&(ub, _)| ub < first);
        let at = HEADER_LEN + bucket * 4;
        data[at..at + 4].copy_from_slice(&(start as u32).to_le_bytes());
    }

    let mut blob: Vec<u8> = Vec::new();
    let mut offsets: HashMap<&str, usize> = HashMap::new();
    for (i, &(ub, record)) in ranges.iter().enumerate() {
        assert!(record.len() <= 255, "record too long: {:?}", record);
        let rel = match offsets.get(record) {
            Some(&rel) => rel,
            None => {
                let rel = blob.len();
                blob.extend_from_slice(record.as_bytes());
                offsets.insert(record, rel);
                rel
            }
        };
        let stored = (rel + 1024) as u32;

        let at = HEADER_LEN + BUCKET_TABLE_LEN + i * RANGE_ENTRY_LEN;
        data[at..at + 4].copy_from_slice(&ub.to_be_bytes());
        data[at + 4..at + 7].copy_from_slice(&stored.to_le_bytes()[..3]);
        data[at + 7] = record.len() as u8;
    }

    data.extend_from_slice(&blob);
    data
}

/// A small full-coverage dataset shaped like the real thing
pub fn sample_ranges() -> Vec<(u32, &'static str)> {
    vec![
        (ip("0.255.255.255"), "保留地址\t保留地址\t\t\t"),
        (ip("1.0.0.255"), "澳大利亚\t澳大利亚\t\t\t"),
        (ip("1.0.3.255"), "中国\t福建\t福州\t\t电信"),
        (ip("114.255.255.255"), "中国\t北京\t北京\t\t联通"),
        (ip("115.231.223.255"), "中国\t浙江\t杭州\t\t电信"),
        (ip("115.231.255.255"), "中国\t浙江\t\t\t电信/DX"),
        (ip("115.255.255.255"), "中国\t上海\t上海\t\t电信"),
        (ip("223.255.255.255"), "中国\t\t\t\tChinaNet/extra"),
        (ip("255.255.255.255"), "\t\t\t\t"),
    ]
}

pub fn sample() -> Vec<u8> {
    build(&sample_ranges())
}

/// `count` evenly spaced ranges cycling through a handful of records
pub fn synthetic(count: usize) -> Vec<u8> {
    let records: Vec<String> = (0..64)
        .map(|i| format!("country{}\tregion{}\tcity{}\t\tisp{}/x", i % 7, i % 13, i, i % 5))
        .collect();
    let ranges: Vec<(u32, &str)> = (0..count)
        .map(|i| {
            let ub = (((i as u64 + 1) << 32) / count as u64 - 1) as u32;
            (ub, records[i % records.len()].as_str())
        })
        .collect();
    build(&ranges)
}

pub fn ip(s: &str) -> u32 {
    u32::from(s.parse::<std::net::Ipv4Addr>().unwrap())
}

pub fn write_temp(data: &[u8], suffix: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(suffix).unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    file
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
