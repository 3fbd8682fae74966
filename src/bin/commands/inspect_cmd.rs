use anyhow::Result;
use serde_json::json;
use std::net::Ipv4Addr;
use std::path::PathBuf;

use super::open_database;

pub fn cmd_inspect(database: PathBuf, json_output: bool) -> Result<()> {
    let db = open_database(&database, false)?;

    let header = db.header();
    let buckets = db.buckets();
    // buckets whose window holds at least one entry of their own
    let populated = (0..buckets.len())
        .filter(|&b| {
            let next = buckets.get(b + 1).copied().unwrap_or(db.range_count() as u32);
            next > buckets[b]
        })
        .count();
    let first = db.ranges().next();
    let last = db.ranges().last();

    if json_output {
        let output = json!({
            "file": database.display().to_string(),
            "storage": db.storage_kind().to_string(),
            "size": db.len(),
            "header_offset": header.header_offset,
            "search_window_end": header.max_range_end,
            "range_count": db.range_count(),
            "record_blob_size": db.record_blob_len(),
            "populated_buckets": populated,
            "first_upper_bound": first.map(|e| Ipv4Addr::from(e.upper_bound).to_string()),
            "last_upper_bound": last.map(|e| Ipv4Addr::from(e.upper_bound).to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Database:       {}", database.display());
        println!("Storage:        {}", db.storage_kind());
        println!("Size:           {} bytes", db.len());
        println!();
        println!("Layout:");
        println!("  Header offset:   {}", header.header_offset);
        println!("  Window end:      {}", header.max_range_end);
        println!("  Range entries:   {}", db.range_count());
        println!("  Record blob:     {} bytes", db.record_blob_len());
        println!("  Buckets in use:  {}/{}", populated, buckets.len());
        if let (Some(first), Some(last)) = (first, last) {
            println!(
                "  Upper bounds:    {} .. {}",
                Ipv4Addr::from(first.upper_bound),
                Ipv4Addr::from(last.upper_bound)
            );
        }
    }

    Ok(())
}
