use anyhow::{Context, Result};
use serde_json::json;
use std::path::PathBuf;

use super::{location_json, open_database};

pub fn cmd_query(
    database: PathBuf,
    ips: Vec<String>,
    json_output: bool,
    quiet: bool,
    in_memory: bool,
) -> Result<()> {
    let db = open_database(&database, in_memory)?;

    let mut any_invalid = false;
    let mut results = Vec::with_capacity(ips.len());

    for ip in &ips {
        match db.find(ip) {
            Ok(info) => {
                if json_output {
                    results.push(location_json(ip, &info)?);
                } else if !quiet {
                    println!("{}\t{}", ip, info);
                }
            }
            Err(e) if e.is_recoverable() => {
                any_invalid = true;
                if json_output {
                    results.push(json!({ "ip": ip, "error": e.to_string() }));
                } else if !quiet {
                    eprintln!("{}: {}", ip, e);
                }
            }
            // corruption: stop trusting this database
            Err(e) => return Err(e).with_context(|| format!("Query failed for: {}", ip)),
        }
    }

    if json_output && !quiet {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    if any_invalid {
        std::process::exit(1);
    }
    Ok(())
}
