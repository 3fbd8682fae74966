use anyhow::{Context, Result};
use ip17mon::file_reader;
use serde_json::json;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use super::{location_json, open_database};

pub fn cmd_batch(database: PathBuf, inputs: Vec<PathBuf>, in_memory: bool) -> Result<()> {
    let db = open_database(&database, in_memory)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let start = Instant::now();
    let mut lookups = 0usize;
    let mut invalid = 0usize;

    for input in &inputs {
        let reader = file_reader::open(input)
            .with_context(|| format!("Failed to open input: {}", input.display()))?;

        for (line_no, line) in reader.lines().enumerate() {
            let line =
                line.with_context(|| format!("Failed to read {}", input.display()))?;
            let ip = line.trim();
            if ip.is_empty() || ip.starts_with('#') {
                continue;
            }

            lookups += 1;
            let value = match db.find(ip) {
                Ok(info) => location_json(ip, &info)?,
                Err(e) if e.is_recoverable() => {
                    invalid += 1;
                    warn!(input = %input.display(), line = line_no + 1, "{}", e);
                    json!({ "ip": ip, "error": e.to_string() })
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Lookup failed for {} ({}:{})", ip, input.display(), line_no + 1)
                    })
                }
            };

            serde_json::to_writer(&mut out, &value)?;
            out.write_all(b"\n")?;
        }
    }

    out.flush()?;
    info!(
        lookups,
        invalid,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "batch complete"
    );
    Ok(())
}
