use anyhow::{Context, Result};
use ip17mon::file_reader;
use ip17mon::validation::{validate_bytes, validate_database};
use serde_json::json;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

pub fn cmd_validate(database: PathBuf, json_output: bool) -> Result<()> {
    let start = Instant::now();
    let report = if file_reader::is_gzip_path(&database) {
        let mut data = Vec::new();
        file_reader::open(&database)
            .and_then(|mut reader| reader.read_to_end(&mut data))
            .with_context(|| format!("Failed to read: {}", database.display()))?;
        validate_bytes(data)
    } else {
        validate_database(&database)
            .with_context(|| format!("Validation failed: {}", database.display()))?
    };
    let duration = start.elapsed();

    if json_output {
        let output = json!({
            "database": database.display().to_string(),
            "is_valid": report.is_valid(),
            "duration_ms": duration.as_millis() as u64,
            "errors": report.errors,
            "warnings": report.warnings,
            "info": report.info,
            "stats": report.stats,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Validating: {}", database.display());
        println!();

        if !report.errors.is_empty() {
            println!("ERRORS ({}):", report.errors.len());
            for error in &report.errors {
                println!("  ✗ {}", error);
            }
            println!();
        }
        if !report.warnings.is_empty() {
            println!("WARNINGS ({}):", report.warnings.len());
            for warning in &report.warnings {
                println!("  ⚠ {}", warning);
            }
            println!();
        }
        println!("Statistics: {}", report.stats.summary());
        println!("Time:       {:.2?}", duration);
        println!();

        if report.is_valid() {
            println!("✓ Database is valid");
        } else {
            println!("✗ Database is INVALID");
        }
    }

    if !report.is_valid() {
        std::process::exit(1);
    }
    Ok(())
}
