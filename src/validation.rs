//! Structural validation of 17mon databases
//!
//! Lookups only touch the entries a query needs, so a damaged table can
//! go unnoticed until a particular address is queried. The validator walks
//! the whole index up front and reports every problem it finds:
//!
//! - header sanity and search-window alignment
//! - ascending range upper bounds
//! - every record slice in bounds and decoding to five fields
//! - bucket starts inside the window, non-decreasing, and consistent with
//!   the range table
//! - coverage of the top of the address space
//!
//! # Usage
//!
//! ```rust,no_run
//! use ip17mon::validation::validate_database;
//! use std::path::Path;
//!
//! let report = validate_database(Path::new("17monipdb.dat"))?;
//! if !report.is_valid() {
//!     for error in &report.errors {
//!         eprintln!("  ERROR: {}", error);
//!     }
//! }
//! # Ok::<(), ip17mon::DatabaseError>(())
//! ```

use crate::database::Database;
use crate::error::Result;
use crate::format::{BUCKET_COUNT, BUCKET_TABLE_LEN, RANGE_ENTRY_LEN};
use crate::location::LocationInfo;
use serde::Serialize;
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::path::Path;

/// Cap on per-entry errors so a badly broken file yields a readable report
const MAX_ENTRY_ERRORS: usize = 100;

/// Validation report with detailed findings
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Problems that make lookups return wrong data or fail
    pub errors: Vec<String>,
    /// Suspicious but survivable conditions
    pub warnings: Vec<String>,
    /// Informational messages about database properties
    pub info: Vec<String>,
    /// Database statistics
    pub stats: DatabaseStats,
}

/// Database statistics gathered during validation
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatabaseStats {
    /// Buffer size in bytes
    pub file_size: usize,
    /// Absolute offset of the record blob
    pub header_offset: u32,
    /// Range entries in the search window
    pub range_count: usize,
    /// Record blob size in bytes
    pub record_blob_size: usize,
    /// Distinct (offset, length) record references
    pub distinct_records: usize,
}

impl ValidationReport {
    /// Check if database passed all validations (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn info(&mut self, msg: impl Into<String>) {
        self.info.push(msg.into());
    }
}

impl DatabaseStats {
    /// Human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Ranges: {}, Records: {}, Blob: {} KB, Size: {} KB",
            self.range_count,
            self.distinct_records,
            self.record_blob_size / 1024,
            self.file_size / 1024
        )
    }
}

/// Validate a database file
///
/// Returns `Err` only when the file cannot be read. A file whose header is
/// unusable yields an `Ok` report carrying that error.
pub fn validate_database(path: &Path) -> Result<ValidationReport> {
    let data = std::fs::read(path)?;
    Ok(validate_bytes(data))
}

/// Validate an in-memory buffer
pub fn validate_bytes(data: Vec<u8>) -> ValidationReport {
    let mut report = ValidationReport::default();
    report.stats.file_size = data.len();

    let db = match Database::from_bytes(data) {
        Ok(db) => db,
        Err(e) => {
            report.error(e.to_string());
            return report;
        }
    };

    report.stats.header_offset = db.header_offset();
    report.stats.range_count = db.range_count();
    report.stats.record_blob_size = db.record_blob_len();

    let header = db.header();
    if header.max_range_end % RANGE_ENTRY_LEN != 0 {
        report.warning(format!(
            "search window end {} is not a multiple of {}",
            header.max_range_end, RANGE_ENTRY_LEN
        ));
    }
    if db.range_count() == 0 {
        report.error("range table is empty");
        return report;
    }

    check_ranges(&db, &mut report);
    check_buckets(&db, &mut report);
    check_coverage(&db, &mut report);

    report.info(report.stats.summary());
    report
}

fn check_ranges(db: &Database, report: &mut ValidationReport) {
    let mut previous: Option<u32> = None;
    let mut seen = HashSet::new();
    let mut entry_errors = 0usize;

    for entry in db.ranges() {
        let mut problems = Vec::new();

        if let Some(prev) = previous {
            if entry.upper_bound < prev {
                problems.push(format!(
                    "range {} upper bound {} is below previous {}",
                    entry.ordinal(),
                    Ipv4Addr::from(entry.upper_bound),
                    Ipv4Addr::from(prev)
                ));
            }
        }
        previous = Some(entry.upper_bound);

        if seen.insert((entry.record_offset, entry.record_len)) {
            if let Err(e) = db.record_bytes(&entry).and_then(LocationInfo::decode) {
                problems.push(format!("range {}: {}", entry.ordinal(), e));
            }
        }

        for problem in problems {
            entry_errors += 1;
            if entry_errors <= MAX_ENTRY_ERRORS {
                report.error(problem);
            }
        }
    }

    if entry_errors > MAX_ENTRY_ERRORS {
        report.error(format!(
            "... {} more range errors suppressed",
            entry_errors - MAX_ENTRY_ERRORS
        ));
    }
    report.stats.distinct_records = seen.len();
}

fn check_buckets(db: &Database, report: &mut ValidationReport) {
    let window_end = db.header().max_range_end;
    let mut previous_start = BUCKET_TABLE_LEN;

    for bucket in 0..BUCKET_COUNT {
        let first_ip = (bucket as u32) << 24;
        let start = db.bucket_start(first_ip);

        if start > window_end {
            report.error(format!(
                "bucket {} starts at index position {}, past the search window end {}",
                bucket, start, window_end
            ));
            continue;
        }
        if start < previous_start {
            report.error(format!(
                "bucket {} starts at {} before bucket {} at {}",
                bucket,
                start,
                bucket.saturating_sub(1),
                previous_start
            ));
        }
        previous_start = start;

        // the entry just before the window must end below this bucket
        if start > BUCKET_TABLE_LEN {
            match db.range_entry_at(start - RANGE_ENTRY_LEN) {
                Ok(entry) if entry.upper_bound >= first_ip => report.error(format!(
                    "bucket {} skips range {} which still covers {}",
                    bucket,
                    entry.ordinal(),
                    Ipv4Addr::from(first_ip)
                )),
                Ok(_) => {}
                Err(e) => report.error(format!("bucket {}: {}", bucket, e)),
            }
        }
    }
}

fn check_coverage(db: &Database, report: &mut ValidationReport) {
    if let Some(last) = db.ranges().last() {
        if last.upper_bound != u32::MAX {
            report.warning(format!(
                "last range ends at {}; higher addresses resolve to the fall-through entry",
                Ipv4Addr::from(last.upper_bound)
            ));
        }
    }
}
