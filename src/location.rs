//! Location records
//!
//! A record in the blob is five tab-separated UTF-8 fields:
//! country, region, city, an unused field, and ISP. Empty fields become
//! [`NULL`], and the ISP is cut at its first `/` before that check.

use crate::error::{DatabaseError, Result};
use serde::Serialize;
use std::fmt;

/// Sentinel for a field that is empty in the source data
pub const NULL: &str = "N/A";

/// Number of tab-separated fields in every record
pub const FIELD_COUNT: usize = 5;

/// Geographic and ISP information for an address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LocationInfo {
    /// Country name
    pub country: String,
    /// Region / province name
    pub region: String,
    /// City name
    pub city: String,
    /// Network operator
    pub isp: String,
}

impl LocationInfo {
    /// Decode a raw record slice.
    ///
    /// Returns [`DatabaseError::CorruptRecord`] when the record does not hold
    /// exactly five fields or a kept field is not valid UTF-8.
    pub fn decode(record: &[u8]) -> Result<Self> {
        let mut fields = [&record[..0]; FIELD_COUNT];
        let mut count = 0;
        let mut field_start = 0;

        for tab in memchr::memchr_iter(b'\t', record).chain(std::iter::once(record.len())) {
            if count == FIELD_COUNT {
                count += 1;
                break;
            }
            fields[count] = &record[field_start..tab];
            field_start = tab + 1;
            count += 1;
        }

        if count != FIELD_COUNT {
            return Err(DatabaseError::CorruptRecord(format!(
                "unexpected ip info: {:?}",
                String::from_utf8_lossy(record)
            )));
        }

        let isp = match memchr::memchr(b'/', fields[4]) {
            Some(slash) => &fields[4][..slash],
            None => fields[4],
        };

        Ok(LocationInfo {
            country: field_or_null(fields[0], "country")?,
            region: field_or_null(fields[1], "region")?,
            city: field_or_null(fields[2], "city")?,
            isp: field_or_null(isp, "isp")?,
        })
    }

    /// True when every field holds the [`NULL`] sentinel
    pub fn is_unknown(&self) -> bool {
        [&self.country, &self.region, &self.city, &self.isp]
            .iter()
            .all(|field| field.as_str() == NULL)
    }
}

fn field_or_null(bytes: &[u8], name: &str) -> Result<String> {
    if bytes.is_empty() {
        return Ok(NULL.to_string());
    }
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| DatabaseError::CorruptRecord(format!("{} field is not UTF-8: {}", name, e)))
}

impl fmt::Display for LocationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.country, self.region, self.city, self.isp
        )
    }
}
