//! 17mon Binary Format
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ [0, 4)         header_offset (u32, BE)       │
//! ├──────────────────────────────────────────────┤
//! │ [4, 1028)      bucket table                  │
//! │                256 × u32 LE, one per top byte│
//! ├──────────────────────────────────────────────┤
//! │ [1028, header_offset)  range table           │
//! │                8-byte entries:               │
//! │                  [0,4) upper bound (u32, BE) │
//! │                  [4,7) record offset (u24 LE)│
//! │                  [7]   record length (u8)    │
//! ├──────────────────────────────────────────────┤
//! │ [header_offset, end)   record blob           │
//! │                tab-separated UTF-8 records   │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Index positions used by the lookup engine are relative to the index
//! region (`buffer[4..header_offset]`), so the range table starts at
//! [`BUCKET_TABLE_LEN`] in index coordinates.

use crate::endian::{read_u24_le, read_u32_be};
use crate::error::{DatabaseError, Result};

/// Size of the leading `header_offset` field
pub const HEADER_LEN: usize = 4;

/// Number of buckets, one per value of the address's top byte
pub const BUCKET_COUNT: usize = 256;

/// Size of the bucket table in bytes
pub const BUCKET_TABLE_LEN: usize = BUCKET_COUNT * 4;

/// Absolute offset of the first range-table byte
pub const RANGE_TABLE_START: usize = HEADER_LEN + BUCKET_TABLE_LEN;

/// Stride of one range-table entry
pub const RANGE_ENTRY_LEN: usize = 8;

/// Bias folded into stored record offsets
pub const RECORD_OFFSET_BIAS: usize = 1024;

/// Parsed fixed header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Absolute offset where the record blob begins
    pub header_offset: u32,
    /// Exclusive upper bound of the binary-search window, in index coordinates
    pub max_range_end: usize,
}

impl Header {
    /// Parse and sanity-check the header of a raw buffer.
    ///
    /// Fails when the buffer is shorter than 4 bytes, when `header_offset`
    /// points past the end of the buffer, or when it leaves no room for the
    /// bucket table and range table.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header_offset = read_u32_be(data, 0).ok_or_else(|| {
            DatabaseError::CorruptHeader(format!(
                "buffer is {} bytes, need at least {}",
                data.len(),
                HEADER_LEN
            ))
        })?;

        let offset = header_offset as usize;
        if offset > data.len() {
            return Err(DatabaseError::CorruptHeader(format!(
                "header offset {} exceeds buffer length {}",
                offset,
                data.len()
            )));
        }
        if offset <= RANGE_TABLE_START {
            return Err(DatabaseError::CorruptHeader(format!(
                "header offset {} leaves no range table (must exceed {})",
                offset, RANGE_TABLE_START
            )));
        }

        Ok(Header {
            header_offset,
            max_range_end: offset - RANGE_TABLE_START,
        })
    }

    /// Length of the index region (`buffer[4..header_offset]`)
    pub fn index_len(&self) -> usize {
        self.header_offset as usize - HEADER_LEN
    }

    /// Absolute position of record bytes for a stored 3-byte offset
    pub fn record_position(&self, stored_offset: u32) -> usize {
        // stored offsets carry the 1024 bias, so this never underflows for
        // a header that passed `parse`
        stored_offset as usize + self.header_offset as usize - RECORD_OFFSET_BIAS
    }
}

/// One decoded 8-byte range-table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeEntry {
    /// Byte position of the entry in index coordinates
    pub position: usize,
    /// Inclusive upper-bound address of the range
    pub upper_bound: u32,
    /// Stored (biased) 3-byte record offset
    pub record_offset: u32,
    /// Record length in bytes
    pub record_len: u8,
}

impl RangeEntry {
    /// Decode the entry at `position` of the index region
    pub fn decode(index: &[u8], position: usize) -> Result<Self> {
        let out_of_bounds = || {
            DatabaseError::CorruptRecord(format!(
                "range entry at index position {} exceeds index length {}",
                position,
                index.len()
            ))
        };
        let upper_bound = read_u32_be(index, position).ok_or_else(out_of_bounds)?;
        let record_offset = read_u24_le(index, position + 4).ok_or_else(out_of_bounds)?;
        let record_len = *index.get(position + 7).ok_or_else(out_of_bounds)?;

        Ok(RangeEntry {
            position,
            upper_bound,
            record_offset,
            record_len,
        })
    }

    /// Ordinal of this entry within the range table
    pub fn ordinal(&self) -> usize {
        self.position.saturating_sub(BUCKET_TABLE_LEN) / RANGE_ENTRY_LEN
    }
}

/// Upper bound stored at `position`, as a corruption error when out of bounds
#[inline]
pub(crate) fn upper_bound_at(index: &[u8], position: usize) -> Result<u32> {
    read_u32_be(index, position).ok_or_else(|| {
        DatabaseError::CorruptRecord(format!(
            "range upper bound at index position {} exceeds index length {}",
            position,
            index.len()
        ))
    })
}
