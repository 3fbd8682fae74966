//! Byte-order helpers for the on-disk format
//!
//! The database mixes byte orders on purpose:
//!
//! - the header offset and range upper bounds are big-endian `u32`,
//! - the bucket table holds little-endian `u32`,
//! - record offsets are 3-byte little-endian integers.
//!
//! None of this is normalized at load time. Every reader here is bounds
//! checked and returns `None` instead of panicking, so callers can turn a
//! short buffer into a corruption error.
//!
//! # Example
//!
//! ```rust
//! use ip17mon::endian::{read_u24_le, read_u32_be, read_u32_le};
//!
//! let buffer = [0x12, 0x34, 0x56, 0x78];
//! assert_eq!(read_u32_be(&buffer, 0), Some(0x1234_5678));
//! assert_eq!(read_u32_le(&buffer, 0), Some(0x7856_3412));
//! assert_eq!(read_u24_le(&buffer, 1), Some(0x0078_5634));
//! assert_eq!(read_u32_be(&buffer, 1), None);
//! ```

#[inline(always)]
fn read_array<const N: usize>(buffer: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    buffer.get(offset..end)?.try_into().ok()
}

/// Read a big-endian u32 at `offset`
#[inline(always)]
pub fn read_u32_be(buffer: &[u8], offset: usize) -> Option<u32> {
    read_array::<4>(buffer, offset).map(u32::from_be_bytes)
}

/// Read a little-endian u32 at `offset`
#[inline(always)]
pub fn read_u32_le(buffer: &[u8], offset: usize) -> Option<u32> {
    read_array::<4>(buffer, offset).map(u32::from_le_bytes)
}

/// Read a 3-byte little-endian integer at `offset`
///
/// Assembled as `b0 | b1 << 8 | b2 << 16`.
#[inline(always)]
pub fn read_u24_le(buffer: &[u8], offset: usize) -> Option<u32> {
    read_array::<3>(buffer, offset)
        .map(|[b0, b1, b2]| u32::from(b0) | u32::from(b1) << 8 | u32::from(b2) << 16)
}
