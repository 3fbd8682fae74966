//! ip17mon - IPv4 Geolocation Lookups
//!
//! Resolves IPv4 addresses to country / region / city / ISP records using a
//! precomputed, immutable 17mon-format database held in memory.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ip17mon::Database;
//!
//! let db = Database::open("17monipdb.dat")?;
//!
//! let info = db.find("115.231.237.124")?;
//! assert_eq!(info.country, "中国");
//! assert_eq!(info.city, ip17mon::NULL);
//!
//! // Raw u32 addresses skip text parsing
//! let info = db.find_by_uint(0x73E7_ED7C)?;
//! # Ok::<(), ip17mon::DatabaseError>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │  ip (u32)                            │
//! └──────────────────────────────────────┘
//!          ↓ top byte
//! ┌──────────────────────────────────────┐
//! │  Bucket table (256 × u32 LE)         │
//! │  → start of search window            │
//! └──────────────────────────────────────┘
//!          ↓ binary search, 8-byte stride
//! ┌──────────────────────────────────────┐
//! │  Range table (upper bound, offset,   │
//! │  length), sorted ascending           │
//! └──────────────────────────────────────┘
//!          ↓ offset + length
//! ┌──────────────────────────────────────┐
//! │  Record blob (tab-separated text)    │
//! └──────────────────────────────────────┘
//! ```
//!
//! A loaded [`Database`] is never mutated and is `Send + Sync`; any number
//! of threads may query it concurrently. The optional [`global`] module
//! offers a process-wide instance with init-once semantics.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Unified database API
pub mod database;
pub mod endian;
/// Error types for loading and lookups
pub mod error;
pub mod file_reader;
/// Binary layout constants and header parsing
pub mod format;
pub mod global;
pub mod location;
pub mod validation;

// Re-exports for Rust consumers

pub use crate::database::{load, parse_ipv4, Database, DatabaseOpener, StorageKind};
pub use crate::error::{DatabaseError, Result};
pub use crate::location::{LocationInfo, NULL};

/// Library version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
