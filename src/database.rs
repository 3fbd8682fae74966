//! Database Loader and Lookup Engine
//!
//! A [`Database`] wraps one immutable 17mon buffer. Loading only parses the
//! fixed header and the 256-entry bucket table; record bytes are sliced and
//! decoded lazily per query.
//!
//! A lookup runs in two steps:
//!
//! 1. The address's top byte selects a bucket, whose stored entry count is
//!    turned into the starting byte position of the search window.
//! 2. A binary search over 8-byte range entries finds the leftmost entry
//!    whose upper bound is `>= ip`, and that entry's offset and length
//!    address the record in the blob.
//!
//! The database is never mutated after load, so it is `Send + Sync` and
//! can be shared behind an `Arc` or a `&'static` without locking.

use crate::endian::read_u32_le;
use crate::error::{DatabaseError, Result};
use crate::file_reader;
use crate::format::{
    upper_bound_at, Header, RangeEntry, BUCKET_COUNT, BUCKET_TABLE_LEN, HEADER_LEN,
    RANGE_ENTRY_LEN,
};
use crate::location::LocationInfo;
use flate2::read::GzDecoder;
use memmap2::Mmap;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Storage for database data - either owned or memory-mapped
enum DatabaseStorage {
    Owned(Vec<u8>),
    Mmap(Mmap),
}

impl DatabaseStorage {
    fn as_slice(&self) -> &[u8] {
        match self {
            DatabaseStorage::Owned(v) => v.as_slice(),
            DatabaseStorage::Mmap(m) => &m[..],
        }
    }

    fn kind(&self) -> StorageKind {
        match self {
            DatabaseStorage::Owned(_) => StorageKind::Owned,
            DatabaseStorage::Mmap(_) => StorageKind::Mmap,
        }
    }
}

/// How the database bytes are held in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Heap buffer owned by the database
    Owned,
    /// Read-only memory map of the source file
    Mmap,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Owned => write!(f, "in-memory"),
            StorageKind::Mmap => write!(f, "memory-mapped"),
        }
    }
}

/// Builder for opening a database file
///
/// Created via [`Database::from`].
///
/// # Examples
///
/// ```no_run
/// use ip17mon::Database;
///
/// // Memory-mapped (default)
/// let db = Database::from("17monipdb.dat").open()?;
///
/// // Copied into an owned buffer
/// let db = Database::from("17monipdb.dat").in_memory().open()?;
///
/// // Gzip-compressed files are always decompressed into memory
/// let db = Database::from("17monipdb.dat.gz").open()?;
/// # Ok::<(), ip17mon::DatabaseError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseOpener {
    path: PathBuf,
    in_memory: bool,
}

impl DatabaseOpener {
    fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            in_memory: false,
        }
    }

    /// Read the whole file into memory instead of memory-mapping it
    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    /// Open and load the database
    pub fn open(self) -> Result<Database> {
        let path = self.path.as_path();
        let storage = if file_reader::is_gzip_path(path) {
            let file = File::open(path).map_err(|e| with_path(e, path))?;
            let mut data = Vec::new();
            GzDecoder::new(file)
                .read_to_end(&mut data)
                .map_err(|e| with_path(e, path))?;
            DatabaseStorage::Owned(data)
        } else if self.in_memory {
            DatabaseStorage::Owned(std::fs::read(path).map_err(|e| with_path(e, path))?)
        } else {
            let file = File::open(path).map_err(|e| with_path(e, path))?;
            // SAFETY: the map is read-only and every access is bounds checked;
            // the file must not be truncated while the database is alive.
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| with_path(e, path))?;
            DatabaseStorage::Mmap(mmap)
        };

        debug!(path = %path.display(), "opening database");
        Database::from_storage(storage)
    }
}

fn with_path(err: io::Error, path: &Path) -> DatabaseError {
    DatabaseError::Io(io::Error::new(
        err.kind(),
        format!("{}: {}", path.display(), err),
    ))
}

/// Parse a textual address into IPv4.
///
/// Dotted-decimal IPv4 is accepted, as is an IPv4-mapped IPv6 literal
/// (`::ffff:a.b.c.d`). Anything else is [`DatabaseError::InvalidAddress`].
pub fn parse_ipv4(ip: &str) -> Result<Ipv4Addr> {
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V4(addr)) => Ok(addr),
        Ok(IpAddr::V6(addr)) => addr
            .to_ipv4_mapped()
            .ok_or_else(|| DatabaseError::InvalidAddress(ip.to_string())),
        Err(_) => Err(DatabaseError::InvalidAddress(ip.to_string())),
    }
}

/// Load a database from an in-memory buffer
pub fn load(data: Vec<u8>) -> Result<Database> {
    Database::from_bytes(data)
}

/// Immutable 17mon database
///
/// # Examples
///
/// ```no_run
/// use ip17mon::Database;
///
/// let db = Database::open("17monipdb.dat")?;
/// let info = db.find("115.231.237.124")?;
/// println!("{} {} {} {}", info.country, info.region, info.city, info.isp);
/// # Ok::<(), ip17mon::DatabaseError>(())
/// ```
pub struct Database {
    data: DatabaseStorage,
    header: Header,
    buckets: Box<[u32; BUCKET_COUNT]>,
}

impl Database {
    /// Start configuring how a database file is opened
    #[allow(clippy::should_implement_trait)]
    pub fn from(path: impl Into<PathBuf>) -> DatabaseOpener {
        DatabaseOpener::new(path)
    }

    /// Open a database file using memory mapping
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from(path.as_ref()).open()
    }

    /// Create a database from raw bytes
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_storage(DatabaseStorage::Owned(data))
    }

    fn from_storage(storage: DatabaseStorage) -> Result<Self> {
        let data = storage.as_slice();
        let header = Header::parse(data)?;
        let index = &data[HEADER_LEN..header.header_offset as usize];

        let mut buckets = Box::new([0u32; BUCKET_COUNT]);
        for (i, bucket) in buckets.iter_mut().enumerate() {
            *bucket = read_u32_le(index, i * 4).ok_or_else(|| {
                DatabaseError::CorruptHeader(format!("bucket table truncated at entry {}", i))
            })?;
        }

        debug!(
            header_offset = header.header_offset,
            range_count = range_count_for(&header),
            blob_len = data.len() - header.header_offset as usize,
            storage = %storage.kind(),
            "loaded database"
        );

        Ok(Self {
            data: storage,
            header,
            buckets,
        })
    }

    /// Look up a textual address
    pub fn find(&self, ip: &str) -> Result<LocationInfo> {
        self.find_by_ip(parse_ipv4(ip)?)
    }

    /// Look up an IPv4 address
    pub fn find_by_ip(&self, ip: Ipv4Addr) -> Result<LocationInfo> {
        self.find_by_uint(u32::from(ip))
    }

    /// Look up an address given as a big-endian `u32`
    pub fn find_by_uint(&self, ip: u32) -> Result<LocationInfo> {
        let entry = self.range_entry_for(ip)?;
        let record = self.record_bytes(&entry)?;
        LocationInfo::decode(record).inspect_err(|e| {
            warn!(ip = %Ipv4Addr::from(ip), position = entry.position, error = %e, "corrupt record");
        })
    }

    /// The range entry a lookup of `ip` resolves to
    pub fn range_entry_for(&self, ip: u32) -> Result<RangeEntry> {
        let position = self.find_index_offset(ip, self.bucket_start(ip))?;
        let entry = RangeEntry::decode(self.index(), position)?;
        trace!(ip = %Ipv4Addr::from(ip), position, "resolved range entry");
        if entry.upper_bound < ip {
            warn!(
                ip = %Ipv4Addr::from(ip),
                position,
                upper_bound = %Ipv4Addr::from(entry.upper_bound),
                "address beyond every range upper bound, using fall-through entry"
            );
        }
        Ok(entry)
    }

    /// Starting byte position of the search window for `ip`'s bucket
    pub fn bucket_start(&self, ip: u32) -> usize {
        let count = self.buckets[(ip >> 24) as usize] as usize;
        count
            .saturating_mul(RANGE_ENTRY_LEN)
            .saturating_add(BUCKET_TABLE_LEN)
    }

    /// Binary search for the leftmost entry in `[start, max_range_end]`
    /// whose upper bound is `>= ip`.
    ///
    /// The midpoint stays aligned to the 8-byte entry stride. When nothing
    /// in the window satisfies the bound, the entry at the window's end is
    /// returned as-is.
    fn find_index_offset(&self, ip: u32, mut start: usize) -> Result<usize> {
        let index = self.index();
        let mut end = self.header.max_range_end;

        while start < end {
            let mid = (start / RANGE_ENTRY_LEN + end / RANGE_ENTRY_LEN) / 2 * RANGE_ENTRY_LEN;
            if ip > upper_bound_at(index, mid)? {
                start = mid + RANGE_ENTRY_LEN;
            } else {
                end = mid;
            }
        }

        if upper_bound_at(index, end)? >= ip {
            Ok(end)
        } else {
            Ok(start)
        }
    }

    /// Raw record bytes addressed by a range entry
    pub fn record_bytes(&self, entry: &RangeEntry) -> Result<&[u8]> {
        let start = self.header.record_position(entry.record_offset);
        let end = start + entry.record_len as usize;
        self.data.as_slice().get(start..end).ok_or_else(|| {
            DatabaseError::CorruptRecord(format!(
                "record [{}, {}) of entry at index position {} exceeds buffer length {}",
                start,
                end,
                entry.position,
                self.len()
            ))
        })
    }

    /// Decode the range entry at an index position
    pub fn range_entry_at(&self, position: usize) -> Result<RangeEntry> {
        RangeEntry::decode(self.index(), position)
    }

    /// The entry a lookup lands on when no upper bound reaches the address
    pub fn fall_through_entry(&self) -> Result<RangeEntry> {
        self.range_entry_at(self.header.max_range_end)
    }

    /// Iterate over the range entries in the search window, in table order
    pub fn ranges(&self) -> Ranges<'_> {
        Ranges {
            index: self.index(),
            position: BUCKET_TABLE_LEN,
            end: self.header.max_range_end,
        }
    }

    /// Stored value of every bucket, indexed by top address byte
    pub fn buckets(&self) -> &[u32; BUCKET_COUNT] {
        &self.buckets
    }

    /// Parsed header
    pub fn header(&self) -> Header {
        self.header
    }

    /// Absolute offset where the record blob begins
    pub fn header_offset(&self) -> u32 {
        self.header.header_offset
    }

    /// Number of range entries inside the search window
    pub fn range_count(&self) -> usize {
        range_count_for(&self.header)
    }

    /// Size of the record blob in bytes
    pub fn record_blob_len(&self) -> usize {
        self.len() - self.header.header_offset as usize
    }

    /// Total buffer size in bytes
    pub fn len(&self) -> usize {
        self.data.as_slice().len()
    }

    /// Whether the buffer is empty (never true for a loaded database)
    pub fn is_empty(&self) -> bool {
        self.data.as_slice().is_empty()
    }

    /// The full underlying buffer
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// How the bytes are held in memory
    pub fn storage_kind(&self) -> StorageKind {
        self.data.kind()
    }

    /// Index region, `buffer[4..header_offset]`
    fn index(&self) -> &[u8] {
        &self.data.as_slice()[HEADER_LEN..self.header.header_offset as usize]
    }
}

fn range_count_for(header: &Header) -> usize {
    header.max_range_end.saturating_sub(BUCKET_TABLE_LEN) / RANGE_ENTRY_LEN
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("size", &self.len())
            .field("storage", &self.storage_kind())
            .field("header", &self.header)
            .field("range_count", &self.range_count())
            .finish()
    }
}

/// Iterator over the range entries of a [`Database`]
#[derive(Debug, Clone)]
pub struct Ranges<'a> {
    index: &'a [u8],
    position: usize,
    end: usize,
}

impl Iterator for Ranges<'_> {
    type Item = RangeEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position + RANGE_ENTRY_LEN > self.end {
            return None;
        }
        let entry = RangeEntry::decode(self.index, self.position).ok()?;
        self.position += RANGE_ENTRY_LEN;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.position) / RANGE_ENTRY_LEN;
        (0, Some(remaining))
    }
}
