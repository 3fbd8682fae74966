//! Process-wide database
//!
//! A thin convenience layer over [`Database`] for programs that want one
//! shared instance. The first successful `init*` call wins; later calls are
//! no-ops that return `Ok(())`, even when they name a different file.
//! Prefer passing a `Database` handle explicitly where that is practical.
//!
//! ```no_run
//! ip17mon::global::init("17monipdb.dat")?;
//! let info = ip17mon::global::find("115.231.237.124")?;
//! # Ok::<(), ip17mon::DatabaseError>(())
//! ```

use crate::database::Database;
use crate::error::{DatabaseError, Result};
use crate::location::LocationInfo;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

static GLOBAL: OnceLock<Database> = OnceLock::new();

/// Open `path` as the process-wide database unless one is already set
pub fn init(path: impl AsRef<Path>) -> Result<()> {
    if is_initialized() {
        return Ok(());
    }
    install(Database::open(path)?);
    Ok(())
}

/// Load `data` as the process-wide database unless one is already set
pub fn init_with_data(data: Vec<u8>) -> Result<()> {
    if is_initialized() {
        return Ok(());
    }
    install(Database::from_bytes(data)?);
    Ok(())
}

fn install(db: Database) {
    // a concurrent init may have won the race; its database stays
    if GLOBAL.set(db).is_err() {
        debug!("process-wide database already initialized, discarding duplicate");
    }
}

/// Whether a process-wide database has been installed
pub fn is_initialized() -> bool {
    GLOBAL.get().is_some()
}

/// The process-wide database
pub fn get() -> Result<&'static Database> {
    GLOBAL.get().ok_or(DatabaseError::Uninitialized)
}

/// Look up a textual address in the process-wide database
pub fn find(ip: &str) -> Result<LocationInfo> {
    get()?.find(ip)
}

/// Look up a `u32` address in the process-wide database
pub fn find_by_uint(ip: u32) -> Result<LocationInfo> {
    get()?.find_by_uint(ip)
}
