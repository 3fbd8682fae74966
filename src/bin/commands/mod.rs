pub mod batch_cmd;
pub mod inspect_cmd;
pub mod query_cmd;
pub mod validate_cmd;

pub use batch_cmd::cmd_batch;
pub use inspect_cmd::cmd_inspect;
pub use query_cmd::cmd_query;
pub use validate_cmd::cmd_validate;

use anyhow::{Context, Result};
use ip17mon::{Database, LocationInfo};
use serde_json::{json, Value};
use std::path::Path;

/// Open a database, memory-mapped unless `in_memory` is set
pub fn open_database(path: &Path, in_memory: bool) -> Result<Database> {
    let opener = Database::from(path);
    let opener = if in_memory { opener.in_memory() } else { opener };
    opener
        .open()
        .with_context(|| format!("Failed to load database: {}", path.display()))
}

/// JSON object for a successful lookup, tagged with the queried address
pub fn location_json(ip: &str, info: &LocationInfo) -> Result<Value> {
    let mut value = serde_json::to_value(info)?;
    value["ip"] = json!(ip);
    Ok(value)
}
