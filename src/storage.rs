//! Persistence for checkin history and entry folders.
//!
//! Each journal's history is one JSON array, rewritten in full on
//! every checkin:
//!
//! ```text
//! [
//!   { "date": "2025-06-15T19:00:00Z", "data": { "checkin": { ... } } },
//!   ...
//! ]
//! ```
//!
//! Older files may carry string dates in legacy formats or epoch
//! numbers; loading coerces them all to timestamps so the array can
//! be re-sorted ascending before it's written back. There is no
//! locking — concurrent runs against one journal race and the last
//! full-array write wins.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{fs, io};

use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use jiff::{Timestamp, Zoned};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not determine home directory")]
    NoHome,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unreadable date in history: {0}")]
    BadDate(String),
}

/// One persisted checkin: the reference timestamp (UTC) and the full
/// answer tree with weather reduced to its summary form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinRecord {
    pub date: Timestamp,
    pub data: Value,
}

/// Append a record to the history file at `path`.
///
/// Full read-modify-write: existing records are loaded (tolerating
/// legacy date encodings), the new record appended, the whole array
/// stable-sorted ascending by date, and the file rewritten
/// pretty-printed.
pub fn append_record(path: &Path, record: CheckinRecord) -> Result<(), StorageError> {
    let mut records = load_records(path)?;
    records.push(record);
    records.sort_by_key(|r| r.date);
    fs::write(path, serde_json::to_string_pretty(&records)?)?;
    Ok(())
}

/// Load the history array at `path`; a missing file is an empty
/// history.
pub fn load_records(path: &Path) -> Result<Vec<CheckinRecord>, StorageError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    #[derive(Deserialize)]
    struct RawRecord {
        date: Value,
        data: Value,
    }

    let raw: Vec<RawRecord> = serde_json::from_str(&fs::read_to_string(path)?)?;
    raw.into_iter()
        .map(|r| {
            Ok(CheckinRecord {
                date: coerce_date(&r.date)?,
                data: r.data,
            })
        })
        .collect()
}

/// Coerce a history `date` value to a timestamp. Accepts RFC 3339
/// strings, a few legacy string formats, and epoch seconds.
fn coerce_date(value: &Value) -> Result<Timestamp, StorageError> {
    match value {
        Value::String(s) => {
            parse_date_string(s).ok_or_else(|| StorageError::BadDate(s.clone()))
        }
        Value::Number(n) => {
            if let Some(secs) = n.as_i64() {
                Timestamp::from_second(secs)
                    .map_err(|_| StorageError::BadDate(n.to_string()))
            } else if let Some(secs) = n.as_f64() {
                Timestamp::from_millisecond((secs * 1000.0) as i64)
                    .map_err(|_| StorageError::BadDate(n.to_string()))
            } else {
                Err(StorageError::BadDate(n.to_string()))
            }
        }
        other => Err(StorageError::BadDate(other.to_string())),
    }
}

fn parse_date_string(s: &str) -> Option<Timestamp> {
    if let Ok(ts) = Timestamp::from_str(s) {
        return Some(ts);
    }
    if let Ok(zoned) = Zoned::from_str(s) {
        return Some(zoned.timestamp());
    }
    // "2023-01-01 12:00:00 -0500" style.
    if let Ok(ts) = Timestamp::strptime("%Y-%m-%d %H:%M:%S %z", s) {
        return Some(ts);
    }
    // Legacy "2023-01-01 12:00:00 UTC" and bare civil forms, all UTC.
    let civil = s.strip_suffix(" UTC").unwrap_or(s);
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = DateTime::strptime(fmt, civil) {
            return dt.to_zoned(TimeZone::UTC).ok().map(|z| z.timestamp());
        }
    }
    None
}

// ── Entry folders ──

/// Where a journal's history file lives: the journal's own entries
/// folder, else the global one, else `~/.local/share/journal`.
pub fn data_dir(
    journal_folder: Option<&str>,
    global_folder: Option<&str>,
) -> Result<PathBuf, StorageError> {
    if let Some(folder) = journal_folder {
        return expand(folder);
    }
    if let Some(folder) = global_folder {
        return expand(folder);
    }
    default_root()
}

/// Where a journal's markdown files live. Follows the same
/// precedence as [`data_dir`] but each source nests differently:
/// a journal-level folder gains an `entries` subdirectory, the global
/// folder gains the journal key, and the default root gains both.
pub fn markdown_dir(
    journal_folder: Option<&str>,
    global_folder: Option<&str>,
    key: &str,
) -> Result<PathBuf, StorageError> {
    if let Some(folder) = journal_folder {
        return Ok(expand(folder)?.join("entries"));
    }
    if let Some(folder) = global_folder {
        return Ok(expand(folder)?.join(key));
    }
    Ok(default_root()?.join(key).join("entries"))
}

fn default_root() -> Result<PathBuf, StorageError> {
    let home = dirs::home_dir().ok_or(StorageError::NoHome)?;
    Ok(home.join(".local").join("share").join("journal"))
}

/// Expand a leading `~` to the home directory.
fn expand(path: &str) -> Result<PathBuf, StorageError> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or(StorageError::NoHome)?;
        return Ok(home.join(rest));
    }
    if path == "~" {
        return dirs::home_dir().ok_or(StorageError::NoHome);
    }
    Ok(PathBuf::from(path))
}
