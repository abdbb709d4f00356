//! Per-user append-only log of itinerary/trip-plan snapshots.
//!
//! Each user's history is one JSON array on disk, rewritten whole on every
//! append. Appends for the same user serialize on a per-user lock, so two
//! concurrent saves cannot read the same array, mint the same id, and
//! clobber each other's write.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::StoreError;

/// One snapshot of a user's trip plan at save time.
///
/// The on-disk field names (`_time`, `_itin_initialized`, `iten_id`) are a
/// compatibility contract with existing files; `iten_id` is spelled the way
/// the files spell it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryRecord {
    #[serde(rename = "_time")]
    pub time: String,
    #[serde(rename = "_itin_initialized")]
    pub initialized: bool,
    pub iten_id: String,
    pub itinerary: Value,
    pub trip_plan: Value,
    pub user_id: String,
}

pub struct ItineraryLog {
    dir: PathBuf,
    user_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ItineraryLog {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join("itinerary"),
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("{user_id}.json"))
    }

    async fn lock_for(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Append one snapshot to the user's history and rewrite the file.
    ///
    /// Returns the stored record and the new history length. The record
    /// never carries the user's profile. Payloads that arrive as
    /// JSON-encoded strings are parsed before storage.
    pub async fn append(
        &self,
        user_id: &str,
        itinerary: Value,
        trip_plan: Value,
    ) -> Result<(ItineraryRecord, usize), StoreError> {
        if user_id.is_empty() {
            return Err(StoreError::MissingUserId);
        }

        let lock = self.lock_for(user_id).await;
        let _guard = lock.lock().await;

        let path = self.path_for(user_id);
        let mut records = load_records(&path);

        let record = ItineraryRecord {
            time: Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            initialized: true,
            iten_id: next_itin_id(&records),
            itinerary: normalize_payload(itinerary),
            trip_plan: normalize_payload(trip_plan),
            user_id: user_id.to_string(),
        };

        records.push(serde_json::to_value(&record)?);

        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io("create", &self.dir, e))?;
        let body = serde_json::to_string_pretty(&records)?;
        fs::write(&path, body).map_err(|e| StoreError::io("write", &path, e))?;

        Ok((record, records.len()))
    }

    /// Full history for a user, oldest first. Missing file reads as empty.
    pub fn all(&self, user_id: &str) -> Vec<Value> {
        load_records(&self.path_for(user_id))
    }

    /// The user's current itinerary: the last appended snapshot.
    pub fn latest(&self, user_id: &str) -> Option<Value> {
        self.all(user_id).pop()
    }
}

/// Read a user's history, favoring availability: a missing file is an empty
/// history, an earlier single-object file is wrapped, and corruption is
/// discarded after a loud diagnostic.
fn load_records(path: &Path) -> Vec<Value> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable itinerary file, starting a fresh history");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(list)) => list,
        Ok(single @ Value::Object(_)) => vec![single],
        Ok(_) => {
            tracing::warn!(path = %path.display(), "unexpected itinerary file shape, starting a fresh history");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "corrupt itinerary file, discarding and starting a fresh history");
            Vec::new()
        }
    }
}

/// Next id in the `itin_NNNN` sequence: scan the existing records for the
/// largest suffix and increment. The scan, not a stored counter, is the
/// source of truth.
fn next_itin_id(existing: &[Value]) -> String {
    let mut max_num: u32 = 0;
    for record in existing {
        let id = record
            .get("iten_id")
            .or_else(|| record.get("itinerary_id"))
            .and_then(Value::as_str);
        if let Some(n) = id.and_then(parse_itin_suffix) {
            max_num = max_num.max(n);
        }
    }
    format!("itin_{:04}", max_num + 1)
}

fn parse_itin_suffix(id: &str) -> Option<u32> {
    let digits = id.strip_prefix("itin_")?;
    if digits.len() == 4 && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

/// Agents sometimes hand back payloads as JSON-encoded strings; store the
/// parsed object when the string plainly is one, otherwise keep it as-is.
fn normalize_payload(value: Value) -> Value {
    if let Value::String(s) = &value {
        let trimmed = s.trim();
        let looks_like_json = (trimmed.starts_with('{') && trimmed.ends_with('}'))
            || (trimmed.starts_with('[') && trimmed.ends_with(']'));
        if looks_like_json {
            if let Ok(parsed) = serde_json::from_str(trimmed) {
                return parsed;
            }
        }
    }
    value
}
