//! Local durable store used when the remote backend is unreachable.
//!
//! A single JSON document, fully rewritten on every save via write-to-temp +
//! rename so a crash never leaves a half-written file. The document carries a
//! persisted `next_id` counter so ids stay unique even if the record list is
//! wiped and repopulated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::mood::{MoodRecord, MoodUser, NewMood};

/// On-disk shape of the fallback store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackData {
    pub version: u32,
    #[serde(default = "default_next_id")]
    pub next_id: i64,
    #[serde(default)]
    pub moods: Vec<MoodRecord>,
}

fn default_next_id() -> i64 {
    1
}

impl Default for FallbackData {
    fn default() -> Self {
        Self {
            version: 1,
            next_id: 1,
            moods: Vec::new(),
        }
    }
}

impl FallbackData {
    pub fn exists_for(&self, user: MoodUser, date: NaiveDate) -> bool {
        self.moods.iter().any(|m| m.user == user && m.date == date)
    }

    /// Takes the next id and bumps the counter.
    pub fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Appends a record under a freshly allocated id and returns it.
    pub fn append(&mut self, new: NewMood) -> MoodRecord {
        let id = self.allocate_id();
        let record = new.with_id(id);
        self.moods.push(record.clone());
        record
    }
}

pub struct FallbackStore {
    path: PathBuf,
}

impl FallbackStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Reads the full document. A missing or corrupt file yields the empty
    /// document: the orchestrator must stay usable with a damaged local file,
    /// so corruption is logged and swallowed here.
    pub fn load(&self) -> FallbackData {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return FallbackData::default();
            }
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Failed to read fallback store, treating as empty");
                return FallbackData::default();
            }
        };

        match serde_json::from_str::<FallbackData>(&contents) {
            Ok(mut data) => {
                // Reconcile the counter for files written before it existed.
                let max_id = data.moods.iter().map(|m| m.id).max().unwrap_or(0);
                data.next_id = data.next_id.max(max_id + 1);
                data
            }
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Corrupt fallback store, treating as empty");
                FallbackData::default()
            }
        }
    }

    /// Atomically overwrites the whole document. Reports failure as `false`
    /// so the orchestrator can turn it into a persistence error; never panics.
    pub fn save(&self, data: &FallbackData) -> bool {
        let json = match serde_json::to_string_pretty(data) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize fallback store");
                return false;
            }
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    tracing::error!(path = ?parent, error = %e, "Failed to create fallback store directory");
                    return false;
                }
            }
        }

        let tmp_path = self.path.with_extension("tmp");
        if let Err(e) = std::fs::write(&tmp_path, json) {
            tracing::error!(path = ?tmp_path, error = %e, "Failed to write fallback store");
            return false;
        }
        if let Err(e) = std::fs::rename(&tmp_path, &self.path) {
            tracing::error!(path = ?self.path, error = %e, "Failed to replace fallback store");
            return false;
        }

        true
    }

    /// Wipes the store. Startup-only reset, gated by config.
    pub fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::info!(path = ?self.path, "Cleared fallback store"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Failed to clear fallback store");
            }
        }
    }
}
