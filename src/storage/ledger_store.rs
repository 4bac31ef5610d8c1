//! Ledger persistence: the violation ledger as a pretty JSON array.
//!
//! Storage file: `violation_users.json` (configurable via `ledger_path`).
//! Loaded once at startup, rewritten after every cycle.

use std::path::{Path, PathBuf};

use crate::error::WardenResult;
use crate::moderation::ledger::{ViolationLedger, ViolationRecord};

pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persisted records. Absent file → empty. Corrupt file → warning, empty.
    pub fn load(&self) -> Vec<ViolationRecord> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "No ledger file yet, starting empty");
            return Vec::new();
        }
        match self.read() {
            Ok(records) => {
                tracing::info!(path = %self.path.display(), users = records.len(), "Ledger loaded");
                records
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Unreadable ledger file, starting empty");
                Vec::new()
            }
        }
    }

    pub fn read(&self) -> WardenResult<Vec<ViolationRecord>> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write via temp file + rename so a crash never leaves half a file.
    pub fn save(&self, ledger: &ViolationLedger) -> WardenResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&ledger.snapshot())?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), users = ledger.len(), "Ledger saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::UserId;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("ledger.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_then_restore_keeps_counts() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("nested").join("ledger.json"));

        let mut ledger = ViolationLedger::new(3, []);
        ledger.record_violation(UserId(1), "spam");
        ledger.record_violation(UserId(1), "spam2");
        ledger.record_violation(UserId(2), "ad");
        store.save(&ledger).unwrap();

        let mut restored = ViolationLedger::new(3, []);
        restored.restore(store.load());
        assert_eq!(restored.len(), 2);
        let record = restored.get(UserId(1)).unwrap();
        assert_eq!(record.matched_snippets, vec!["spam", "spam2"]);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "[{broken").unwrap();
        let store = LedgerStore::new(&path);
        assert!(store.read().is_err());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_file_without_optional_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let json = r#"[{"user_id": 9, "matched_snippets": ["a", "b"],
            "first_seen": "2026-01-01T00:00:00Z", "last_seen": "2026-01-02T00:00:00Z"}]"#;
        std::fs::write(&path, json).unwrap();

        let records = LedgerStore::new(&path).read().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].count(), 2);
        assert!(!records[0].escalated);
        assert!(records[0].blocked_at.is_none());
    }
}
