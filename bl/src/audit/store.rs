//! AuditStore - append-only JSONL sink for override entries
//!
//! Entries from every session land in one `overrides.jsonl` file under the
//! audit directory; readers filter by session key.

use std::path::PathBuf;

use eyre::{Context, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::log::OverrideAuditEntry;

/// JSONL store for override audit entries
#[derive(Debug, Clone)]
pub struct AuditStore {
    dir: PathBuf,
}

impl AuditStore {
    /// Create a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        debug!(?dir, "AuditStore::new: called");
        Self { dir }
    }

    /// Path of the JSONL file
    pub fn audit_file(&self) -> PathBuf {
        self.dir.join("overrides.jsonl")
    }

    /// Append one entry
    pub async fn persist(&self, entry: &OverrideAuditEntry) -> Result<()> {
        debug!(id = %entry.id, action = %entry.action, "AuditStore::persist: called");
        fs::create_dir_all(&self.dir)
            .await
            .context(format!("Failed to create audit directory {}", self.dir.display()))?;

        let line = serde_json::to_string(entry)? + "\n";
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.audit_file())
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!("AuditStore::persist: entry written");
        Ok(())
    }

    /// Read every stored entry, oldest first
    ///
    /// Lines that fail to parse are skipped with a warning.
    pub async fn read_all(&self) -> Result<Vec<OverrideAuditEntry>> {
        let audit_file = self.audit_file();
        debug!(?audit_file, "AuditStore::read_all: called");

        if !audit_file.exists() {
            debug!("AuditStore::read_all: audit file does not exist");
            return Ok(vec![]);
        }

        let content = fs::read_to_string(&audit_file)
            .await
            .context("Failed to read audit file")?;

        let mut entries = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<OverrideAuditEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(line = index + 1, error = %e, "Skipping malformed audit line"),
            }
        }

        debug!(count = entries.len(), "AuditStore::read_all: returning entries");
        Ok(entries)
    }

    /// Read the entries recorded for one session
    pub async fn read_session(&self, session_key: &str) -> Result<Vec<OverrideAuditEntry>> {
        debug!(%session_key, "AuditStore::read_session: called");
        let entries = self
            .read_all()
            .await?
            .into_iter()
            .filter(|e| e.session_key.as_deref() == Some(session_key))
            .collect();
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::OverrideAction;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_persist_and_read_back() {
        let temp = tempdir().unwrap();
        let store = AuditStore::new(temp.path().join("audit"));

        let first = OverrideAuditEntry::new(OverrideAction::TMinus5Dismiss, Some("s-1".to_string()));
        let second = OverrideAuditEntry::new(OverrideAction::N59ResetPostpone, Some("s-2".to_string()));
        store.persist(&first).await.unwrap();
        store.persist(&second).await.unwrap();

        let all = store.read_all().await.unwrap();
        assert_eq!(all, vec![first.clone(), second]);

        let session = store.read_session("s-1").await.unwrap();
        assert_eq!(session, vec![first]);
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let temp = tempdir().unwrap();
        let store = AuditStore::new(temp.path());
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_lines_are_skipped() {
        let temp = tempdir().unwrap();
        let store = AuditStore::new(temp.path());

        let entry = OverrideAuditEntry::new(OverrideAction::TZeroContinueWorking, None);
        store.persist(&entry).await.unwrap();
        let mut content = std::fs::read_to_string(store.audit_file()).unwrap();
        content.push_str("not json\n");
        std::fs::write(store.audit_file(), content).unwrap();

        let all = store.read_all().await.unwrap();
        assert_eq!(all.len(), 1);
    }
}
