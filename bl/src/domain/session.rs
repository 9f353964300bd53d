//! SessionDescriptor - identity and storage paths of one customer session

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Identifies one customer session
///
/// Immutable once created. A new session replaces the descriptor wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescriptor {
    /// Stable session key (folder name or raw-storage path)
    #[serde(rename = "session-key")]
    pub session_key: String,

    /// Folder holding the session's captured content
    #[serde(rename = "storage-path")]
    pub storage_path: PathBuf,

    /// Raw capture folder, when the camera writes raws separately
    #[serde(rename = "raw-storage-path", default, skip_serializing_if = "Option::is_none")]
    pub raw_storage_path: Option<PathBuf>,
}

impl SessionDescriptor {
    /// Create a descriptor with a key and storage path
    pub fn new(session_key: impl Into<String>, storage_path: impl Into<PathBuf>) -> Self {
        let session_key = session_key.into();
        debug!(%session_key, "SessionDescriptor::new: called");
        Self {
            session_key,
            storage_path: storage_path.into(),
            raw_storage_path: None,
        }
    }

    /// Attach a raw capture folder
    pub fn with_raw_storage(mut self, raw_storage_path: impl Into<PathBuf>) -> Self {
        self.raw_storage_path = Some(raw_storage_path.into());
        self
    }

    /// Path handed to the content loader
    pub fn content_path(&self) -> &Path {
        &self.storage_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_serialization_uses_kebab_keys() {
        let desc = SessionDescriptor::new("booth-0042", "/srv/booth/0042").with_raw_storage("/srv/raw/0042");

        let json = serde_json::to_string(&desc).unwrap();
        assert!(json.contains("session-key"));
        assert!(json.contains("raw-storage-path"));

        let back: SessionDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, desc);
    }

    #[test]
    fn test_raw_storage_is_optional() {
        let desc: SessionDescriptor =
            serde_json::from_str(r#"{"session-key": "a", "storage-path": "/tmp/a"}"#).unwrap();
        assert!(desc.raw_storage_path.is_none());
        assert_eq!(desc.content_path(), Path::new("/tmp/a"));
    }
}
