//! BoothServices trait - the collaborators the coordinator drives
//!
//! Content loading and busy-work cancellation happen outside the timeline.
//! The coordinator calls them from spawned tasks so a slow collaborator never
//! stalls the actor loop.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use eyre::{Context, Result, eyre};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::ServicesConfig;

#[async_trait]
pub trait BoothServices: Send + Sync {
    /// Load a session's content; returns the number of items found
    async fn load_session_content(&self, path: &Path) -> Result<usize>;

    /// Best-effort cancel of in-flight export/import work
    async fn cancel_busy_work(&self) -> Result<()>;
}

/// Services backed by the local filesystem and an optional cancel command
#[derive(Debug, Clone, Default)]
pub struct LocalServices {
    cancel_command: Option<Vec<String>>,
}

impl LocalServices {
    pub fn new(cancel_command: Option<Vec<String>>) -> Self {
        debug!(?cancel_command, "LocalServices::new: called");
        Self { cancel_command }
    }

    pub fn from_config(config: &ServicesConfig) -> Self {
        Self::new(config.cancel_command.clone())
    }
}

#[async_trait]
impl BoothServices for LocalServices {
    async fn load_session_content(&self, path: &Path) -> Result<usize> {
        debug!(path = %path.display(), "LocalServices::load_session_content: called");
        let mut entries = tokio::fs::read_dir(path)
            .await
            .context(format!("Failed to open session storage {}", path.display()))?;

        let mut items = 0;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                items += 1;
            }
        }

        info!(path = %path.display(), items, "Session content loaded");
        Ok(items)
    }

    async fn cancel_busy_work(&self) -> Result<()> {
        let Some((program, args)) = self.cancel_command.as_deref().and_then(|argv| argv.split_first()) else {
            warn!("No cancel command configured, busy work left running");
            return Ok(());
        };

        info!(%program, "Canceling busy work");
        let output = Command::new(program)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .context(format!("Failed to run cancel command {}", program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(eyre!("Cancel command failed: {}", stderr.trim()));
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_counts_files_only() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("IMG_0001.jpg"), b"jpg").unwrap();
        std::fs::write(temp.path().join("IMG_0002.jpg"), b"jpg").unwrap();
        std::fs::create_dir(temp.path().join("thumbs")).unwrap();

        let services = LocalServices::default();
        assert_eq!(services.load_session_content(temp.path()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_load_missing_storage_fails() {
        let services = LocalServices::default();
        let result = services
            .load_session_content(Path::new("/nonexistent/boothlock/session"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_cancel_without_command_is_ok() {
        let services = LocalServices::default();
        assert!(services.cancel_busy_work().await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancel_command_failure_is_reported() {
        let services = LocalServices::new(Some(vec!["false".to_string()]));
        assert!(services.cancel_busy_work().await.is_err());

        let services = LocalServices::new(Some(vec!["true".to_string()]));
        assert!(services.cancel_busy_work().await.is_ok());
    }
}
