//! Append-only diagnostic log
//!
//! Failure entries land in a local text file, one line each:
//! `[2025-05-01T10:00:00.000Z] message`. Writes are best-effort; a write
//! error is traced and dropped, never returned to the code that hit the
//! original failure.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: Arc<PathBuf>,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fire-and-forget write.
    ///
    /// Inside a tokio runtime the append runs on a spawned task; outside one it
    /// is written synchronously.
    pub fn record(&self, message: impl Into<String>) {
        let message = message.into();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let log = self.clone();
                handle.spawn(async move {
                    if let Err(e) = log.append(&message).await {
                        warn!(path = %log.path.display(), error = %e, "Failed to write error log");
                    }
                });
            }
            Err(_) => {
                if let Err(e) = self.append_blocking(&message) {
                    warn!(path = %self.path.display(), error = %e, "Failed to write error log");
                }
            }
        }
    }

    pub async fn append(&self, message: &str) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path.as_path())
            .await?;

        file.write_all(format_entry(Utc::now(), message).as_bytes())
            .await?;
        file.flush().await
    }

    /// Error that ended a command without a panic; awaited so it lands before exit
    pub async fn record_non_fatal(&self, message: impl fmt::Display) {
        if let Err(e) = self.append(&format!("Non-fatal: {message}")).await {
            warn!(path = %self.path.display(), error = %e, "Failed to write error log");
        }
    }

    pub fn append_blocking(&self, message: &str) -> std::io::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path.as_path())?;

        file.write_all(format_entry(Utc::now(), message).as_bytes())
    }
}

pub fn format_entry(at: DateTime<Utc>, message: &str) -> String {
    format!(
        "[{}] {}\n",
        at.to_rfc3339_opts(SecondsFormat::Millis, true),
        message
    )
}

/// Route panics to the diagnostic log as `Fatal: ...` before the default hook runs
pub fn install_panic_hook(log: ErrorLog) {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |info| {
        let payload = info.payload();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());

        if let Err(e) = log.append_blocking(&format!("Fatal: {message}")) {
            eprintln!("failed to write error log: {e}");
        }

        default_hook(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    #[test]
    fn test_entry_format() {
        let at = Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(
            format_entry(at, "Network error"),
            "[2025-05-01T10:00:00.000Z] Network error\n"
        );
    }

    #[tokio::test]
    async fn test_append_keeps_previous_entries() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("error-log.txt"));

        log.append("first").await.unwrap();
        log.append("second").await.unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("] first"));
        assert!(lines[1].ends_with("] second"));
    }

    #[tokio::test]
    async fn test_record_is_written_in_background() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("error-log.txt"));

        log.record("background failure");

        let mut contents = String::new();
        for _ in 0..50 {
            contents = std::fs::read_to_string(log.path()).unwrap_or_default();
            if !contents.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(contents.contains("background failure"));
    }

    #[tokio::test]
    async fn test_non_fatal_entry_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("error-log.txt"));

        log.record_non_fatal("post was not published").await;

        let contents = std::fs::read_to_string(log.path()).unwrap();
        assert!(contents.trim_end().ends_with("] Non-fatal: post was not published"));
    }

    #[test]
    fn test_record_outside_runtime_writes_synchronously() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("error-log.txt"));

        log.record("sync failure");

        let contents = std::fs::read_to_string(log.path()).unwrap();
        assert!(contents.contains("sync failure"));
    }

    #[test]
    fn test_unwritable_path_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("missing").join("error-log.txt"));

        log.record("dropped");
        assert!(log.append_blocking("dropped").is_err());
    }
}
