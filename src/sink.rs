use std::io::Write as _;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{trace, warn};

use crate::types::now_rfc3339;

/// Serialized, append-only result log.
///
/// Every `write` produces one `<timestamp> | <message>` line in the log file
/// and the identical line on stdout, under a single lock. I/O failures are
/// counted and otherwise ignored.
#[derive(Debug)]
pub struct ResultSink {
    file: Mutex<Option<File>>,
    echo_stdout: bool,
    failures: AtomicU64,
}

impl ResultSink {
    /// Open `path` for appending, creating it if needed. If that fails the
    /// sink keeps going with stdout only.
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let sink = Self::stdout_only();
        match OpenOptions::new().create(true).append(true).open(path).await {
            Ok(f) => {
                *sink.file.lock().await = Some(f);
            }
            Err(e) => {
                warn!("result log {} unavailable, stdout only: {e}", path.display());
                sink.failures.fetch_add(1, Ordering::Relaxed);
            }
        }
        sink
    }

    pub fn stdout_only() -> Self {
        Self {
            file: Mutex::new(None),
            echo_stdout: true,
            failures: AtomicU64::new(0),
        }
    }

    /// Toggle the stdout mirror.
    pub fn with_stdout(mut self, echo: bool) -> Self {
        self.echo_stdout = echo;
        self
    }

    /// Append one timestamped line. Never fails.
    pub async fn write(&self, message: &str) {
        let line = format!("{} | {}\n", now_rfc3339(), message);

        let mut guard = self.file.lock().await;
        if let Some(f) = guard.as_mut() {
            let res = async {
                f.write_all(line.as_bytes()).await?;
                f.flush().await
            }
            .await;
            if let Err(e) = res {
                trace!("result log write failed: {e}");
                self.failures.fetch_add(1, Ordering::Relaxed);
            }
        }
        if self.echo_stdout {
            let mut out = std::io::stdout().lock();
            if out.write_all(line.as_bytes()).and_then(|_| out.flush()).is_err() {
                self.failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Number of swallowed I/O errors so far.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}
