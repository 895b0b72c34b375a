//! Append-only alert sink.
//!
//! Request tasks hand records to [`AlertSink`], a cheap clonable sender.
//! A single [`AlertWriter`] task owns the log file and serializes every
//! write, so concurrent requests never interleave lines. Ordering across
//! requests is arrival order at the channel, nothing stronger.
//!
//! The writer exits once every sender is dropped and the queue is drained.

use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::alert::record::AlertRecord;
use crate::config::AlertConfig;
use crate::observability::metrics;

/// Sender half handed to request handlers.
#[derive(Debug, Clone)]
pub struct AlertSink {
    tx: mpsc::UnboundedSender<AlertRecord>,
}

impl AlertSink {
    /// Create a sink and the receiver its records arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AlertRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue a record. Never blocks.
    pub fn emit(&self, record: AlertRecord) {
        if self.tx.send(record).is_err() {
            tracing::error!("Alert writer is gone, alert dropped");
            metrics::record_alert_written(false);
        }
    }
}

/// Owns the alert log file and drains the sink.
pub struct AlertWriter {
    rx: mpsc::UnboundedReceiver<AlertRecord>,
    file: Option<(PathBuf, File)>,
    stdout: bool,
}

impl AlertWriter {
    /// Open (create, append) the configured log file.
    pub async fn open(
        config: &AlertConfig,
        rx: mpsc::UnboundedReceiver<AlertRecord>,
    ) -> Result<Self, std::io::Error> {
        let file = match &config.log_path {
            Some(path) => {
                let path = PathBuf::from(path);
                Some((path.clone(), open_append(&path).await?))
            }
            None => None,
        };

        if let Some((path, _)) = &file {
            tracing::info!(path = %path.display(), "Alert log opened");
        }

        Ok(Self {
            rx,
            file,
            stdout: config.stdout,
        })
    }

    /// Drain records until every sender is dropped.
    pub async fn run(mut self) {
        let mut written = 0u64;
        while let Some(record) = self.rx.recv().await {
            match self.write(&record).await {
                Ok(()) => {
                    written += 1;
                    metrics::record_alert_written(true);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to write alert");
                    metrics::record_alert_written(false);
                }
            }
        }
        if let Some((_, file)) = self.file.as_mut() {
            if let Err(e) = file.flush().await {
                tracing::error!(error = %e, "Failed to flush alert log");
            }
        }
        tracing::info!(written, "Alert writer stopped");
    }

    async fn write(&mut self, record: &AlertRecord) -> Result<(), std::io::Error> {
        let line = serde_json::to_string(record)?;

        if self.stdout {
            tracing::info!(target: "honeytrap::alert", "{}", line);
        }
        if let Some((_, file)) = self.file.as_mut() {
            file.write_all(line.as_bytes()).await?;
            file.write_all(b"\n").await?;
            file.flush().await?;
        }
        Ok(())
    }
}

async fn open_append(path: &Path) -> Result<File, std::io::Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    OpenOptions::new().create(true).append(true).open(path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::record::build_alert;
    use crate::http::request::tests::normalized;
    use crate::traps::{resolve, ResponseSpec, TrapConfig};

    fn record(path: &str) -> AlertRecord {
        let config = TrapConfig::with_default(ResponseSpec::new("text/html", "404.html"));
        let req = normalized("GET", path, &[], "");
        build_alert(&req, &resolve(&req, &config), chrono::Utc::now())
    }

    #[tokio::test]
    async fn concurrent_emitters_write_whole_lines() {
        let dir = std::env::temp_dir().join(format!("honeytrap-sink-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("alerts.log");
        let config = AlertConfig {
            log_path: Some(path.to_string_lossy().into_owned()),
            stdout: false,
        };

        let (sink, rx) = AlertSink::channel();
        let writer = AlertWriter::open(&config, rx).await.unwrap();
        let writer_task = tokio::spawn(writer.run());

        let mut tasks = Vec::new();
        for i in 0..16 {
            let sink = sink.clone();
            tasks.push(tokio::spawn(async move {
                for j in 0..10 {
                    sink.emit(record(&format!("/t{}/{}", i, j)));
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        drop(sink);
        writer_task.await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 160);
        for line in lines {
            let parsed: AlertRecord = serde_json::from_str(line).unwrap();
            assert_eq!(parsed.http_response, 404);
        }

        std::fs::remove_dir_all(&dir).unwrap_or_default();
    }

    #[tokio::test]
    async fn reopening_appends() {
        let path = std::env::temp_dir().join(format!("honeytrap-append-{}.log", uuid::Uuid::new_v4()));
        let config = AlertConfig {
            log_path: Some(path.to_string_lossy().into_owned()),
            stdout: false,
        };

        for _ in 0..2 {
            let (sink, rx) = AlertSink::channel();
            let writer = AlertWriter::open(&config, rx).await.unwrap();
            sink.emit(record("/again"));
            drop(sink);
            writer.run().await;
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[tokio::test]
    async fn emit_after_writer_stopped_does_not_panic() {
        let (sink, rx) = AlertSink::channel();
        drop(rx);
        sink.emit(record("/late"));
    }
}
