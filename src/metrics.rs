use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use crate::common::config::TransferConfig;
use crate::common::error::{ErrorKind, TransferError};
use crate::transfer::{Role, TransferSummary};

/// Record of one transfer, success or failure, as exported to JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReport {
    pub role: Role,
    pub config: TransferConfig,
    pub started_at: String,
    pub elapsed_ms: u64,
    pub success: bool,
    pub bytes_transferred: u64,
    /// Announced payload size; 0 when the transfer failed before it was known
    pub expected_bytes: u64,
    pub chunks: u64,
    pub throughput_bytes_per_sec: f64,
    pub peer: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub error_message: Option<String>,
}

#[derive(Debug)]
pub struct TransferMetrics {
    role: Role,
    config: TransferConfig,
    started_at: chrono::DateTime<chrono::Local>,
    start_time: Instant,
    source_size: Option<u64>,
}

impl TransferMetrics {
    /// Start timing a transfer. For a send, the source size is captured up
    /// front so failed sends still report what they were meant to move.
    pub fn start(role: Role, config: TransferConfig) -> Self {
        let source_size = match role {
            Role::Send => config
                .filename
                .as_deref()
                .and_then(|path| fs::metadata(path).ok())
                .map(|metadata| metadata.len()),
            Role::Receive => None,
        };

        Self {
            role,
            config,
            started_at: chrono::Local::now(),
            start_time: Instant::now(),
            source_size,
        }
    }

    pub fn finish(&self, result: &Result<TransferSummary, TransferError>) -> TransferReport {
        let elapsed = self.start_time.elapsed();
        let mut report = TransferReport {
            role: self.role,
            config: self.config.clone(),
            started_at: self.started_at.to_rfc3339(),
            elapsed_ms: elapsed.as_millis() as u64,
            success: result.is_ok(),
            bytes_transferred: 0,
            expected_bytes: 0,
            chunks: 0,
            throughput_bytes_per_sec: 0.0,
            peer: None,
            error_kind: None,
            error_message: None,
        };

        match result {
            Ok(summary) => {
                report.bytes_transferred = summary.bytes;
                report.expected_bytes = summary.bytes;
                report.chunks = summary.chunks;
                report.peer = summary.peer.map(|addr| addr.to_string());
                report.throughput_bytes_per_sec = throughput(summary.bytes, summary.elapsed.as_secs_f64());
            }
            Err(e) => {
                // Only a truncated receive knows how far it got.
                if let TransferError::Truncated { received, expected } = e {
                    report.bytes_transferred = *received;
                    report.expected_bytes = *expected;
                } else {
                    report.expected_bytes = self.source_size.unwrap_or(0);
                }
                report.error_kind = Some(e.kind());
                report.error_message = Some(e.to_string());
            }
        }

        report
    }
}

impl TransferReport {
    pub fn export_to_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json_string = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json_string.as_bytes())?;

        Ok(())
    }
}

fn throughput(bytes: u64, secs: f64) -> f64 {
    if secs <= 0.0 {
        return 0.0;
    }
    bytes as f64 / secs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_throughput() {
        assert_eq!(throughput(1000, 2.0), 500.0);
        assert_eq!(throughput(1000, 0.0), 0.0);
    }

    #[test]
    fn test_success_report() {
        let metrics = TransferMetrics::start(
            Role::Send,
            TransferConfig::sender("127.0.0.1", 12345, "notes.txt"),
        );
        let summary = TransferSummary {
            role: Role::Send,
            bytes: 10000,
            chunks: 3,
            elapsed: Duration::from_millis(500),
            peer: Some("127.0.0.1:12345".parse().unwrap()),
        };

        let report = metrics.finish(&Ok(summary));

        assert!(report.success);
        assert_eq!(report.bytes_transferred, 10000);
        assert_eq!(report.expected_bytes, 10000);
        assert_eq!(report.chunks, 3);
        assert_eq!(report.throughput_bytes_per_sec, 20000.0);
        assert_eq!(report.peer.as_deref(), Some("127.0.0.1:12345"));
        assert!(report.error_kind.is_none());
    }

    #[test]
    fn test_failure_report_export() {
        let metrics = TransferMetrics::start(Role::Receive, TransferConfig::receiver("127.0.0.1", 0));
        let report = metrics.finish(&Err(TransferError::Truncated {
            received: 1,
            expected: 3,
        }));

        assert!(!report.success);
        assert_eq!(report.bytes_transferred, 1);
        assert_eq!(report.expected_bytes, 3);
        assert_eq!(report.error_kind, Some(ErrorKind::TruncatedTransfer));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        report.export_to_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["role"], "receive");
        assert_eq!(value["success"], false);
        assert_eq!(value["error_kind"], "TruncatedTransfer");
        assert_eq!(value["expected_bytes"], 3);
        assert_eq!(value["bytes_transferred"], 1);
        assert_eq!(value["config"]["address"], "127.0.0.1");
    }

    #[test]
    fn test_failed_send_reports_source_size() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("notes.txt");
        std::fs::write(&source, b"0123456789").unwrap();

        let metrics = TransferMetrics::start(
            Role::Send,
            TransferConfig::sender("127.0.0.1", 12345, &source),
        );
        let report = metrics.finish(&Err(TransferError::ConnectionRefused {
            address: "127.0.0.1:12345".to_string(),
        }));

        assert!(!report.success);
        assert_eq!(report.bytes_transferred, 0);
        assert_eq!(report.expected_bytes, 10);
        assert_eq!(report.error_kind, Some(ErrorKind::ConnectionRefused));
    }
}
