/*!
 * iotop2stats: Error Types
 * -------------------------------------------------------------------
 * Copyright (C) 2025 Laurence Oberman <loberman@redhat.com>
 * License: GPL v3+
 */

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by iotop2stats.
#[derive(Error, Debug)]
pub enum StatsError {
    /// The log file could not be opened or read.
    #[error("Failed to read log {path}: {source}")]
    LogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A per-process sample line does not satisfy the iotop column layout.
    #[error("Malformed sample at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// A throughput unit suffix outside the five iotop emits.
    #[error("Unknown throughput unit: {0}")]
    UnknownUnit(String),

    /// A timestamp field did not parse as HH:MM:SS.
    #[error("Invalid timestamp format: {0}")]
    TimestampParse(String),

    /// The log held no per-process samples, so there is nothing to report.
    #[error("Log contains no per-process samples")]
    EmptySeries,

    /// The graph backend failed while rendering the PNG.
    #[error("Chart rendering failed: {0}")]
    Chart(String),

    /// Pass-through for raw I/O errors that do not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Pass-through for CSV writer errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_log_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = StatsError::LogRead {
            path: PathBuf::from("/some/iotop.log"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read log"));
        assert!(msg.contains("/some/iotop.log"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_malformed() {
        let err = StatsError::Malformed {
            line: 17,
            reason: "expected at least 13 fields, found 4".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 17"));
        assert!(msg.contains("13 fields"));
    }

    #[test]
    fn test_error_display_unknown_unit() {
        let err = StatsError::UnknownUnit("P/s".to_string());
        assert_eq!(err.to_string(), "Unknown throughput unit: P/s");
    }

    #[test]
    fn test_error_display_empty_series() {
        let err = StatsError::EmptySeries;
        assert_eq!(err.to_string(), "Log contains no per-process samples");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StatsError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}
