//! Structured per-task diagnostics (§4.5), mirroring the teacher's split
//! between "proper logging crate" and an in-memory sink for tests,
//! generalized from node-engine's `EventSink`/`NullEventSink`/`VecEventSink`
//! trio.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Severity of a diagnostic record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Level {
    /// Routine progress.
    Info,
    /// A requirement was not ready, or similar recoverable condition.
    Warn,
    /// An action failed.
    Error,
}

/// A single diagnostic emitted while processing a task (§4.5).
#[derive(Debug, Clone)]
pub struct DiagnosticRecord {
    /// When the record was produced.
    pub timestamp: std::time::SystemTime,
    /// Severity.
    pub level: Level,
    /// The task name the record concerns.
    pub task: String,
    /// Human-readable message, possibly carrying a ✔/✖ marker.
    pub message: String,
}

impl fmt::Display for DiagnosticRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self
            .timestamp
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        write!(f, "[{millis}] {:<5}  {}: {}", self.level, self.task, self.message)
    }
}

/// Receives diagnostic records as the engine processes a graph (§4.5).
///
/// Implementations must be safe to share across the worker pool; the
/// executor holds an `Arc<dyn DiagnosticSink>` and clones it into every
/// spawned task.
pub trait DiagnosticSink: Send + Sync {
    /// Records one diagnostic, at the given severity, for the given task.
    fn record(&self, level: Level, task: &str, message: String);
}

/// Discards every record. The default when diagnostics were not
/// requested (§6).
pub struct NullDiagnosticSink;

impl DiagnosticSink for NullDiagnosticSink {
    fn record(&self, _level: Level, _task: &str, _message: String) {}
}

/// Forwards every record to the `tracing` crate at the matching level.
pub struct TracingDiagnosticSink;

impl DiagnosticSink for TracingDiagnosticSink {
    fn record(&self, level: Level, task: &str, message: String) {
        match level {
            Level::Info => tracing::info!(task = task, "{message}"),
            Level::Warn => tracing::warn!(task = task, "{message}"),
            Level::Error => tracing::error!(task = task, "{message}"),
        }
    }
}

/// Accumulates every record in memory, for tests and the CLI's own
/// end-of-run summary.
#[derive(Default)]
pub struct VecDiagnosticSink {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl VecDiagnosticSink {
    /// Builds an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every record recorded so far, in emission order.
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records.lock().clone()
    }
}

impl DiagnosticSink for VecDiagnosticSink {
    fn record(&self, level: Level, task: &str, message: String) {
        self.records.lock().push(DiagnosticRecord {
            timestamp: std::time::SystemTime::now(),
            level,
            task: task.to_string(),
            message,
        });
    }
}

/// Fans a single diagnostic record out to two sinks; used by the CLI to
/// both log via `tracing` and retain an in-memory summary for `-v`.
pub struct TeeDiagnosticSink {
    first: Arc<dyn DiagnosticSink>,
    second: Arc<dyn DiagnosticSink>,
}

impl TeeDiagnosticSink {
    /// Builds a sink that forwards to both `first` and `second`.
    pub fn new(first: Arc<dyn DiagnosticSink>, second: Arc<dyn DiagnosticSink>) -> Self {
        TeeDiagnosticSink { first, second }
    }
}

impl DiagnosticSink for TeeDiagnosticSink {
    fn record(&self, level: Level, task: &str, message: String) {
        self.first.record(level, task, message.clone());
        self.second.record(level, task, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sink_discards() {
        let sink = NullDiagnosticSink;
        sink.record(Level::Info, "a", "hello".to_string());
    }

    #[test]
    fn test_vec_sink_accumulates_in_order() {
        let sink = VecDiagnosticSink::new();
        sink.record(Level::Info, "a", "one".to_string());
        sink.record(Level::Warn, "b", "two".to_string());
        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].task, "a");
        assert_eq!(records[1].level, Level::Warn);
    }

    #[test]
    fn test_record_display_has_marker_in_message() {
        let record = DiagnosticRecord {
            timestamp: std::time::UNIX_EPOCH,
            level: Level::Info,
            task: "t".to_string(),
            message: "\u{2714} done".to_string(),
        };
        let rendered = record.to_string();
        assert!(rendered.contains("t: \u{2714} done"));
        assert!(rendered.contains("INFO"));
    }

    #[test]
    fn test_tee_forwards_to_both() {
        let a = Arc::new(VecDiagnosticSink::new());
        let b = Arc::new(VecDiagnosticSink::new());
        let tee = TeeDiagnosticSink::new(a.clone(), b.clone());
        tee.record(Level::Error, "x", "bad".to_string());
        assert_eq!(a.records().len(), 1);
        assert_eq!(b.records().len(), 1);
    }
}
