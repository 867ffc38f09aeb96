//! Domain-specific error types for assetflow.
//!
//! This module defines `EngineError`, a `thiserror`-based enum that
//! provides typed error variants for the failure modes the engine itself
//! can produce. Per-task failures (a requirement not ready, an action
//! body returning an error) are *not* represented here: they are recovered
//! at the Node boundary and surfaced through diagnostics instead. Only
//! setup-time and structural failures reach `EngineError`.

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Domain-specific error type for assetflow.
///
/// Provides typed variants for the engine-level failure modes of the
/// error taxonomy (protocol violations, unknown module/task, malformed
/// input). All of these are fatal: they abort graph construction or the
/// whole CLI invocation rather than being recovered per-task.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EngineError {
    /// A task declaration violated the staged protocol (empty name,
    /// wrong shape for its kind).
    #[error("protocol error in task '{name}': {reason}")]
    Protocol {
        /// The task name under construction, if known.
        name: String,
        /// What went wrong.
        reason: String,
    },

    /// The executor made no progress for a full pass with Nodes still
    /// unresolved. Only possible on malformed (cyclic) input, which §1
    /// and §4.3 declare undefined but which the executor still refuses
    /// to hang on.
    #[error("workflow did not terminate: {0} node(s) never became eligible to run")]
    Stuck(usize),

    /// No workflow is registered under the given module identifier.
    #[error("unknown module: {0}")]
    UnknownModule(String),

    /// The module exists but has no task registered under that name.
    #[error("unknown task '{task}' in module '{module}'")]
    UnknownTask {
        /// The module that was searched.
        module: String,
        /// The task name that was not found.
        task: String,
    },

    /// A positional CLI argument was not valid JSON, or did not match
    /// the task's expected argument shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON (de)serialization failure, e.g. while coercing CLI arguments.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An I/O failure at engine setup boundaries (not inside a user
    /// action, which is recovered at the Node boundary instead).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Builds a `Protocol` error for the named task.
    pub fn protocol(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Protocol {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_display() {
        let err = EngineError::protocol("b", "empty name");
        assert_eq!(err.to_string(), "protocol error in task 'b': empty name");
    }

    #[test]
    fn test_stuck_display() {
        let err = EngineError::Stuck(2);
        assert_eq!(
            err.to_string(),
            "workflow did not terminate: 2 node(s) never became eligible to run"
        );
    }

    #[test]
    fn test_unknown_task_display() {
        let err = EngineError::UnknownTask {
            module: "demos".to_string(),
            task: "frobnicate".to_string(),
        };
        assert_eq!(err.to_string(), "unknown task 'frobnicate' in module 'demos'");
    }

    #[test]
    fn test_serialization_from() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: EngineError = parse_err.into();
        assert!(matches!(err, EngineError::Serialization(_)));
    }
}
