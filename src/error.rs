//! Error types used by the dispatch runtime.
//!
//! This module defines two error enums:
//!
//! - [`RuntimeError`] — errors raised by the orchestration runtime itself.
//! - [`DispatchError`] — errors raised by consumer registry operations.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//!
//! Per-message outcome failures (a dead-letter move or re-enqueue the queue
//! refused) are **not** errors: they are reported as events on the bus and
//! the dispatch loop keeps going. See [`crate::events::EventKind`].

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the dispatch runtime.
///
/// These represent failures in the orchestration layer itself, such as a
/// shutdown sequence exceeding its grace period.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some subscription workers remained stuck.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}; forcing termination")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of subscriptions whose workers did not stop in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use subflow::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck subscriptions={stuck:?}")
            }
        }
    }
}

/// # Errors produced by consumer registry operations.
///
/// Attach/detach originate from the link-lifecycle control path, not the
/// dispatch path, so these never surface inside per-message processing.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A consumer with the same identifier is already attached.
    #[error("consumer `{id}` is already attached")]
    ConsumerExists {
        /// The offending consumer identifier.
        id: String,
    },

    /// No consumer with this identifier is attached.
    #[error("consumer `{id}` is not attached")]
    ConsumerNotFound {
        /// The requested consumer identifier.
        id: String,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use subflow::DispatchError;
    ///
    /// let err = DispatchError::ConsumerExists { id: "link-1".into() };
    /// assert_eq!(err.as_label(), "consumer_exists");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::ConsumerExists { .. } => "consumer_exists",
            DispatchError::ConsumerNotFound { .. } => "consumer_not_found",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::ConsumerExists { id } => format!("already attached: {id}"),
            DispatchError::ConsumerNotFound { id } => format!("not attached: {id}"),
        }
    }
}
