//! Scheduler error types.
//!
//! This module provides the two halves of the error taxonomy: errors a
//! user callback returns while running, which the loop recovers from, and
//! misuse of the loop itself, which aborts the offending run.

use crate::LoopState;
use thiserror::Error;

/// An error returned by a user callback during execution.
///
/// Callback errors are recovered locally: the loop catches them at the
/// call site, reports them once through its error sink, and continues
/// scheduling. One failing task never aborts a microtask drain or stops
/// the loop.
///
/// # Examples
///
/// ```
/// use core_types::TaskError;
///
/// let error = TaskError::new("connection reset");
/// assert_eq!(error.to_string(), "connection reset");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TaskError {
    /// Human-readable description of the failure
    pub message: String,
}

impl TaskError {
    /// Creates a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for TaskError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for TaskError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

/// Fatal misuse of the scheduler.
///
/// Unlike [`TaskError`], these abort the offending `run_*` call: they
/// indicate the host violated the single-flow-of-control contract, not
/// that a scheduled callback failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// A `run_*` method was entered while the loop was already running a
    /// unit of work.
    #[error("event loop entered reentrantly while {0}")]
    ReentrantRun(LoopState),

    /// A `run_*` method was called on a loop that has been stopped.
    #[error("event loop has been stopped")]
    Stopped,
}
