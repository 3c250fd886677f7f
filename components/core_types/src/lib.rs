//! Core scheduler vocabulary types and error handling.
//!
//! This crate provides the foundational types shared across the scheduler
//! components: task identity, the micro/macro priority split, loop states,
//! and the error taxonomy.
//!
//! # Overview
//!
//! - [`TaskId`] - Unique identity of a scheduled task
//! - [`TaskKind`] - The micro/macro priority tier of a task
//! - [`Handle`] - Opaque cancellation token
//! - [`LoopState`] - States of the event loop's run algorithm
//! - [`TaskError`] - Error returned by a failing callback
//! - [`SchedulerError`] - Fatal misuse of the run loop
//!
//! # Examples
//!
//! ```
//! use core_types::{TaskError, TaskId, TaskKind};
//!
//! let id = TaskId(7);
//! assert_eq!(id.to_string(), "task(7)");
//! assert_eq!(TaskKind::Micro.to_string(), "microtask");
//!
//! let error = TaskError::new("connection reset");
//! assert_eq!(error.to_string(), "connection reset");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod task;

pub use error::{SchedulerError, TaskError};
pub use task::{Handle, LoopState, TaskId, TaskKind};
