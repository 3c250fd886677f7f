//! Cooperative single-threaded event loop.
//!
//! This crate provides the scheduler core of a cooperative, single-threaded
//! runtime:
//! - A due-time-ordered macrotask queue with repeating timers
//! - A strict-FIFO microtask queue, drained to exhaustion between macrotasks
//! - A run loop with deterministic, testable interleaving guarantees
//! - O(1) timer cancellation through opaque handles
//!
//! # Overview
//!
//! - [`EventLoop`] - The orchestrator owning the queues, clock, and registry
//! - [`LoopContext`] - Scheduling capability handed to running callbacks
//! - [`Clock`] / [`SystemClock`] / [`VirtualClock`] - Injected time sources
//! - [`MacrotaskQueue`] / [`MicrotaskQueue`] - The two priority tiers
//! - [`CancellationRegistry`] - Handle-to-task cancellation bookkeeping
//!
//! # Examples
//!
//! ```
//! use event_loop::{EventLoop, VirtualClock};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = Arc::new(VirtualClock::new());
//! let mut event_loop = EventLoop::with_clock(clock);
//!
//! event_loop.schedule_task(|_ctx| Ok(()), Duration::ZERO);
//! event_loop.run_until_idle().unwrap();
//! ```
//!
//! Callbacks receive a [`LoopContext`] and may schedule further work:
//!
//! ```
//! use event_loop::{EventLoop, VirtualClock};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let mut event_loop = EventLoop::with_clock(Arc::new(VirtualClock::new()));
//! event_loop.schedule_task(
//!     |ctx| {
//!         ctx.schedule_microtask(|_ctx| Ok(()));
//!         Ok(())
//!     },
//!     Duration::ZERO,
//! );
//! event_loop.run_until_idle().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod event_loop;
pub mod guard;
pub mod registry;
pub mod task;
pub mod task_queue;

// Re-export main types at crate root
pub use clock::{Clock, SystemClock, VirtualClock};
pub use event_loop::{ErrorHandler, EventLoop, LoopContext, RepeatPolicy};
pub use guard::ExecutionGuard;
pub use registry::CancellationRegistry;
pub use task::{Callback, CancelFlag, TaskRecord};
pub use task_queue::{MacrotaskQueue, MicrotaskQueue};
