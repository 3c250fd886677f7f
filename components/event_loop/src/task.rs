//! Task records and their callbacks.
//!
//! A [`TaskRecord`] is one scheduled unit of work, macro or micro. Records
//! carry their own shared cancellation flag so that a handle can reach
//! them in O(1) no matter which queue currently holds them.

use crate::event_loop::LoopContext;
use core_types::{TaskError, TaskId, TaskKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// The unit of work carried by a task.
///
/// Callbacks receive a [`LoopContext`] so they can schedule follow-up work
/// or cancel handles on the loop that is running them.
pub type Callback = Box<dyn FnMut(&mut LoopContext) -> Result<(), TaskError> + Send>;

/// Shared cancellation flag for one task.
///
/// One clone lives inside the queued [`TaskRecord`], another in the
/// [`CancellationRegistry`](crate::CancellationRegistry). The flag is set
/// at most once; a set flag never clears.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a flag in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the task cancelled. The transition is one-way.
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true if the task has been cancelled.
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One scheduled unit of work, macro or micro.
///
/// A record belongs to exactly one queue at a time; the loop removes it
/// from its queue before invoking the callback, so a running callback can
/// never observe itself as still queued.
pub struct TaskRecord {
    id: TaskId,
    kind: TaskKind,
    due_time: Duration,
    interval: Option<Duration>,
    callback: Callback,
    cancelled: CancelFlag,
    sequence: u64,
}

impl TaskRecord {
    pub(crate) fn new(
        id: TaskId,
        kind: TaskKind,
        due_time: Duration,
        interval: Option<Duration>,
        sequence: u64,
        cancelled: CancelFlag,
        callback: Callback,
    ) -> Self {
        Self {
            id,
            kind,
            due_time,
            interval,
            callback,
            cancelled,
            sequence,
        }
    }

    /// The unique id of this task.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Whether this is a micro- or macrotask.
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// The instant at or after which the task becomes eligible.
    ///
    /// Meaningful for macrotasks only; microtasks are always eligible once
    /// enqueued.
    pub fn due_time(&self) -> Duration {
        self.due_time
    }

    /// The repeat interval, if this task re-arms after each run.
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Insertion order among all records ever created on the owning loop;
    /// the FIFO tie-breaker in both queues.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns true once the task has been cancelled.
    ///
    /// Cancelled records are inert forever: the loop discards them
    /// silently instead of invoking the callback.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.is_set()
    }

    /// Runs the callback for one invocation.
    pub(crate) fn invoke(&mut self, ctx: &mut LoopContext) -> Result<(), TaskError> {
        (self.callback)(ctx)
    }

    /// Re-arms a repeating record with a new due time and a fresh sequence
    /// number, so it queues after same-due-time work scheduled earlier.
    pub(crate) fn rearm(&mut self, due_time: Duration, sequence: u64) {
        self.due_time = due_time;
        self.sequence = sequence;
    }
}

impl std::fmt::Debug for TaskRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRecord")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("due_time", &self.due_time)
            .field("interval", &self.interval)
            .field("cancelled", &self.is_cancelled())
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}
