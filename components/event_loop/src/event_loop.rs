//! Event loop implementation.
//!
//! The loop owns the task queues, the clock, and the cancellation
//! registry, and interleaves macrotasks with exhaustive microtask drains:
//! each turn takes the single earliest due macrotask, runs it to
//! completion, then drains the microtask queue, including microtasks
//! enqueued while draining, before the next macrotask is considered.

use crate::clock::{Clock, SystemClock};
use crate::guard::ExecutionGuard;
use crate::registry::CancellationRegistry;
use crate::task::{Callback, CancelFlag, TaskRecord};
use crate::task_queue::{MacrotaskQueue, MicrotaskQueue};
use core_types::{Handle, LoopState, SchedulerError, TaskError, TaskId, TaskKind};
use std::sync::Arc;
use std::time::Duration;

/// How a repeating task's next due time is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatPolicy {
    /// Next due time = the instant the previous invocation *began* plus
    /// the interval.
    ///
    /// Matches conventional host timers: drift accumulated by a slow
    /// callback is not compensated.
    #[default]
    FromStart,
    /// Next due time = the instant the previous invocation *finished*
    /// plus the interval, guaranteeing a full quiet interval between
    /// invocations.
    FromCompletion,
}

/// Sink receiving `(task id, error, phase)` for every failed callback.
pub type ErrorHandler = Box<dyn FnMut(TaskId, TaskError, TaskKind) + Send>;

/// The scheduling capability handed to running callbacks.
///
/// A `LoopContext` can create and cancel work on the loop that is running
/// the callback. It exposes none of the `run_*` entry points, so a
/// callback cannot re-enter the loop that is running it.
pub struct LoopContext {
    clock: Arc<dyn Clock>,
    microtasks: MicrotaskQueue,
    macrotasks: MacrotaskQueue,
    registry: CancellationRegistry,
    next_id: u64,
    next_seq: u64,
    repeat_policy: RepeatPolicy,
}

impl LoopContext {
    fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            microtasks: MicrotaskQueue::new(),
            macrotasks: MacrotaskQueue::new(),
            registry: CancellationRegistry::new(),
            next_id: 0,
            next_seq: 0,
            repeat_policy: RepeatPolicy::FromStart,
        }
    }

    /// The current time on the loop's clock.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Schedules a one-shot macrotask due `delay` from now.
    ///
    /// The returned [`Handle`] can cancel the task until it starts
    /// executing.
    pub fn schedule_task<F>(&mut self, callback: F, delay: Duration) -> Handle
    where
        F: FnMut(&mut LoopContext) -> Result<(), TaskError> + Send + 'static,
    {
        let due_time = self.clock.now() + delay;
        self.schedule_macro(Box::new(callback), due_time, None)
    }

    /// Schedules a repeating macrotask firing every `interval`, first at
    /// `now + interval`.
    ///
    /// The task re-arms after each invocation until cancelled.
    pub fn schedule_interval<F>(&mut self, callback: F, interval: Duration) -> Handle
    where
        F: FnMut(&mut LoopContext) -> Result<(), TaskError> + Send + 'static,
    {
        let due_time = self.clock.now() + interval;
        self.schedule_macro(Box::new(callback), due_time, Some(interval))
    }

    /// Schedules a microtask, eligible immediately.
    ///
    /// Microtasks enqueued during a drain are executed by that same
    /// drain, before any further macrotask.
    pub fn schedule_microtask<F>(&mut self, callback: F) -> Handle
    where
        F: FnMut(&mut LoopContext) -> Result<(), TaskError> + Send + 'static,
    {
        let id = self.take_id();
        let sequence = self.take_seq();
        let flag = CancelFlag::new();
        self.registry.register(id, flag.clone());
        let record = TaskRecord::new(
            id,
            TaskKind::Micro,
            Duration::ZERO,
            None,
            sequence,
            flag,
            Box::new(callback),
        );
        tracing::trace!(task = %id, "microtask scheduled");
        self.microtasks.enqueue(record);
        Handle::new(id)
    }

    /// Cancels the task the handle refers to.
    ///
    /// Idempotent and forgiving: unknown, retired, or already-cancelled
    /// handles are silent no-ops. A task cancelled before it is popped
    /// for execution never runs; cancelling a repeating task during its
    /// own invocation prevents every future invocation.
    pub fn cancel(&mut self, handle: Handle) {
        tracing::trace!(task = %handle.id(), "cancel requested");
        self.registry.cancel(handle);
    }

    /// Number of queued microtasks.
    pub fn pending_microtasks(&self) -> usize {
        self.microtasks.len()
    }

    /// Number of queued macrotasks, counting cancelled records awaiting
    /// lazy removal.
    pub fn pending_macrotasks(&self) -> usize {
        self.macrotasks.len()
    }

    fn schedule_macro(
        &mut self,
        callback: Callback,
        due_time: Duration,
        interval: Option<Duration>,
    ) -> Handle {
        let id = self.take_id();
        let sequence = self.take_seq();
        let flag = CancelFlag::new();
        self.registry.register(id, flag.clone());
        let record = TaskRecord::new(
            id,
            TaskKind::Macro,
            due_time,
            interval,
            sequence,
            flag,
            callback,
        );
        tracing::trace!(
            task = %id,
            due = ?due_time,
            repeating = interval.is_some(),
            "macrotask scheduled"
        );
        self.macrotasks.insert(record);
        Handle::new(id)
    }

    fn take_id(&mut self) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        id
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

impl std::fmt::Debug for LoopContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopContext")
            .field("microtasks", &self.microtasks.len())
            .field("macrotasks", &self.macrotasks.len())
            .field("repeat_policy", &self.repeat_policy)
            .finish_non_exhaustive()
    }
}

/// The event loop.
///
/// Owns the queues, the clock, and the cancellation registry, and drives
/// the run algorithm: one macrotask per iteration, with the microtask
/// queue drained to exhaustion after the initial script and after every
/// macrotask. Microtasks enqueued by microtasks run in the same drain, so
/// no macrotask can run before the queue is truly empty.
///
/// Each loop is an independent value with an injected [`Clock`]; there is
/// no process-wide singleton, and loops share nothing with each other.
///
/// # Examples
///
/// ```
/// use event_loop::{EventLoop, VirtualClock};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let mut event_loop = EventLoop::with_clock(Arc::new(VirtualClock::new()));
/// let handle = event_loop.schedule_task(|_ctx| Ok(()), Duration::from_millis(10));
/// event_loop.run_until_idle().unwrap();
/// # let _ = handle;
/// ```
pub struct EventLoop {
    ctx: LoopContext,
    guard: ExecutionGuard,
    error_handler: Option<ErrorHandler>,
}

impl EventLoop {
    /// Creates an event loop backed by a [`SystemClock`].
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    /// Creates an event loop reading time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            ctx: LoopContext::new(clock),
            guard: ExecutionGuard::new(),
            error_handler: None,
        }
    }

    /// Sets how repeating tasks are re-armed.
    pub fn with_repeat_policy(mut self, policy: RepeatPolicy) -> Self {
        self.ctx.repeat_policy = policy;
        self
    }

    /// Registers the sink notified of callback failures.
    ///
    /// The sink receives the failing task's id, the error it returned,
    /// and the phase (micro or macro) it failed in. Each failure is
    /// reported exactly once; the loop keeps running afterwards.
    pub fn on_error<F>(&mut self, handler: F)
    where
        F: FnMut(TaskId, TaskError, TaskKind) + Send + 'static,
    {
        self.error_handler = Some(Box::new(handler));
    }

    /// Schedules a one-shot macrotask due `delay` from now.
    pub fn schedule_task<F>(&mut self, callback: F, delay: Duration) -> Handle
    where
        F: FnMut(&mut LoopContext) -> Result<(), TaskError> + Send + 'static,
    {
        self.ctx.schedule_task(callback, delay)
    }

    /// Schedules a repeating macrotask firing every `interval`.
    pub fn schedule_interval<F>(&mut self, callback: F, interval: Duration) -> Handle
    where
        F: FnMut(&mut LoopContext) -> Result<(), TaskError> + Send + 'static,
    {
        self.ctx.schedule_interval(callback, interval)
    }

    /// Schedules a microtask, eligible immediately.
    pub fn schedule_microtask<F>(&mut self, callback: F) -> Handle
    where
        F: FnMut(&mut LoopContext) -> Result<(), TaskError> + Send + 'static,
    {
        self.ctx.schedule_microtask(callback)
    }

    /// Cancels the task the handle refers to. Idempotent; see
    /// [`LoopContext::cancel`].
    pub fn cancel(&mut self, handle: Handle) {
        self.ctx.cancel(handle);
    }

    /// The current state of the run algorithm.
    pub fn state(&self) -> LoopState {
        self.guard.state()
    }

    /// Returns true if no unit of work is currently running.
    pub fn is_idle(&self) -> bool {
        self.guard.state() == LoopState::Idle
    }

    /// Returns true if the microtask queue is empty.
    pub fn is_microtask_queue_empty(&self) -> bool {
        self.ctx.microtasks.is_empty()
    }

    /// Returns true if the macrotask queue is empty.
    ///
    /// Cancelled records awaiting lazy removal still count as queued.
    pub fn is_macrotask_queue_empty(&self) -> bool {
        self.ctx.macrotasks.is_empty()
    }

    /// Permanently stops the loop.
    ///
    /// Subsequent `run_*` calls fail with [`SchedulerError::Stopped`].
    /// Scheduling is still permitted; the records simply never run.
    pub fn stop(&mut self) {
        tracing::debug!("event loop stopped");
        self.guard.stop();
    }

    /// Runs `script` as the initial synchronous unit of work, then drains
    /// the microtask queue once.
    ///
    /// The script runs to completion before any scheduled task: a
    /// zero-delay macrotask scheduled inside it still waits for the next
    /// `run_until_idle`/`tick`, and its microtasks run right after the
    /// script returns.
    ///
    /// # Errors
    ///
    /// Fails with a [`SchedulerError`] if the loop is already running or
    /// stopped.
    pub fn run_sync<F>(&mut self, script: F) -> Result<(), SchedulerError>
    where
        F: FnOnce(&mut LoopContext),
    {
        self.guard.begin(LoopState::RunningSync)?;
        script(&mut self.ctx);
        self.drain_microtasks();
        self.guard.finish();
        Ok(())
    }

    /// Runs the loop until no live work remains.
    ///
    /// Drains the microtask queue, then repeats: pop the earliest due
    /// non-cancelled macrotask, run it, re-arm it if repeating, drain the
    /// microtask queue. When nothing is due yet the loop waits for the
    /// next due time through [`Clock::sleep`]: real sleeping on a
    /// [`SystemClock`], virtual advancement on a
    /// [`VirtualClock`](crate::VirtualClock).
    ///
    /// Idempotent on an idle loop: with no queued work it returns
    /// immediately. A live repeating task keeps the loop running until
    /// cancelled; use [`tick`](Self::tick) or [`run_for`](Self::run_for)
    /// to interleave host work instead.
    ///
    /// # Errors
    ///
    /// Fails with a [`SchedulerError`] if the loop is already running or
    /// stopped.
    pub fn run_until_idle(&mut self) -> Result<(), SchedulerError> {
        self.guard.begin(LoopState::DrainingMicrotasks)?;
        self.drain_microtasks();
        loop {
            let now = self.ctx.clock.now();
            if let Some(record) = self.pop_due_macrotask(now) {
                self.run_macrotask(record);
                self.drain_microtasks();
                continue;
            }
            match self.ctx.macrotasks.time_until_next(now) {
                Some(wait) => self.ctx.clock.sleep(wait),
                None => break,
            }
        }
        self.guard.finish();
        Ok(())
    }

    /// Executes at most one due macrotask, then drains the microtask
    /// queue.
    ///
    /// Returns whether any work was performed, letting a host interleave
    /// its own work between turns. Unlike
    /// [`run_until_idle`](Self::run_until_idle) this never waits: a task
    /// that is not yet due is left alone.
    ///
    /// # Errors
    ///
    /// Fails with a [`SchedulerError`] if the loop is already running or
    /// stopped.
    pub fn tick(&mut self) -> Result<bool, SchedulerError> {
        self.guard.begin(LoopState::RunningMacrotask)?;
        let mut did_work = false;
        let now = self.ctx.clock.now();
        if let Some(record) = self.pop_due_macrotask(now) {
            self.run_macrotask(record);
            did_work = true;
        }
        did_work |= self.drain_microtasks() > 0;
        self.guard.finish();
        Ok(did_work)
    }

    /// Advances through `duration` of clock time, ticking as tasks come
    /// due.
    ///
    /// Tasks due exactly at the end of the window still run. The clock
    /// always ends exactly `duration` later; on a
    /// [`VirtualClock`](crate::VirtualClock) this advances virtual time
    /// through idle gaps, which is how repeat timing is tested
    /// deterministically.
    ///
    /// # Errors
    ///
    /// Fails with a [`SchedulerError`] if the loop is already running or
    /// stopped.
    pub fn run_for(&mut self, duration: Duration) -> Result<(), SchedulerError> {
        self.guard.begin(LoopState::DrainingMicrotasks)?;
        let deadline = self.ctx.clock.now() + duration;
        self.drain_microtasks();
        loop {
            let now = self.ctx.clock.now();
            if now <= deadline {
                if let Some(record) = self.pop_due_macrotask(now) {
                    self.run_macrotask(record);
                    self.drain_microtasks();
                    continue;
                }
            }
            if now >= deadline {
                break;
            }
            match self.ctx.macrotasks.time_until_next(now) {
                Some(wait) if now + wait <= deadline => self.ctx.clock.sleep(wait),
                _ => self.ctx.clock.sleep(deadline - now),
            }
        }
        self.guard.finish();
        Ok(())
    }

    /// Pops the earliest due macrotask, retiring its registry entry.
    ///
    /// One-shot records become uncancellable here: execution is about to
    /// start. Repeating records stay registered so a cancel between
    /// invocations still reaches them.
    fn pop_due_macrotask(&mut self, now: Duration) -> Option<TaskRecord> {
        let record = self.ctx.macrotasks.pop_due(now)?;
        if record.interval().is_none() {
            self.ctx.registry.release(record.id());
        }
        Some(record)
    }

    fn run_macrotask(&mut self, mut record: TaskRecord) {
        self.guard.transition(LoopState::RunningMacrotask);
        let started = self.ctx.clock.now();
        tracing::debug!(task = %record.id(), "macrotask running");
        if let Err(error) = record.invoke(&mut self.ctx) {
            self.report(record.id(), error, TaskKind::Macro);
        }
        if let Some(interval) = record.interval() {
            // cancelled mid-run: the registry entry is already gone, just drop
            if record.is_cancelled() {
                return;
            }
            let base = match self.ctx.repeat_policy {
                RepeatPolicy::FromStart => started,
                RepeatPolicy::FromCompletion => self.ctx.clock.now(),
            };
            let sequence = self.ctx.take_seq();
            record.rearm(base + interval, sequence);
            self.ctx.macrotasks.insert(record);
        }
    }

    /// Drains the microtask queue to true exhaustion.
    ///
    /// Emptiness is re-checked after every callback, so microtasks
    /// enqueued during the drain, including by other microtasks, are
    /// part of it. Returns the number of callbacks executed.
    fn drain_microtasks(&mut self) -> usize {
        self.guard.transition(LoopState::DrainingMicrotasks);
        let mut executed = 0;
        while let Some(mut record) = self.ctx.microtasks.dequeue() {
            if record.is_cancelled() {
                continue;
            }
            self.ctx.registry.release(record.id());
            executed += 1;
            if let Err(error) = record.invoke(&mut self.ctx) {
                self.report(record.id(), error, TaskKind::Micro);
            }
        }
        executed
    }

    fn report(&mut self, id: TaskId, error: TaskError, phase: TaskKind) {
        tracing::error!(task = %id, %phase, %error, "callback failed");
        if let Some(handler) = self.error_handler.as_mut() {
            handler(id, error, phase);
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("state", &self.guard.state())
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}
