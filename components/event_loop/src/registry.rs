//! Cancellation bookkeeping.
//!
//! Maps live handles to the cancellation flags of their records so that
//! `cancel` is O(1) no matter which queue currently holds the record.

use crate::task::CancelFlag;
use core_types::{Handle, TaskId};
use std::collections::HashMap;

/// Registry of live, still-cancellable tasks.
///
/// An entry exists from the moment a task is scheduled until it is popped
/// for execution (one-shot tasks) or cancelled (any task). Repeating
/// tasks stay registered across re-arms so a later `cancel` still reaches
/// them.
#[derive(Debug, Default)]
pub struct CancellationRegistry {
    entries: HashMap<TaskId, CancelFlag>,
}

impl CancellationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers the cancellation flag of a newly scheduled task.
    pub fn register(&mut self, id: TaskId, flag: CancelFlag) {
        self.entries.insert(id, flag);
    }

    /// Cancels the task the handle refers to.
    ///
    /// Idempotent: handles that are unknown, already cancelled, or whose
    /// task already ran are silent no-ops, never errors.
    pub fn cancel(&mut self, handle: Handle) {
        if let Some(flag) = self.entries.remove(&handle.id()) {
            flag.set();
        }
    }

    /// Drops the entry of a task that has started executing.
    ///
    /// Cancellation after this point is a no-op. The loop keeps repeating
    /// tasks registered instead of releasing them, so they stay
    /// cancellable between invocations.
    pub fn release(&mut self, id: TaskId) {
        self.entries.remove(&id);
    }

    /// Returns true if the task is still registered, i.e. pending and
    /// cancellable.
    pub fn is_registered(&self, id: TaskId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no task is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
