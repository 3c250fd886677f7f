//! Reentrancy tracking for the run loop.
//!
//! Exactly one unit of work (the initial script, one macrotask, or a
//! microtask drain) runs at a time. The guard tracks which one currently
//! holds the loop and rejects attempts to start another.

use core_types::{LoopState, SchedulerError};

/// Tracks which unit of work currently holds the loop.
///
/// `run_*` entry points may begin only from [`LoopState::Idle`]; entering
/// from any running state is misuse and surfaces as a
/// [`SchedulerError::ReentrantRun`].
#[derive(Debug)]
pub struct ExecutionGuard {
    state: LoopState,
}

impl ExecutionGuard {
    /// Creates a guard in the idle state.
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
        }
    }

    /// The current state of the loop.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Enters a run phase from `Idle`.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Stopped`] if the loop has been stopped, and
    /// [`SchedulerError::ReentrantRun`] if some unit of work is already
    /// running.
    pub fn begin(&mut self, next: LoopState) -> Result<(), SchedulerError> {
        match self.state {
            LoopState::Idle => {
                self.state = next;
                Ok(())
            }
            LoopState::Stopped => Err(SchedulerError::Stopped),
            running => Err(SchedulerError::ReentrantRun(running)),
        }
    }

    /// Switches between run phases while the loop is held.
    ///
    /// A stopped loop stays stopped.
    pub fn transition(&mut self, next: LoopState) {
        if self.state != LoopState::Stopped {
            self.state = next;
        }
    }

    /// Returns the loop to `Idle` at the end of a run.
    pub fn finish(&mut self) {
        if self.state != LoopState::Stopped {
            self.state = LoopState::Idle;
        }
    }

    /// Permanently stops the loop; subsequent `begin` calls fail.
    pub fn stop(&mut self) {
        self.state = LoopState::Stopped;
    }
}

impl Default for ExecutionGuard {
    fn default() -> Self {
        Self::new()
    }
}
