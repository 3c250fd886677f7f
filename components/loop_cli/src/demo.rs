//! Demo scenarios driving the event loop on a virtual clock.
//!
//! Each scenario builds a loop, schedules work whose callbacks append to a
//! shared trace, runs the loop, and reports the observed execution order.
//! The traces double as living documentation of the scheduler's ordering
//! guarantees.

use crate::error::{CliError, CliResult};
use core_types::TaskError;
use event_loop::{EventLoop, VirtualClock};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Names of the available scenarios.
pub const SCENARIOS: &[&str] = &["ordering", "starvation", "interval", "cancel"];

type TraceLog = Arc<Mutex<Vec<String>>>;

/// The outcome of one scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub scenario: String,
    /// Execution trace in observed order
    pub trace: Vec<String>,
    /// Callback failures reported through the loop's error sink
    pub errors: Vec<String>,
}

/// Runs demo scenarios on a virtual clock.
#[derive(Debug, Default)]
pub struct Demo;

impl Demo {
    /// Creates a demo runner.
    pub fn new() -> Self {
        Self
    }

    /// Runs the named scenario and returns its report.
    ///
    /// # Errors
    ///
    /// [`CliError::UnknownScenario`] for names not in [`SCENARIOS`], or a
    /// wrapped [`SchedulerError`](core_types::SchedulerError) if the loop
    /// refuses to run.
    pub fn run(&self, scenario: &str) -> CliResult<ScenarioReport> {
        match scenario {
            "ordering" => self.run_ordering(),
            "starvation" => self.run_starvation(),
            "interval" => self.run_interval(),
            "cancel" => self.run_cancel(),
            other => Err(CliError::UnknownScenario(other.to_string())),
        }
    }

    /// Two zero-delay timers and two microtasks: microtasks always win,
    /// and a timer's own microtask runs before the next timer.
    fn run_ordering(&self) -> CliResult<ScenarioReport> {
        let (mut event_loop, trace, errors) = new_loop();

        let log = trace.clone();
        event_loop.schedule_task(
            move |ctx| {
                push(&log, "Timeout 1");
                let inner = log.clone();
                ctx.schedule_microtask(move |_ctx| {
                    push(&inner, "Microtask inside Timeout 1");
                    Ok(())
                });
                Ok(())
            },
            Duration::ZERO,
        );

        let log = trace.clone();
        event_loop.schedule_task(
            move |_ctx| {
                push(&log, "Timeout 2");
                Ok(())
            },
            Duration::ZERO,
        );

        let log = trace.clone();
        event_loop.schedule_microtask(move |_ctx| {
            push(&log, "Microtask 1");
            Ok(())
        });

        event_loop.run_until_idle()?;
        Ok(report("ordering", &trace, &errors))
    }

    /// Synchronous script logging interleaved with chained microtasks:
    /// all synchronous logs come first, then the microtask chain.
    fn run_starvation(&self) -> CliResult<ScenarioReport> {
        let (mut event_loop, trace, errors) = new_loop();

        let log = trace.clone();
        event_loop.run_sync(move |ctx| {
            push(&log, "1");
            let second = log.clone();
            ctx.schedule_microtask(move |_ctx| {
                push(&second, "2");
                Ok(())
            });
            push(&log, "3");
            let fourth = log.clone();
            ctx.schedule_microtask(move |ctx| {
                push(&fourth, "4");
                let fifth = fourth.clone();
                ctx.schedule_microtask(move |_ctx| {
                    push(&fifth, "5");
                    Ok(())
                });
                Ok(())
            });
            push(&log, "6");
        })?;

        event_loop.run_until_idle()?;
        Ok(report("starvation", &trace, &errors))
    }

    /// A repeating 100ms timer driven through 350ms of virtual time:
    /// exactly three firings, at 100, 200 and 300ms.
    fn run_interval(&self) -> CliResult<ScenarioReport> {
        let (mut event_loop, trace, errors) = new_loop();

        let log = trace.clone();
        event_loop.schedule_interval(
            move |ctx| {
                push(&log, &format!("tick at {}ms", ctx.now().as_millis()));
                Ok(())
            },
            Duration::from_millis(100),
        );

        event_loop.run_for(Duration::from_millis(350))?;
        Ok(report("interval", &trace, &errors))
    }

    /// One timer is cancelled before the loop runs and never fires; a
    /// failing timer is reported through the error sink without stopping
    /// the loop.
    fn run_cancel(&self) -> CliResult<ScenarioReport> {
        let (mut event_loop, trace, errors) = new_loop();

        let log = trace.clone();
        event_loop.schedule_task(
            move |_ctx| {
                push(&log, "kept timer fired");
                Ok(())
            },
            Duration::from_millis(10),
        );

        let log = trace.clone();
        let doomed = event_loop.schedule_task(
            move |_ctx| {
                push(&log, "cancelled timer fired");
                Ok(())
            },
            Duration::from_millis(10),
        );
        event_loop.cancel(doomed);

        event_loop.schedule_task(
            |_ctx| Err(TaskError::new("deliberate failure")),
            Duration::from_millis(20),
        );

        event_loop.run_until_idle()?;
        Ok(report("cancel", &trace, &errors))
    }
}

fn new_loop() -> (EventLoop, TraceLog, TraceLog) {
    let clock = Arc::new(VirtualClock::new());
    let mut event_loop = EventLoop::with_clock(clock);

    let trace = Arc::new(Mutex::new(Vec::new()));
    let errors = Arc::new(Mutex::new(Vec::new()));

    let sink = errors.clone();
    event_loop.on_error(move |id, error, phase| {
        push(&sink, &format!("{phase} {id}: {error}"));
    });

    (event_loop, trace, errors)
}

fn push(log: &TraceLog, entry: &str) {
    if let Ok(mut log) = log.lock() {
        log.push(entry.to_string());
    }
}

fn report(name: &str, trace: &TraceLog, errors: &TraceLog) -> ScenarioReport {
    ScenarioReport {
        scenario: name.to_string(),
        trace: snapshot(trace),
        errors: snapshot(errors),
    }
}

fn snapshot(log: &TraceLog) -> Vec<String> {
    log.lock().map(|entries| entries.clone()).unwrap_or_default()
}
