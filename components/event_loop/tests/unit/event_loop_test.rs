//! Unit tests for EventLoop

use core_types::{LoopState, SchedulerError, TaskError};
use event_loop::{EventLoop, VirtualClock};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn virtual_loop() -> (EventLoop, Arc<VirtualClock>) {
    let clock = Arc::new(VirtualClock::new());
    (EventLoop::with_clock(clock.clone()), clock)
}

#[test]
fn new_event_loop_has_empty_queues() {
    let event_loop = EventLoop::new();
    assert!(event_loop.is_microtask_queue_empty());
    assert!(event_loop.is_macrotask_queue_empty());
}

#[test]
fn schedule_task_fills_macrotask_queue() {
    let (mut event_loop, _clock) = virtual_loop();
    event_loop.schedule_task(|_ctx| Ok(()), Duration::ZERO);
    assert!(!event_loop.is_macrotask_queue_empty());
    assert!(event_loop.is_microtask_queue_empty());
}

#[test]
fn schedule_microtask_fills_microtask_queue() {
    let (mut event_loop, _clock) = virtual_loop();
    event_loop.schedule_microtask(|_ctx| Ok(()));
    assert!(!event_loop.is_microtask_queue_empty());
    assert!(event_loop.is_macrotask_queue_empty());
}

#[test]
fn loop_returns_to_idle_after_run() {
    let (mut event_loop, _clock) = virtual_loop();
    event_loop.schedule_task(|_ctx| Ok(()), Duration::ZERO);
    event_loop.run_until_idle().unwrap();
    assert_eq!(event_loop.state(), LoopState::Idle);
    assert!(event_loop.is_macrotask_queue_empty());
}

#[test]
fn run_sync_runs_script_before_scheduled_work() {
    let (mut event_loop, _clock) = virtual_loop();
    let order = Arc::new(Mutex::new(vec![]));

    let o = order.clone();
    event_loop
        .run_sync(move |ctx| {
            o.lock().unwrap().push("script");
            let m = o.clone();
            ctx.schedule_microtask(move |_ctx| {
                m.lock().unwrap().push("microtask");
                Ok(())
            });
            let t = o.clone();
            ctx.schedule_task(
                move |_ctx| {
                    t.lock().unwrap().push("macrotask");
                    Ok(())
                },
                Duration::ZERO,
            );
        })
        .unwrap();

    // run_sync drains microtasks but leaves macrotasks for the loop
    assert_eq!(*order.lock().unwrap(), vec!["script", "microtask"]);

    event_loop.run_until_idle().unwrap();
    assert_eq!(
        *order.lock().unwrap(),
        vec!["script", "microtask", "macrotask"]
    );
}

#[test]
fn context_reports_pending_work_counts() {
    let (mut event_loop, _clock) = virtual_loop();
    let counts = Arc::new(Mutex::new((0, 0)));

    let c = counts.clone();
    event_loop.schedule_task(
        move |ctx| {
            ctx.schedule_microtask(|_ctx| Ok(()));
            ctx.schedule_task(|_ctx| Ok(()), Duration::from_millis(1));
            *c.lock().unwrap() = (ctx.pending_microtasks(), ctx.pending_macrotasks());
            Ok(())
        },
        Duration::ZERO,
    );

    event_loop.run_until_idle().unwrap();
    // the running task has left the queue; only the work it scheduled counts
    assert_eq!(*counts.lock().unwrap(), (1, 1));
}

#[test]
fn cancel_before_run_prevents_execution() {
    let (mut event_loop, _clock) = virtual_loop();
    let ran = Arc::new(Mutex::new(false));
    let errors = Arc::new(Mutex::new(0));

    let sink = errors.clone();
    event_loop.on_error(move |_id, _error, _phase| {
        *sink.lock().unwrap() += 1;
    });

    let flag = ran.clone();
    let handle = event_loop.schedule_task(
        move |_ctx| {
            *flag.lock().unwrap() = true;
            Ok(())
        },
        Duration::from_millis(5),
    );
    event_loop.cancel(handle);

    event_loop.run_until_idle().unwrap();
    assert!(!*ran.lock().unwrap());
    assert_eq!(*errors.lock().unwrap(), 0);
}

#[test]
fn cancel_microtask_before_run_prevents_execution() {
    let (mut event_loop, _clock) = virtual_loop();
    let ran = Arc::new(Mutex::new(false));

    let flag = ran.clone();
    let handle = event_loop.schedule_microtask(move |_ctx| {
        *flag.lock().unwrap() = true;
        Ok(())
    });
    event_loop.cancel(handle);

    event_loop.run_until_idle().unwrap();
    assert!(!*ran.lock().unwrap());
}

#[test]
fn cancel_after_completion_is_noop() {
    let (mut event_loop, _clock) = virtual_loop();
    let count = Arc::new(Mutex::new(0));

    let c = count.clone();
    let handle = event_loop.schedule_task(
        move |_ctx| {
            *c.lock().unwrap() += 1;
            Ok(())
        },
        Duration::ZERO,
    );

    event_loop.run_until_idle().unwrap();
    event_loop.cancel(handle);
    event_loop.cancel(handle);
    assert_eq!(*count.lock().unwrap(), 1);
}

#[test]
fn callback_can_cancel_another_pending_task() {
    let (mut event_loop, _clock) = virtual_loop();
    let order = Arc::new(Mutex::new(vec![]));

    let o = order.clone();
    let victim = event_loop.schedule_task(
        move |_ctx| {
            o.lock().unwrap().push("victim");
            Ok(())
        },
        Duration::from_millis(20),
    );

    let o = order.clone();
    event_loop.schedule_task(
        move |ctx| {
            o.lock().unwrap().push("assassin");
            ctx.cancel(victim);
            Ok(())
        },
        Duration::from_millis(10),
    );

    event_loop.run_until_idle().unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["assassin"]);
}

#[test]
fn interval_cancelled_from_its_own_callback_stops_repeating() {
    let (mut event_loop, _clock) = virtual_loop();
    let count = Arc::new(Mutex::new(0));
    let handle_slot: Arc<Mutex<Option<core_types::Handle>>> = Arc::new(Mutex::new(None));

    let c = count.clone();
    let slot = handle_slot.clone();
    let handle = event_loop.schedule_interval(
        move |ctx| {
            let mut count = c.lock().unwrap();
            *count += 1;
            if *count == 3 {
                if let Some(own) = *slot.lock().unwrap() {
                    ctx.cancel(own);
                }
            }
            Ok(())
        },
        Duration::from_millis(10),
    );
    *handle_slot.lock().unwrap() = Some(handle);

    event_loop.run_until_idle().unwrap();
    assert_eq!(*count.lock().unwrap(), 3);
}

#[test]
fn failing_microtask_does_not_abort_the_drain() {
    let (mut event_loop, _clock) = virtual_loop();
    let order = Arc::new(Mutex::new(vec![]));

    let o = order.clone();
    event_loop.schedule_microtask(move |_ctx| {
        o.lock().unwrap().push("first");
        Err(TaskError::new("first fails"))
    });
    let o = order.clone();
    event_loop.schedule_microtask(move |_ctx| {
        o.lock().unwrap().push("second");
        Ok(())
    });

    event_loop.run_until_idle().unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
}

#[test]
fn failing_interval_keeps_repeating() {
    let (mut event_loop, _clock) = virtual_loop();
    let count = Arc::new(Mutex::new(0));
    let errors = Arc::new(Mutex::new(0));

    let sink = errors.clone();
    event_loop.on_error(move |_id, _error, _phase| {
        *sink.lock().unwrap() += 1;
    });

    let c = count.clone();
    event_loop.schedule_interval(
        move |_ctx| {
            *c.lock().unwrap() += 1;
            Err(TaskError::new("always fails"))
        },
        Duration::from_millis(10),
    );

    event_loop.run_for(Duration::from_millis(30)).unwrap();
    assert_eq!(*count.lock().unwrap(), 3);
    assert_eq!(*errors.lock().unwrap(), 3);
}

#[test]
fn stop_rejects_all_run_entry_points() {
    let (mut event_loop, _clock) = virtual_loop();
    event_loop.stop();

    assert_eq!(event_loop.run_until_idle(), Err(SchedulerError::Stopped));
    assert_eq!(event_loop.tick(), Err(SchedulerError::Stopped));
    assert_eq!(
        event_loop.run_for(Duration::from_millis(1)),
        Err(SchedulerError::Stopped)
    );
    assert_eq!(
        event_loop.run_sync(|_ctx| {}),
        Err(SchedulerError::Stopped)
    );
}

#[test]
fn scheduling_on_stopped_loop_is_allowed_but_inert() {
    let (mut event_loop, _clock) = virtual_loop();
    event_loop.stop();

    let handle = event_loop.schedule_task(|_ctx| Ok(()), Duration::ZERO);
    event_loop.cancel(handle);
    assert_eq!(event_loop.state(), LoopState::Stopped);
}
