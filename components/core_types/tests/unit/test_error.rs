//! Unit tests for error types

use core_types::{LoopState, SchedulerError, TaskError};

#[test]
fn task_error_carries_message() {
    let error = TaskError::new("disk full");
    assert_eq!(error.message, "disk full");
}

#[test]
fn task_error_display_is_message() {
    let error = TaskError::new("disk full");
    assert_eq!(format!("{}", error), "disk full");
}

#[test]
fn task_error_converts_from_string_types() {
    let from_str: TaskError = "a".into();
    let from_string: TaskError = String::from("a").into();
    assert_eq!(from_str, from_string);
}

#[test]
fn task_error_is_std_error() {
    fn assert_error<E: std::error::Error>(_e: &E) {}
    let error = TaskError::new("x");
    assert_error(&error);
}

#[test]
fn scheduler_error_reentrant_names_state() {
    let error = SchedulerError::ReentrantRun(LoopState::DrainingMicrotasks);
    assert!(error.to_string().contains("draining microtasks"));
}

#[test]
fn scheduler_error_variants_compare() {
    assert_eq!(SchedulerError::Stopped, SchedulerError::Stopped);
    assert_ne!(
        SchedulerError::Stopped,
        SchedulerError::ReentrantRun(LoopState::Idle)
    );
}
