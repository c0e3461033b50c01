#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn first_poll_fires_immediately() {
    let mut task = RepeatingTask::start(60_000.0, 5.0);
    assert!(task.poll(5.0));
}

#[test]
fn does_not_fire_inside_interval() {
    let mut task = RepeatingTask::start(60_000.0, 0.0);
    assert!(task.poll(0.0));
    assert!(!task.poll(1.0));
    assert!(!task.poll(59_999.0));
    assert!(task.poll(60_000.0));
}

#[test]
fn late_poll_reschedules_from_now() {
    let mut task = RepeatingTask::start(1_000.0, 0.0);
    assert!(task.poll(0.0));
    assert!(task.poll(5_500.0));
    assert_eq!(task.next_due_ms(), Some(6_500.0));
    assert!(!task.poll(6_000.0));
}

#[test]
fn cancelled_task_never_fires() {
    let mut task = RepeatingTask::start(1_000.0, 0.0);
    task.cancel();
    assert!(task.is_cancelled());
    assert!(!task.poll(0.0));
    assert!(!task.poll(1_000_000.0));
    assert_eq!(task.next_due_ms(), None);
}
