//! Tests for bounded-concurrency iteration.
//!
//! These run on Tokio's paused clock, so sleeps advance virtual time and timing assertions
//! are exact.

use indexmap::IndexMap;
use shapewise::{OrderedSet, each_async, try_each_async};
use std::{
    cell::{Cell, RefCell},
    time::Duration,
};
use tokio::time::{Instant, sleep};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[tokio::test(start_paused = true)]
async fn five_sleeps_at_concurrency_two_take_three_rounds() {
    init_tracing();
    let start = Instant::now();
    each_async(
        &[1, 2, 3, 4, 5],
        |_, _| sleep(Duration::from_millis(10)),
        2,
    )
    .await;
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(30), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(50), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn sequential_takes_the_sum() {
    init_tracing();
    let start = Instant::now();
    each_async(&[1, 2, 3], |_, _| sleep(Duration::from_millis(10)), 1).await;
    assert!(start.elapsed() >= Duration::from_millis(30));
}

#[tokio::test(start_paused = true)]
async fn slot_is_refilled_by_whichever_task_finishes_first() {
    init_tracing();
    // the first task is slow; a FIFO scheduler would wait for it before starting the third
    let durations = IndexMap::from([("slow", 100u64), ("fast", 10), ("next", 10)]);
    let started = RefCell::new(Vec::new());
    let clock = Instant::now();
    each_async(
        &durations,
        |ms, name| {
            started.borrow_mut().push((*name, clock.elapsed().as_millis()));
            sleep(Duration::from_millis(*ms))
        },
        2,
    )
    .await;
    assert_eq!(*started.borrow(), [("slow", 0u128), ("fast", 0), ("next", 10)]);
}

#[tokio::test(start_paused = true)]
async fn halting_task_keeps_later_elements_from_starting() {
    init_tracing();
    let set: OrderedSet<u32> = (1..=6).collect();
    let dispatched = RefCell::new(Vec::new());
    let completed = Cell::new(0);
    each_async(
        &set,
        |n, _| {
            dispatched.borrow_mut().push(*n);
            let completed = &completed;
            async move {
                sleep(Duration::from_millis(u64::from(10 * n))).await;
                completed.set(completed.get() + 1);
                // the first element halts; the second is already in flight
                *n != 1
            }
        },
        2,
    )
    .await;
    assert_eq!(*dispatched.borrow(), [1, 2]);
    assert_eq!(completed.get(), 2);
}

#[tokio::test(start_paused = true)]
async fn errors_do_not_cancel_siblings() {
    init_tracing();
    let finished = RefCell::new(Vec::new());
    let items = vec!["ok", "bad", "ok2", "never"];
    let result = try_each_async(
        &items,
        |s, i| {
            let finished = &finished;
            async move {
                sleep(Duration::from_millis([20, 5, 25][i])).await;
                finished.borrow_mut().push(*s);
                if *s == "bad" {
                    Err(format!("element {i} failed"))
                } else {
                    Ok(true)
                }
            }
        },
        3,
    )
    .await;
    assert_eq!(result.unwrap_err(), "element 1 failed");
    // "ok2" had already started, so it ran to completion; "never" was never dispatched
    assert_eq!(*finished.borrow(), ["bad", "ok", "ok2"]);
}
