// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Asynchronous iteration with a concurrency ceiling.
//!
//! [`each_async`] walks a container in traversal order and hands every element to an async
//! callback. With a ceiling of one (or zero) each callback is awaited before the next element is
//! looked at. With a higher ceiling, callbacks are started in traversal order and run
//! concurrently, but never more than `concurrency` of them at once: when the in-flight set is
//! full the scheduler waits for whichever task finishes first, then starts the next one.
//!
//! A callback resolving to a halting [`Flow`] (such as `false`) stops dispatch. Tasks that are
//! already running are not cancelled; the call only returns once every one of them has
//! finished.
//!
//! Everything runs on the caller's task, so callbacks may borrow from their surroundings and do
//! not need to be `Send`. With the `tokio` feature, [`each_spawned`] offers the same semantics
//! with one Tokio task per element instead.
use crate::traverse::{Flow, Traverse};
use futures::{
    FutureExt,
    stream::{FuturesUnordered, StreamExt},
};
use std::{convert::Infallible, future::Future, task::Poll};

/// The running tasks of one scheduler call.
struct InFlight<Fut> {
    tasks: FuturesUnordered<Fut>,
    capacity: usize,
}

impl<Fut: Future> InFlight<Fut> {
    fn new(capacity: usize) -> Self {
        Self {
            tasks: FuturesUnordered::new(),
            capacity,
        }
    }

    fn len(&self) -> usize {
        self.tasks.len()
    }

    fn is_full(&self) -> bool {
        self.tasks.len() >= self.capacity
    }

    fn push(&mut self, task: Fut) {
        debug_assert!(!self.is_full());
        self.tasks.push(task);
    }

    /// Waits for whichever task completes first.
    async fn next(&mut self) -> Option<Fut::Output> {
        self.tasks.next().await
    }

    /// Polls the running tasks once without waiting, returning the outputs of those that are
    /// done.
    async fn ready(&mut self) -> Vec<Fut::Output> {
        let mut done = Vec::new();
        while let Poll::Ready(Some(output)) = futures::poll!(self.tasks.next()) {
            done.push(output);
        }
        done
    }
}

/// What the completed tasks of one call have reported so far.
struct Outcome<E> {
    stopped: bool,
    error: Option<E>,
}

impl<E> Outcome<E> {
    fn new() -> Self {
        Self {
            stopped: false,
            error: None,
        }
    }

    fn record<R: Flow>(&mut self, result: Result<R, E>) {
        match result {
            Ok(flow) => {
                if flow.is_halt() && !self.stopped {
                    tracing::debug!("task halted, no further elements will be dispatched");
                    self.stopped = true;
                }
            }
            Err(error) => {
                tracing::debug!("task failed, no further elements will be dispatched");
                self.stopped = true;
                // later failures are dropped
                self.error.get_or_insert(error);
            }
        }
    }

    fn into_result(self) -> Result<(), E> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Calls `f(element, key)` for every element of `container` and awaits the returned futures,
/// keeping at most `concurrency` of them in flight.
///
/// Elements are dispatched in traversal order. With `concurrency <= 1` every future is awaited
/// before the next element is dispatched, so completion order equals dispatch order. Otherwise
/// a dispatched future starts running right away and completion order is unconstrained.
///
/// If a future resolves to a halting [`Flow`], no further elements are dispatched; futures
/// already in flight run to completion before this returns. Returns `container`.
///
/// ```rust
/// # futures::executor::block_on(async {
/// use shapewise::each_async;
/// use std::cell::Cell;
///
/// let total = Cell::new(0);
/// each_async(&vec![1, 2, 3], |n, _| {
///     let total = &total;
///     async move { total.set(total.get() + n) }
/// }, 3).await;
/// assert_eq!(total.get(), 6);
/// # });
/// ```
pub async fn each_async<'a, C, F, Fut>(container: &'a C, mut f: F, concurrency: usize) -> &'a C
where
    C: Traverse + ?Sized,
    F: FnMut(&'a C::Item, C::Key<'a>) -> Fut,
    Fut: Future,
    Fut::Output: Flow,
{
    let infallible = try_each_async(
        container,
        |element, key| f(element, key).map(Ok::<_, Infallible>),
        concurrency,
    );
    match infallible.await {
        Ok(container) => container,
        Err(never) => match never {},
    }
}

/// The fallible form of [`each_async`].
///
/// A future resolving to `Err` stops dispatch the same way a halting outcome does. Its siblings
/// are not cancelled: they are awaited, and then the first error is returned.
pub async fn try_each_async<'a, C, F, Fut, R, E>(
    container: &'a C,
    mut f: F,
    concurrency: usize,
) -> Result<&'a C, E>
where
    C: Traverse + ?Sized,
    F: FnMut(&'a C::Item, C::Key<'a>) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    R: Flow,
{
    let shape = container.shape();
    if !shape.is_traversable() {
        tracing::trace!(%shape, "nothing to iterate");
        return Ok(container);
    }

    let mut outcome = Outcome::new();

    if concurrency <= 1 {
        tracing::trace!(%shape, "iterating sequentially");
        for (key, element) in container.entries() {
            outcome.record(f(element, key).await);
            if outcome.stopped {
                break;
            }
        }
        return outcome.into_result().map(|()| container);
    }

    tracing::trace!(%shape, concurrency, "iterating concurrently");
    let mut in_flight = InFlight::new(concurrency);
    let mut dispatched = 0usize;
    for (key, element) in container.entries() {
        if in_flight.is_full() {
            if let Some(result) = in_flight.next().await {
                outcome.record(result);
            }
        }
        if outcome.stopped {
            break;
        }

        in_flight.push(f(element, key));
        dispatched += 1;
        // start the new task, and collect any that finished along the way
        for result in in_flight.ready().await {
            outcome.record(result);
        }
        if outcome.stopped {
            break;
        }
    }

    tracing::trace!(dispatched, draining = in_flight.len(), "dispatch finished");
    while let Some(result) = in_flight.next().await {
        outcome.record(result);
    }
    outcome.into_result().map(|()| container)
}

#[cfg(feature = "tokio")]
pub use spawned::each_spawned;

#[cfg(feature = "tokio")]
mod spawned {
    use crate::{
        Error, Result,
        traverse::{Flow, Traverse},
    };
    use futures::FutureExt;
    use std::{
        future::Future,
        panic::AssertUnwindSafe,
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
    };
    use tokio::{sync::Semaphore, task::JoinSet};

    /// Like [`each_async`](super::each_async), but runs every element's future as its own Tokio
    /// task.
    ///
    /// Dispatch is gated by a semaphore holding `concurrency` permits (at least one): a permit
    /// is taken before a task is spawned and released when it finishes. `f` receives a clone
    /// of each element together with its position in traversal order, since spawned tasks
    /// cannot borrow from `container`.
    ///
    /// A task that panics stops dispatch like a halting outcome; once the remaining tasks have
    /// finished, the failure is reported as [`Error::TaskFailed`].
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn each_spawned<'a, C, F, Fut>(
        container: &'a C,
        mut f: F,
        concurrency: usize,
    ) -> Result<&'a C>
    where
        C: Traverse + ?Sized,
        C::Item: Clone,
        F: FnMut(C::Item, usize) -> Fut,
        Fut: Future + Send + 'static,
        Fut::Output: Flow,
    {
        let permits = Arc::new(Semaphore::new(concurrency.max(1)));
        let stop = Arc::new(AtomicBool::new(false));
        let mut tasks = JoinSet::new();
        let mut failure = None;

        for (position, (_, element)) in container.entries().enumerate() {
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                // the semaphore is never closed
                break;
            };
            while let Some(joined) = tasks.try_join_next() {
                if let Err(error) = joined {
                    stop.store(true, Ordering::Release);
                    failure.get_or_insert(error);
                }
            }
            if stop.load(Ordering::Acquire) {
                break;
            }

            let task = f(element.clone(), position);
            let stop = Arc::clone(&stop);
            tasks.spawn(async move {
                let outcome = AssertUnwindSafe(task).catch_unwind().await;
                match &outcome {
                    Ok(flow) if !flow.is_halt() => {}
                    Ok(_) => {
                        tracing::debug!(
                            position,
                            "task halted, no further elements will be spawned"
                        );
                        stop.store(true, Ordering::Release);
                    }
                    Err(_) => {
                        tracing::debug!(
                            position,
                            "task panicked, no further elements will be spawned"
                        );
                        stop.store(true, Ordering::Release);
                    }
                }
                // the stop flag has to be visible before the permit wakes the dispatch loop
                drop(permit);
                if let Err(panic) = outcome {
                    std::panic::resume_unwind(panic);
                }
            });
        }

        tracing::trace!(draining = tasks.len(), "dispatch finished");
        while let Some(joined) = tasks.join_next().await {
            if let Err(error) = joined {
                failure.get_or_insert(error);
            }
        }
        match failure {
            Some(error) => Err(Error::TaskFailed(error.to_string())),
            None => Ok(container),
        }
    }
}
