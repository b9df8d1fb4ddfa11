// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # shapewise: shape-generic iteration and optimistic containers
//!
//! This crate provides five building blocks that show up again and again in application code
//! that juggles in-memory collections and speculative state:
//!
//! - A **traversal protocol** ([`traverse`]) that puts sequential lists, key-value mappings,
//!   unique-element collections, fixed-width numeric buffers, plain records and custom objects
//!   exposing a visitor method behind a single calling convention.
//! - **Synchronous iteration operations** ([`ops`]) built on top of that protocol: [`each`],
//!   [`filter`], [`map`], [`map_to_list`], [`sorted_keys`] and friends.
//! - A **bounded-concurrency scheduler** ([`scheduler`]) that drives asynchronous per-element
//!   work with a caller-chosen concurrency ceiling: [`each_async`].
//! - An [`OrderedSet`], kept sorted by a caller-supplied comparator that also decides which
//!   elements are equivalent.
//! - A [`TransactionalValue`], a committed value plus any number of speculative writes that can
//!   each be committed or cancelled independently.
//!
//! ## Shapes
//!
//! Every traversable container reports a [`Shape`]. The shape decides the order elements are
//! visited in, what kind of key accompanies each element, and what kind of container [`filter`]
//! and [`map`] hand back:
//!
//! | Shape       | Examples                                   | Key                 |
//! |-------------|--------------------------------------------|---------------------|
//! | `Sequence`  | `Vec<T>`, `[T]`, `[T; N]`, `VecDeque<T>`   | 0-based index       |
//! | `Mapping`   | `IndexMap`, `BTreeMap`, `HashMap`          | the map key         |
//! | `Set`       | `IndexSet`, `BTreeSet`, `HashSet`, [`OrderedSet`] | the element itself |
//! | `Buffer`    | [`Buffer<T>`](traverse::Buffer)            | 0-based index       |
//! | `Visitable` | [`Visiting<V>`](traverse::Visiting)        | call order          |
//! | `Record`    | `serde_json::Map`, JSON objects            | the field name      |
//! | `None`      | scalars, `None`, JSON scalars              | (never visited)     |
//!
//! Visitors may return `()` to always continue, a `bool` where `false` halts the traversal, or
//! a [`ControlFlow`](std::ops::ControlFlow). See [`Flow`].
//!
//! ```rust
//! use shapewise::{each, filter, map_to_list};
//! use indexmap::IndexMap;
//!
//! let mut prices = IndexMap::new();
//! prices.insert("apple", 3);
//! prices.insert("pear", 5);
//! prices.insert("plum", 1);
//!
//! // halts once a price above 4 has been seen
//! let mut seen = Vec::new();
//! each(&prices, |price, name| {
//!     seen.push(*name);
//!     *price <= 4
//! });
//! assert_eq!(seen, ["apple", "pear"]);
//!
//! // mappings keep their keys when filtered
//! let cheap = filter(&prices, |price, _| *price < 4);
//! assert_eq!(cheap.keys().copied().collect::<Vec<_>>(), ["apple", "plum"]);
//!
//! // but any shape can be flattened into a list
//! let labels = map_to_list(&prices, |price, name| format!("{name}={price}"));
//! assert_eq!(labels, ["apple=3", "pear=5", "plum=1"]);
//! ```
//!
//! ## Bounded concurrency
//!
//! [`each_async`] starts the per-element futures in traversal order but never keeps more than
//! `concurrency` of them in flight. Whenever the ceiling is reached it waits for whichever task
//! finishes first. A task returning `false` stops further dispatch; tasks already started still
//! run to completion.
//!
//! ```rust
//! # futures::executor::block_on(async {
//! use shapewise::each_async;
//! use std::cell::RefCell;
//!
//! let done = RefCell::new(Vec::new());
//! each_async(&[1, 2, 3, 4], |n, _| {
//!     let done = &done;
//!     async move {
//!         done.borrow_mut().push(*n);
//!         *n < 2
//!     }
//! }, 2).await;
//! assert_eq!(*done.borrow(), [1, 2]);
//! # });
//! ```
//!
//! ## Transactional values
//!
//! ```rust
//! use shapewise::TransactionalValue;
//!
//! let mut tv = TransactionalValue::new(0);
//! let first = tv.set_without_committing(1);
//! let second = tv.set_without_committing(2);
//! assert_eq!(*tv.value(), 2);
//!
//! // committing the older change supersedes nothing newer, but everything older
//! assert!(tv.commit_change(&first));
//! assert_eq!(*tv.committed_value(), 1);
//! assert!(tv.is_change_relevant(&second));
//!
//! // cancelling drops exactly one change
//! assert!(tv.cancel_change(&second));
//! assert_eq!(*tv.value(), 1);
//! ```
//!
//! ## Features
//!
//! - `json`: Implements the traversal protocol for `serde_json::Value` and `serde_json::Map`.
//!   This feature is enabled by default.
//! - `serde`: Provides `serde` support for the crate's types.
//! - `ulid`: Enables [`UlidIds`], a ULID-backed change-id generator. This feature is enabled
//!   by default.
//! - `tokio`: Enables [`each_spawned`](scheduler::each_spawned), which runs one Tokio task per
//!   element behind a semaphore.
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

use std::sync::atomic::{AtomicBool, Ordering};

pub mod cmp;
pub mod error;
pub use error::{Error, Result};
pub mod id;
#[cfg(feature = "ulid")]
pub use id::UlidIds;
pub use id::{IdGenerator, ProcessIds};
/// Macros usable for tests and initialization
pub mod macros;
pub mod ops;
pub use ops::{
    contains, contains_all, contains_any, contains_none, count, each, filter, filter_truthy,
    is_empty, map, map_identity, map_to_list, map_to_list_sorted, sorted_keys,
};
pub mod ordered_set;
pub use ordered_set::OrderedSet;
pub mod scheduler;
pub use scheduler::{each_async, try_each_async};
pub mod transaction;
pub use transaction::{ChangeId, TransactionalValue};
pub mod traverse;
pub use traverse::{Classify, Flow, Shape, Traverse, classify, supports_traversal, visit};

static ENABLE_DETERMINISM: AtomicBool = AtomicBool::new(false);

/// Makes id generation behave deterministically.
///
/// This should only be enabled for testing and benchmarking: ids stop carrying a wall-clock
/// component, so they are only unique within the current process.
#[doc(hidden)]
pub fn enable_determinism() {
    ENABLE_DETERMINISM.store(true, Ordering::Release);
}

/// Checks if determinism is enabled.
///
/// Should be used internally and for testing.
#[doc(hidden)]
pub fn determinism_enabled() -> bool {
    ENABLE_DETERMINISM.load(Ordering::Acquire)
}
