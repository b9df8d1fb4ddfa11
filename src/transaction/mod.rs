// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Optimistic values with independently committable writes.
//!
//! A [`TransactionalValue`] holds one committed value plus an ordered list of pending
//! (speculative) writes. Reading it returns the most recent pending write if there is one,
//! which lets callers show the outcome of an operation before it has been confirmed.
//!
//! Each pending write is identified by a [`ChangeId`] and is resolved on its own:
//!
//! - [`commit_change`](TransactionalValue::commit_change) makes the write the committed value
//!   and discards every write older than it. Those can never be committed afterwards, so a
//!   slow confirmation for an old write cannot overwrite a newer confirmed one.
//! - [`cancel_change`](TransactionalValue::cancel_change) drops exactly that write and leaves
//!   the others alone.
//!
//! Committing or cancelling an id that is no longer pending is not an error. It is an expected
//! outcome of racing confirmations and is reported as `false`.
//!
//! # Example
//!
//! ```
//! use shapewise::TransactionalValue;
//!
//! let mut name = TransactionalValue::new(String::from("draft"));
//! let rename = name.set_without_committing(String::from("final"));
//! assert_eq!(name.to_string(), "final (draft -> final)");
//!
//! // the server rejected the rename
//! assert!(name.cancel_change(&rename));
//! assert_eq!(name.value(), "draft");
//!
//! // the id is gone for good
//! assert!(!name.commit_change(&rename));
//! ```

use crate::{
    error::{Error, Result},
    id::{IdGenerator, ProcessIds},
};
use smallvec::SmallVec;
use std::fmt;

mod change;

pub use change::ChangeId;
pub(crate) use change::Change;

/// A committed value plus any number of pending writes.
///
/// `G` mints the ids of pending writes; it defaults to the process-wide [`ProcessIds`].
///
/// The value is not synchronized. Mutation needs `&mut self`, so sharing one across threads
/// takes a lock around it.
#[derive(Clone)]
pub struct TransactionalValue<V, G = ProcessIds> {
    committed: V,
    // oldest first; almost always zero or one entries
    pending: SmallVec<[Change<V>; 2]>,
    ids: G,
}

impl<V> TransactionalValue<V> {
    /// Creates a value with `committed` as its committed value and nothing pending.
    pub fn new(committed: V) -> Self {
        Self::with_id_generator(committed, ProcessIds)
    }
}

impl<V: Default> Default for TransactionalValue<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}

impl<V, G> TransactionalValue<V, G> {
    /// Creates a value whose pending writes are identified by ids from `ids`.
    pub fn with_id_generator(committed: V, ids: G) -> Self {
        Self {
            committed,
            pending: SmallVec::new(),
            ids,
        }
    }

    /// Reassembles a value from its committed value and pending writes (oldest first).
    ///
    /// Fails if the same id appears twice among `changes`.
    pub fn from_parts<I>(committed: V, changes: I, ids: G) -> Result<Self>
    where
        I: IntoIterator<Item = (ChangeId, V)>,
    {
        let mut pending = SmallVec::<[Change<V>; 2]>::new();
        for (id, value) in changes {
            if pending.iter().any(|change| change.id == id) {
                return Err(Error::DuplicateChangeId(id));
            }
            pending.push(Change { id, value });
        }
        Ok(Self {
            committed,
            pending,
            ids,
        })
    }

    /// Splits the value into its committed value and pending writes (oldest first).
    pub fn into_parts(self) -> (V, Vec<(ChangeId, V)>) {
        let changes = self
            .pending
            .into_iter()
            .map(|change| (change.id, change.value))
            .collect();
        (self.committed, changes)
    }

    /// Replaces the committed value and discards all pending writes.
    pub fn set_and_commit(&mut self, value: V) {
        if !self.pending.is_empty() {
            tracing::debug!(
                discarded = self.pending.len(),
                "direct commit discarded pending changes"
            );
        }
        self.pending.clear();
        self.committed = value;
    }

    fn position(&self, id: &ChangeId) -> Option<usize> {
        self.pending.iter().position(|change| change.id == *id)
    }

    /// Commits the pending write `id`, discarding it and every older pending write.
    ///
    /// Returns `false`, leaving the value untouched, if `id` is not pending (anymore).
    pub fn commit_change(&mut self, id: &ChangeId) -> bool {
        let Some(index) = self.position(id) else {
            tracing::trace!(change = %id, "commit of a change that is no longer pending");
            return false;
        };
        // everything older than the committed change is superseded
        if let Some(change) = self.pending.drain(..=index).next_back() {
            self.committed = change.value;
        }
        tracing::debug!(change = %id, superseded = index, "committed change");
        true
    }

    /// Drops the pending write `id`, leaving all other pending writes in place.
    ///
    /// Returns `false` if `id` is not pending (anymore).
    pub fn cancel_change(&mut self, id: &ChangeId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.pending.remove(index);
                tracing::debug!(change = %id, "cancelled change");
                true
            }
            None => {
                tracing::trace!(change = %id, "cancel of a change that is no longer pending");
                false
            }
        }
    }

    /// Returns `true` while `id` can still be committed or cancelled.
    pub fn is_change_relevant(&self, id: &ChangeId) -> bool {
        self.position(id).is_some()
    }

    /// Returns the committed value, ignoring pending writes.
    pub fn committed_value(&self) -> &V {
        &self.committed
    }

    /// Returns the newest pending write, or the committed value if nothing is pending.
    pub fn value(&self) -> &V {
        self.pending
            .last()
            .map_or(&self.committed, |change| &change.value)
    }

    /// Returns the number of pending writes.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if any write is pending.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Iterates over the pending writes, oldest first.
    pub fn pending(&self) -> impl ExactSizeIterator<Item = (&ChangeId, &V)> + '_ {
        self.pending.iter().map(|change| (&change.id, &change.value))
    }

    /// Returns the generator minting ids for this value.
    pub fn id_generator(&self) -> &G {
        &self.ids
    }
}

impl<V, G: IdGenerator> TransactionalValue<V, G> {
    /// Records `value` as a pending write on top of the existing ones.
    ///
    /// [`value`](Self::value) returns it until it is committed, cancelled or superseded. The
    /// returned id resolves it later.
    pub fn set_without_committing(&mut self, value: V) -> ChangeId {
        let id = ChangeId::from(self.ids.generate());
        self.pending.push(Change {
            id: id.clone(),
            value,
        });
        id
    }
}

impl<V: PartialEq, G> PartialEq for TransactionalValue<V, G> {
    fn eq(&self, other: &Self) -> bool {
        self.committed == other.committed && self.pending == other.pending
    }
}

impl<V: fmt::Debug, G> fmt::Debug for TransactionalValue<V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionalValue")
            .field("committed", &self.committed)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

/// Renders the effective value, followed by the committed value and every pending write in
/// parentheses: `2 (0 -> 1 -> 2)`. Without pending writes only the committed value is shown.
impl<V: fmt::Display, G> fmt::Display for TransactionalValue<V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pending.is_empty() {
            return write!(f, "{}", self.committed);
        }
        write!(f, "{} ({}", self.value(), self.committed)?;
        for change in &self.pending {
            write!(f, " -> {}", change.value)?;
        }
        f.write_str(")")
    }
}

#[cfg(feature = "serde")]
mod serde {
    use super::{Change, TransactionalValue};
    use ::serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

    #[derive(Serialize)]
    struct RawRef<'a, V> {
        value: &'a V,
        changes: &'a [Change<V>],
    }

    #[derive(Deserialize)]
    struct Raw<V> {
        value: V,
        #[serde(default = "Vec::new")]
        changes: Vec<Change<V>>,
    }

    impl<V: Serialize, G> Serialize for TransactionalValue<V, G> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            RawRef {
                value: &self.committed,
                changes: &self.pending,
            }
            .serialize(serializer)
        }
    }

    impl<'de, V, G> Deserialize<'de> for TransactionalValue<V, G>
    where
        V: Deserialize<'de>,
        G: Default,
    {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let raw = Raw::<V>::deserialize(deserializer)?;
            let changes = raw
                .changes
                .into_iter()
                .map(|change| (change.id, change.value));
            TransactionalValue::from_parts(raw.value, changes, G::default())
                .map_err(D::Error::custom)
        }
    }
}
