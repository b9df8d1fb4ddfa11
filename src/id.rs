// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Unique id generation.
//!
//! [`TransactionalValue`](crate::TransactionalValue) tags every speculative write with an id
//! minted by an [`IdGenerator`]. The default, [`ProcessIds`], is a process-wide generator that
//! combines the wall clock with a monotonic counter. With the `ulid` feature, [`UlidIds`] mints
//! monotonic ULIDs instead.

use crate::determinism_enabled;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

/// Produces strings that are unique for the lifetime of the process.
pub trait IdGenerator {
    /// Returns a fresh id. No two calls may ever return the same id.
    fn generate(&self) -> String;
}

impl<G: IdGenerator + ?Sized> IdGenerator for &G {
    fn generate(&self) -> String {
        (**self).generate()
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for Arc<G> {
    fn generate(&self) -> String {
        (**self).generate()
    }
}

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// The process-wide default [`IdGenerator`].
///
/// Ids are the URL-safe base64 encoding (without padding) of 16 bytes: the milliseconds since
/// the Unix epoch followed by a process-wide sequence number, both big-endian. The sequence
/// number is what makes ids unique; it can be recovered with [`ProcessIds::sequence`] to order
/// ids by creation.
///
/// When [`enable_determinism`](crate::enable_determinism) has been called, the clock component
/// is always zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessIds;

impl ProcessIds {
    /// Recovers the creation sequence number of an id minted by [`ProcessIds`].
    ///
    /// Returns `None` if `id` was not produced by this generator.
    pub fn sequence(id: &str) -> Option<u64> {
        let bytes = URL_SAFE_NO_PAD.decode(id).ok()?;
        let tail: [u8; 8] = bytes.get(8..16)?.try_into().ok()?;
        (bytes.len() == 16).then(|| u64::from_be_bytes(tail))
    }

    fn millis_since_epoch() -> u64 {
        if determinism_enabled() {
            return 0;
        }
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}

impl IdGenerator for ProcessIds {
    fn generate(&self) -> String {
        let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&Self::millis_since_epoch().to_be_bytes());
        bytes[8..].copy_from_slice(&sequence.to_be_bytes());
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

/// An [`IdGenerator`] minting monotonic [ULIDs](ulid::Ulid).
///
/// Ids from one instance sort lexicographically in creation order, even within the same
/// millisecond.
#[cfg(feature = "ulid")]
pub struct UlidIds {
    generator: std::sync::Mutex<ulid::Generator>,
}

#[cfg(feature = "ulid")]
impl UlidIds {
    /// Creates a generator with its own monotonic state.
    pub fn new() -> Self {
        Self {
            generator: std::sync::Mutex::new(ulid::Generator::new()),
        }
    }
}

#[cfg(feature = "ulid")]
impl std::fmt::Debug for UlidIds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UlidIds").finish_non_exhaustive()
    }
}

#[cfg(feature = "ulid")]
impl Default for UlidIds {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "ulid")]
impl IdGenerator for UlidIds {
    fn generate(&self) -> String {
        let mut generator = self
            .generator
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // the random component only overflows after 2^80 ids in one millisecond; a fresh ulid
        // is still unique, it just loses ordering against its predecessors
        generator
            .generate()
            .unwrap_or_else(|_| ulid::Ulid::new())
            .to_string()
    }
}
