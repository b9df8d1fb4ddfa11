// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use std::{borrow::Borrow, fmt};

/// Identifies one speculative write to a [`TransactionalValue`](super::TransactionalValue).
///
/// Ids are opaque; they are only ever compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(::serde::Deserialize, ::serde::Serialize),
    serde(transparent)
)]
pub struct ChangeId(String);

impl ChangeId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwraps the id into its string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ChangeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ChangeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for ChangeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ChangeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A pending write.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
pub(crate) struct Change<V> {
    pub(crate) id: ChangeId,
    pub(crate) value: V,
}
