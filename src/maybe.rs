//! Optional-value container with explicit presence tracking.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Wraps a value that may be absent.
///
/// Presence is derived from the stored slot: assigning the absent sentinel
/// (`None`) clears it, any other assignment sets it. Reading an absent
/// container is a recoverable caller mistake: it logs a diagnostic and
/// returns the sentinel instead of panicking, so callers are expected to
/// check [`has_value`](Maybe::has_value) first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Maybe<T> {
    slot: Option<T>,
}

impl<T> Maybe<T> {
    /// An absent container.
    pub fn new() -> Self {
        Self { slot: None }
    }

    pub fn has_value(&self) -> bool {
        self.slot.is_some()
    }

    /// The current value, or the sentinel when absent (logged, never a
    /// panic).
    pub fn value(&self) -> Option<&T> {
        if self.slot.is_none() {
            warn!("asked for value of Maybe without a value");
        }
        self.slot.as_ref()
    }

    /// Store `value`; `None` clears presence.
    pub fn set(&mut self, value: Option<T>) {
        self.slot = value;
    }

    pub fn replace(&mut self, value: T) {
        self.slot = Some(value);
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    pub fn take(&mut self) -> Option<T> {
        self.slot.take()
    }

    pub fn into_inner(self) -> Option<T> {
        self.slot
    }
}

impl<T> Default for Maybe<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<T> for Maybe<T> {
    fn from(value: T) -> Self {
        Self { slot: Some(value) }
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(value: Option<T>) -> Self {
        Self { slot: value }
    }
}
