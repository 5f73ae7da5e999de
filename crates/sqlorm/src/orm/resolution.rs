//! Resolved/unresolved state shared by every result set.

use sqlorm_core::{Error, Result};

/// The result slot of a result set.
///
/// Empty while unresolved; holds the result once the statement has run.
/// A second resolution is refused until [`clear`](Resolution::clear).
#[derive(Debug)]
pub struct Resolution<T> {
    slot: Option<T>,
}

impl<T> Default for Resolution<T> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<T> Resolution<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_resolved(&self) -> bool {
        self.slot.is_some()
    }

    /// Fail with a resolved error if a result is already held.
    pub fn ensure_unresolved(&self) -> Result<()> {
        if self.is_resolved() {
            return Err(Error::resolved("Try to execute resolved result set"));
        }
        Ok(())
    }

    /// Store the result and return it.
    pub fn resolve(&mut self, value: T) -> &mut T {
        self.slot.insert(value)
    }

    /// The held result; `what` names it in the unresolved error.
    pub fn get(&self, what: &str) -> Result<&T> {
        self.slot
            .as_ref()
            .ok_or_else(|| Error::unresolved(format!("Try to get {} on unresolved result set", what)))
    }

    pub fn take(&mut self, what: &str) -> Result<T> {
        self.slot
            .take()
            .ok_or_else(|| Error::unresolved(format!("Try to get {} on unresolved result set", what)))
    }

    /// Forget the result and return to the unresolved state.
    pub fn clear(&mut self) {
        self.slot = None;
    }
}
