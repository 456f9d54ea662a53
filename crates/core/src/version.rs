//! Structural versioning for change detection.
//!
//! A structure that can change shape (add/remove/rename columns, add/remove
//! rows) owns a [`ModificationCounter`] and bumps it on every structural
//! edit. Views take a [`StructureGuard`] when they are created and check it
//! before every access. This is a fail-fast detector for a single writer
//! with many observers, not a lock.

use crate::error::{Error, Result};
use std::cell::Cell;
use std::rc::Rc;

/// Shared monotonic counter of structural modifications.
#[derive(Clone, Debug, Default)]
pub struct ModificationCounter {
    version: Rc<Cell<u64>>,
}

impl ModificationCounter {
    /// Creates a counter at version zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current version.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    /// Records a structural modification and returns the new version.
    #[inline]
    pub fn bump(&self) -> u64 {
        let next = self.version.get().wrapping_add(1);
        self.version.set(next);
        next
    }

    /// Takes a snapshot of the current version.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            counter: self.clone(),
            version: self.version(),
        }
    }
}

/// A counter together with the version it had when observed.
#[derive(Clone, Debug)]
pub struct Snapshot {
    counter: ModificationCounter,
    version: u64,
}

impl Snapshot {
    /// Whether the observed counter hasn't moved since the snapshot.
    #[inline]
    pub fn is_current(&self) -> bool {
        self.counter.version() == self.version
    }
}

/// Snapshots of every counter along a chain of sources.
///
/// A view of a view must go stale when any structure underneath it changes,
/// so a guard carries one snapshot per level.
#[derive(Clone, Debug, Default)]
pub struct StructureGuard {
    snapshots: Vec<Snapshot>,
}

impl StructureGuard {
    /// A guard that never goes stale.
    pub fn unguarded() -> Self {
        Self::default()
    }

    /// A guard over a single counter at its current version.
    pub fn of(counter: &ModificationCounter) -> Self {
        Self {
            snapshots: vec![counter.snapshot()],
        }
    }

    /// Adds the current version of another counter to the guard.
    pub fn and(mut self, counter: &ModificationCounter) -> Self {
        self.snapshots.push(counter.snapshot());
        self
    }

    /// Whether no guarded structure has changed.
    pub fn is_current(&self) -> bool {
        self.snapshots.iter().all(Snapshot::is_current)
    }

    /// Fails with [`Error::StaleView`] if any guarded structure has changed.
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_current() {
            Ok(())
        } else {
            Err(Error::StaleView)
        }
    }

    /// Runs `block` only if the guard is still current.
    #[inline]
    pub fn guarded<R>(&self, block: impl FnOnce() -> Result<R>) -> Result<R> {
        self.check()?;
        block()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_bump() {
        let counter = ModificationCounter::new();
        assert_eq!(counter.version(), 0);
        assert_eq!(counter.bump(), 1);
        assert_eq!(counter.clone().bump(), 2);
        assert_eq!(counter.version(), 2);
    }

    #[test]
    fn test_guard_goes_stale() {
        let counter = ModificationCounter::new();
        let guard = StructureGuard::of(&counter);
        assert!(guard.check().is_ok());
        counter.bump();
        assert_eq!(guard.check(), Err(Error::StaleView));
    }

    #[test]
    fn test_guard_chain() {
        let inner = ModificationCounter::new();
        let outer = ModificationCounter::new();
        let guard = StructureGuard::of(&outer).and(&inner);
        inner.bump();
        assert!(!guard.is_current());
        assert!(StructureGuard::unguarded().is_current());
    }
}
