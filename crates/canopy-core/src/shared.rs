//! Thread-shareable store
//!
//! [`SharedStore`] keeps a [`Store`] behind an `Arc<RwLock<_>>`. Reads take
//! the shared lock. Every mutation holds the write lock for the whole
//! open-apply-commit cycle, so readers never observe a half-applied batch.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use canopy_core_types::LeafId;

use crate::errors::{CanopyError, Result};
use crate::model::{Leaf, Step};
use crate::ops::Store;
use crate::seed::SeedAdapter;

/// Cloneable handle to a store shared between threads
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<RwLock<Store>>,
}

impl SharedStore {
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    fn read_guard(&self) -> Result<RwLockReadGuard<'_, Store>> {
        self.inner.read().map_err(|e| CanopyError::LockPoisoned {
            reason: format!("lock poisoned: {e}"),
        })
    }

    fn write_guard(&self) -> Result<RwLockWriteGuard<'_, Store>> {
        self.inner.write().map_err(|e| CanopyError::LockPoisoned {
            reason: format!("lock poisoned: {e}"),
        })
    }

    /// Run a read-only closure under the shared lock
    ///
    /// # Errors
    /// Returns `LockPoisoned` if a writer panicked while holding the lock.
    pub fn read<R>(&self, f: impl FnOnce(&Store) -> R) -> Result<R> {
        let store = self.read_guard()?;
        Ok(f(&store))
    }

    /// Run a mutating closure under the write lock
    ///
    /// # Errors
    /// Returns `LockPoisoned`, or the closure's own error.
    pub fn write<R>(&self, f: impl FnOnce(&mut Store) -> Result<R>) -> Result<R> {
        let mut store = self.write_guard()?;
        f(&mut store)
    }

    /// See [`Store::set_field`]
    ///
    /// # Errors
    /// Returns `LockPoisoned`, or the mutation's error.
    pub fn set_field(&self, id: LeafId, step: Step) -> Result<Leaf> {
        self.write(|store| store.set_field(id, step))
    }

    /// See [`Store::set_many`]
    ///
    /// # Errors
    /// Returns `LockPoisoned`, or the mutation's error.
    pub fn set_many(&self, id: LeafId, steps: Vec<Step>) -> Result<Leaf> {
        self.write(|store| store.set_many(id, steps))
    }

    /// See [`Store::activate`]
    ///
    /// # Errors
    /// Returns `LockPoisoned`, or `LeafNotFound`.
    pub fn activate(&self, id: LeafId) -> Result<Vec<LeafId>> {
        self.write(|store| store.activate(id))
    }

    /// See [`Store::replant`]
    ///
    /// # Errors
    /// Returns `LockPoisoned`, or the planting error.
    pub fn replant<A: SeedAdapter + ?Sized>(&self, adapter: &A) -> Result<()> {
        self.write(|store| store.replant(adapter))
    }

    /// Clone of a leaf
    ///
    /// # Errors
    /// Returns `LockPoisoned` if a writer panicked while holding the lock.
    pub fn get_leaf(&self, id: LeafId) -> Result<Option<Leaf>> {
        self.read(|store| store.get_leaf(id).cloned())
    }

    /// Consistent copy of the whole store
    ///
    /// # Errors
    /// Returns `LockPoisoned` if a writer panicked while holding the lock.
    pub fn snapshot(&self) -> Result<Store> {
        self.read(Store::clone)
    }
}

impl From<Store> for SharedStore {
    fn from(store: Store) -> Self {
        Self::new(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::SeedRecord;

    fn shared() -> SharedStore {
        Store::plant(&vec![SeedRecord::new(22, None), SeedRecord::new(44, Some(22))])
            .unwrap()
            .into()
    }

    #[test]
    fn test_clones_share_state() {
        let a = shared();
        let b = a.clone();

        a.set_field(LeafId(44), Step::Parent(None)).unwrap();
        assert_eq!(b.get_leaf(LeafId(44)).unwrap().unwrap().parent, None);
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let store = shared();
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _ = poisoner.write(|_| -> Result<()> { panic!("writer died") });
        })
        .join();

        assert!(matches!(
            store.snapshot(),
            Err(CanopyError::LockPoisoned { .. })
        ));
    }
}
