//! Keyed entity storage.
//!
//! A [`Repository`] holds whole, immutable entity snapshots behind `Arc`s.
//! Saving replaces the snapshot for one key; readers that already hold the
//! previous `Arc` keep a consistent view of it.
//!
//! [`InMemoryRepository`] keeps one lock per key, so writes to different
//! keys never wait on each other. The outer map is only write-locked the
//! first time a key is inserted or when a key is removed.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::RepositoryError;

/// A value stored under a stable identifier.
pub trait Entity: Send + Sync + 'static {
    type Id: Clone + Ord + Debug + Send + Sync;

    fn id(&self) -> Self::Id;
}

/// Storage contract used by the registry.
///
/// Implementations must make `save` atomic per id: a concurrent
/// `find_by_id` sees either the old or the new snapshot, never a mix.
pub trait Repository<T: Entity>: Send + Sync {
    fn find_all(&self) -> Result<Vec<Arc<T>>, RepositoryError>;

    fn find_by_id(&self, id: &T::Id) -> Result<Option<Arc<T>>, RepositoryError>;

    /// Inserts or replaces the entity stored under `entity.id()`.
    fn save(&self, entity: T) -> Result<Arc<T>, RepositoryError>;

    /// Returns `true` when an entity was removed.
    fn delete_by_id(&self, id: &T::Id) -> Result<bool, RepositoryError>;

    fn exists_by_id(&self, id: &T::Id) -> Result<bool, RepositoryError> {
        Ok(self.find_by_id(id)?.is_some())
    }
}

impl<T: Entity, R: Repository<T>> Repository<T> for Arc<R> {
    fn find_all(&self) -> Result<Vec<Arc<T>>, RepositoryError> {
        (**self).find_all()
    }

    fn find_by_id(&self, id: &T::Id) -> Result<Option<Arc<T>>, RepositoryError> {
        (**self).find_by_id(id)
    }

    fn save(&self, entity: T) -> Result<Arc<T>, RepositoryError> {
        (**self).save(entity)
    }

    fn delete_by_id(&self, id: &T::Id) -> Result<bool, RepositoryError> {
        (**self).delete_by_id(id)
    }

    fn exists_by_id(&self, id: &T::Id) -> Result<bool, RepositoryError> {
        (**self).exists_by_id(id)
    }
}

type Slot<T> = Arc<RwLock<Arc<T>>>;

/// Process-local repository.
pub struct InMemoryRepository<T: Entity> {
    slots: RwLock<BTreeMap<T::Id, Slot<T>>>,
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self {
            slots: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, id: &T::Id) -> Option<Slot<T>> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }
}

impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    fn find_all(&self) -> Result<Vec<Arc<T>>, RepositoryError> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        Ok(slots
            .values()
            .map(|slot| Arc::clone(&slot.read().unwrap_or_else(PoisonError::into_inner)))
            .collect())
    }

    fn find_by_id(&self, id: &T::Id) -> Result<Option<Arc<T>>, RepositoryError> {
        Ok(self
            .slot(id)
            .map(|slot| Arc::clone(&slot.read().unwrap_or_else(PoisonError::into_inner))))
    }

    fn save(&self, entity: T) -> Result<Arc<T>, RepositoryError> {
        let id = entity.id();
        let entity = Arc::new(entity);

        if let Some(slot) = self.slot(&id) {
            *slot.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&entity);
            return Ok(entity);
        }

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        match slots.get(&id) {
            // Inserted by another writer between the two lock acquisitions.
            Some(slot) => {
                *slot.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&entity);
            }
            None => {
                slots.insert(id, Arc::new(RwLock::new(Arc::clone(&entity))));
            }
        }
        Ok(entity)
    }

    fn delete_by_id(&self, id: &T::Id) -> Result<bool, RepositoryError> {
        Ok(self
            .slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some())
    }
}
