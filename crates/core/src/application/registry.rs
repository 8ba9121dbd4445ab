// Queue Registry
//
// Authoritative id -> entry map plus the id counter, behind one mutex.
// All access goes through a `RegistryGuard`, so a read-modify-write sequence
// is a single critical section and the lock is released on every exit path.

use crate::domain::{EntryId, QueueEntry};
use crate::error::{AppError, Result};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// First id handed out by a fresh registry
pub const FIRST_ENTRY_ID: EntryId = 1;

#[derive(Debug)]
struct RegistryState {
    entries: BTreeMap<EntryId, QueueEntry>,
    next_id: EntryId,
}

/// In-memory registry of queue entries (one per process, injected)
#[derive(Debug)]
pub struct QueueRegistry {
    state: Mutex<RegistryState>,
}

impl Default for QueueRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                entries: BTreeMap::new(),
                next_id: FIRST_ENTRY_ID,
            }),
        }
    }

    /// Acquire the exclusive lock.
    ///
    /// Do not hold the guard across an `.await`.
    pub fn lock(&self) -> RegistryGuard<'_> {
        // Mutations validate before touching state, so a panic elsewhere
        // cannot leave an entry half-written.
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        RegistryGuard { state }
    }
}

/// Scoped access to the registry; the lock is held until this is dropped
pub struct RegistryGuard<'a> {
    state: MutexGuard<'a, RegistryState>,
}

impl RegistryGuard<'_> {
    /// Reserve the next identifier. Ids are never reused, even after removal.
    pub fn next_id(&mut self) -> EntryId {
        let id = self.state.next_id;
        self.state.next_id += 1;
        id
    }

    /// Store a new entry under its own id
    pub fn insert(&mut self, entry: QueueEntry) -> Result<()> {
        if self.state.entries.contains_key(&entry.id) {
            return Err(AppError::Conflict(format!(
                "queue {} already exists",
                entry.id
            )));
        }
        self.state.entries.insert(entry.id, entry);
        Ok(())
    }

    pub fn get(&self, id: EntryId) -> Option<&QueueEntry> {
        self.state.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut QueueEntry> {
        self.state.entries.get_mut(&id)
    }

    pub fn remove(&mut self, id: EntryId) -> Option<QueueEntry> {
        self.state.entries.remove(&id)
    }

    /// Visit every entry (ascending id)
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&QueueEntry),
    {
        self.state.entries.values().for_each(|entry| f(entry));
    }

    pub fn len(&self) -> usize {
        self.state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.entries.is_empty()
    }
}
