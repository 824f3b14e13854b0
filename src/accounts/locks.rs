//! Per-username mutual exclusion.
//!
//! Account flows read the store and then write to it. Holding the guard for a
//! username across both steps makes that sequence atomic within this process.
//! Entries are dropped from the table once nobody holds or waits on them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, Default)]
struct Slot {
    mutex: Arc<AsyncMutex<()>>,
    // Holder plus waiters; the slot is removed when this reaches zero.
    users: usize,
}

#[derive(Debug, Default)]
pub struct KeyedLocks {
    table: Mutex<HashMap<String, Slot>>,
}

impl KeyedLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for exclusive access to `key`.
    ///
    /// Cancel safe: dropping the future while it waits gives up its place and
    /// leaves no entry behind.
    pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
        let (ticket, mutex) = {
            let mut table = self.table();
            let slot = table.entry(key.to_string()).or_default();
            slot.users += 1;
            let ticket = Ticket {
                locks: self,
                key: key.to_string(),
            };
            (ticket, Arc::clone(&slot.mutex))
        };

        let guard = mutex.lock_owned().await;

        KeyGuard {
            _guard: guard,
            _ticket: ticket,
        }
    }

    /// Number of keys currently locked or awaited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// One registered user of a slot, released on drop whether or not the lock
// was ever acquired.
struct Ticket<'a> {
    locks: &'a KeyedLocks,
    key: String,
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        let mut table = self.locks.table();
        if let Some(slot) = table.get_mut(&self.key) {
            slot.users = slot.users.saturating_sub(1);
            if slot.users == 0 {
                table.remove(&self.key);
            }
        }
    }
}

/// Exclusive access to one key until dropped.
pub struct KeyGuard<'a> {
    // Fields drop in order: unlock before giving up the slot.
    _guard: OwnedMutexGuard<()>,
    _ticket: Ticket<'a>,
}
