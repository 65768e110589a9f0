use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::{Mutex, OwnedMutexGuard};

type Slots = StdMutex<HashMap<i64, Arc<Mutex<()>>>>;

/// One async mutex per key. Holding the guard serializes every flow that
/// acquires the same key; different keys never block each other. A key's
/// slot is dropped once its last holder or waiter is gone.
#[derive(Default)]
pub struct KeyedLock {
    slots: Slots,
}

pub struct KeyedGuard<'a> {
    slots: &'a Slots,
    key: i64,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: i64) -> KeyedGuard<'_> {
        // the map lock is never held across an await
        let lock = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))))
        };
        KeyedGuard {
            slots: &self.slots,
            key,
            guard: Some(lock.lock_owned().await),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Drop for KeyedGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();

        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // waiters clone the slot under this map lock, so a count of one
        // means only the map still references it
        if slots
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            slots.remove(&self.key);
        }
    }
}
