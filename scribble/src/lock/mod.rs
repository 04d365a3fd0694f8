use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One mutex per collection name, created on first use and kept for the
/// lifetime of the registry. Entries are never removed.
#[derive(Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the lock for a collection, inserting it if absent. The registry
    /// mutex is held only for the lookup, never while the collection lock is
    /// taken.
    pub fn acquire(&self, collection: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(collection.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Lock a collection mutex. A panic in another writer leaves the guarded
/// `()` meaningless to poison, so the guard is recovered.
pub fn hold(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_same_collection_same_lock() {
        let registry = LockRegistry::new();
        let a = registry.acquire("user");
        let b = registry.acquire("user");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_collections_distinct_locks() {
        let registry = LockRegistry::new();
        let a = registry.acquire("user");
        let b = registry.acquire("order");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_held_lock_does_not_block_other_collections() {
        let registry = Arc::new(LockRegistry::new());
        let user = registry.acquire("user");
        let _guard = hold(&user);

        let (tx, rx) = mpsc::channel();
        let reg = Arc::clone(&registry);
        thread::spawn(move || {
            let order = reg.acquire("order");
            let _g = hold(&order);
            tx.send(()).unwrap();
        });

        rx.recv_timeout(Duration::from_secs(5))
            .expect("other collection should not be blocked");
    }

    #[test]
    fn test_held_lock_blocks_same_collection() {
        let registry = Arc::new(LockRegistry::new());
        let user = registry.acquire("user");
        let guard = hold(&user);

        let (tx, rx) = mpsc::channel();
        let reg = Arc::clone(&registry);
        let handle = thread::spawn(move || {
            let lock = reg.acquire("user");
            let _g = hold(&lock);
            tx.send(()).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        drop(guard);
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        handle.join().unwrap();
    }
}
