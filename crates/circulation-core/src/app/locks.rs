//! Per-record writer locks.
//!
//! A lifecycle operation reads a record, checks its status and writes it back.
//! Two of those racing on the same id must not interleave, otherwise both
//! would pass the guard. `KeyedLocks` hands out one mutex per id; different
//! ids never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::RecordId;

#[derive(Debug, Default)]
pub struct KeyedLocks {
    slots: Mutex<HashMap<RecordId, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `id`.
    pub fn with<R>(&self, id: &RecordId, f: impl FnOnce() -> R) -> R {
        // The mutexes guard no data, so a poisoned one is still usable.
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(id.clone()).or_default())
        };

        let release = Release {
            slots: &self.slots,
            id,
            slot,
        };
        let _held = release.slot.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of ids currently locked or waited on.
    pub fn active(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Forgets the slot for `id` once nobody else holds it, also on unwind.
///
/// Declared before the mutex guard in `with`, so it drops after the lock is
/// released.
struct Release<'a> {
    slots: &'a Mutex<HashMap<RecordId, Arc<Mutex<()>>>>,
    id: &'a RecordId,
    slot: Arc<Mutex<()>>,
}

impl Drop for Release<'_> {
    fn drop(&mut self) {
        // Handles are only cloned under the map lock, so a count of two here
        // means the map and this guard are the last holders.
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if Arc::strong_count(&self.slot) == 2 {
            slots.remove(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn returns_the_closure_result_and_cleans_up() {
        let locks = KeyedLocks::new();

        let out = locks.with(&RecordId::from("item-1"), || 42);

        assert_eq!(out, 42);
        assert_eq!(locks.active(), 0);
    }

    #[test]
    fn same_id_never_runs_concurrently() {
        let locks = KeyedLocks::new();
        let inside = AtomicUsize::new(0);
        let max_inside = AtomicUsize::new(0);
        let id = RecordId::from("item-1");

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    locks.with(&id, || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(5));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    });
                });
            }
        });

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert_eq!(locks.active(), 0);
    }

    #[test]
    fn panicking_closure_still_releases_the_slot() {
        let locks = KeyedLocks::new();
        let id = RecordId::from("item-1");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            locks.with(&id, || -> () { panic!("write failed") })
        }));

        assert!(outcome.is_err());
        assert_eq!(locks.active(), 0);
        assert_eq!(locks.with(&id, || "again"), "again");
        assert_eq!(locks.active(), 0);
    }

    #[test]
    fn different_ids_do_not_block_each_other() {
        let locks = KeyedLocks::new();

        let out = locks.with(&RecordId::from("item-1"), || {
            locks.with(&RecordId::from("item-2"), || "nested")
        });

        assert_eq!(out, "nested");
    }
}
