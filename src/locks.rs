use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::AccountId;

/// One mutex per account id, alive only while someone holds or waits on it.
///
/// Pairs are always locked in ascending id order so that two transfers
/// moving money in opposite directions between the same accounts take their
/// locks in the same sequence.
#[derive(Default, Debug)]
pub struct LockTable {
    locks: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock of one account.
    pub fn with_account<T>(&self, id: &AccountId, f: impl FnOnce() -> T) -> T {
        let handle = self.handle(id);
        let result = {
            let _guard = acquire(&handle);
            f()
        };
        drop(handle);
        self.prune(&[id]);
        result
    }

    /// Runs `f` while holding the locks of two distinct accounts, lowest id
    /// first.
    pub fn with_pair<T>(&self, a: &AccountId, b: &AccountId, f: impl FnOnce() -> T) -> T {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let first = self.handle(low);
        let second = self.handle(high);
        let result = {
            let _first = acquire(&first);
            let _second = acquire(&second);
            f()
        };
        drop(first);
        drop(second);
        self.prune(&[low, high]);
        result
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    fn handle(&self, id: &AccountId) -> Arc<Mutex<()>> {
        Arc::clone(self.table().entry(id.clone()).or_default())
    }

    /// Drops handles only the table still references. Cloning happens under
    /// the same table lock, so a removed mutex has no waiters.
    fn prune(&self, ids: &[&AccountId]) {
        let mut table = self.table();
        for id in ids {
            if table.get(*id).is_some_and(|h| Arc::strong_count(h) == 1) {
                table.remove(*id);
            }
        }
    }

    fn table(&self) -> MutexGuard<'_, HashMap<AccountId, Arc<Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The guarded value is `()`, so a poisoned lock carries no broken state.
fn acquire(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}
