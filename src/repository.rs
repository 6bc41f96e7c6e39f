use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::{
    Account, AccountId, AccountStatus, AccountStore, LedgerEntry, LedgerStore, ReferenceId,
    StoreError,
};

/// Account store kept in process memory. Reads return clones, the way an ORM
/// fetch would hand out a detached copy.
#[derive(Default, Debug)]
pub struct InMemoryAccountStore {
    accounts: Mutex<HashMap<AccountId, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
        }
    }

    /// All accounts ordered by id.
    pub fn all(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self.accounts().values().cloned().collect();
        accounts.sort_by(|a, b| a.id().cmp(b.id()));
        accounts
    }

    fn accounts(&self) -> MutexGuard<'_, HashMap<AccountId, Account>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AccountStore for InMemoryAccountStore {
    fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts().get(id).cloned())
    }

    fn find_by_alias(&self, alias: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts()
            .values()
            .find(|account| account.alias() == Some(alias))
            .cloned())
    }

    fn save(&self, account: Account) -> Result<Account, StoreError> {
        self.accounts().insert(account.id().clone(), account.clone());
        Ok(account)
    }

    fn exists_by_id(&self, id: &AccountId) -> Result<bool, StoreError> {
        Ok(self.accounts().contains_key(id))
    }

    fn find_by_status(&self, status: AccountStatus) -> Result<Vec<Account>, StoreError> {
        let mut matching: Vec<Account> = self
            .accounts()
            .values()
            .filter(|account| account.status() == status)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(matching)
    }
}

#[derive(Default, Debug)]
struct LedgerState {
    entries: HashMap<ReferenceId, LedgerEntry>,
    // creation order
    order: Vec<ReferenceId>,
}

#[derive(Default, Debug)]
pub struct InMemoryLedgerStore {
    state: Mutex<LedgerState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry, oldest first.
    pub fn all(&self) -> Vec<LedgerEntry> {
        let state = self.state();
        state
            .order
            .iter()
            .filter_map(|reference| state.entries.get(reference))
            .cloned()
            .collect()
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn save(&self, entry: LedgerEntry) -> Result<LedgerEntry, StoreError> {
        let mut guard = self.state();
        let state = &mut *guard;
        let reference = entry.reference_id();

        match state.entries.entry(reference) {
            Entry::Vacant(e) => {
                e.insert(entry.clone());
                state.order.push(reference);
            }
            Entry::Occupied(mut e) => {
                let stored = e.get().status();
                if stored.is_terminal() {
                    return Err(StoreError::Finalized {
                        reference,
                        status: stored,
                    });
                }
                e.insert(entry.clone());
            }
        }

        Ok(entry)
    }

    fn find_by_reference_id(
        &self,
        reference: ReferenceId,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        Ok(self.state().entries.get(&reference).cloned())
    }

    fn find_by_account_id(&self, id: &AccountId) -> Result<Vec<LedgerEntry>, StoreError> {
        let state = self.state();
        Ok(state
            .order
            .iter()
            .filter_map(|reference| state.entries.get(reference))
            .filter(|entry| entry.involves(id))
            .cloned()
            .collect())
    }

    fn find_recent(&self, n: usize) -> Result<Vec<LedgerEntry>, StoreError> {
        let state = self.state();
        Ok(state
            .order
            .iter()
            .rev()
            .take(n)
            .filter_map(|reference| state.entries.get(reference))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BalanceSnapshot, EntryStatus, Money};

    fn account(id: &str, minor: i64) -> Account {
        Account::open(id, "holder", Money::from_minor(minor)).unwrap()
    }

    fn entry(from: &str, to: &str) -> LedgerEntry {
        LedgerEntry::pending(from.into(), to.into(), Money::from_minor(100), "")
    }

    #[test]
    fn reads_are_detached_copies() {
        let store = InMemoryAccountStore::new();
        store.save(account("S", 1_000)).unwrap();

        let mut copy = store.find_by_id(&"S".into()).unwrap().unwrap();
        copy.debit(Money::from_minor(400)).unwrap();

        let stored = store.find_by_id(&"S".into()).unwrap().unwrap();
        assert_eq!(stored.balance(), Money::from_minor(1_000));

        store.save(copy).unwrap();
        let stored = store.find_by_id(&"S".into()).unwrap().unwrap();
        assert_eq!(stored.balance(), Money::from_minor(600));
    }

    #[test]
    fn repeated_reads_agree() {
        let store = InMemoryAccountStore::new();
        store.save(account("S", 42)).unwrap();
        let first = store.find_by_id(&"S".into()).unwrap();
        let second = store.find_by_id(&"S".into()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn alias_status_and_existence_queries() {
        let store = InMemoryAccountStore::new();
        store.save(account("A", 0).with_alias("a@bank")).unwrap();
        let mut b = account("B", 0);
        b.set_status(AccountStatus::Dormant).unwrap();
        store.save(b).unwrap();

        assert!(store.exists_by_id(&"A".into()).unwrap());
        assert!(!store.exists_by_id(&"C".into()).unwrap());
        assert_eq!(
            store.find_by_alias("a@bank").unwrap().map(|a| a.id().clone()),
            Some(AccountId::from("A"))
        );
        assert!(store.find_by_alias("nobody").unwrap().is_none());

        let dormant = store.find_by_status(AccountStatus::Dormant).unwrap();
        assert_eq!(dormant.len(), 1);
        assert_eq!(dormant[0].id(), &AccountId::from("B"));
    }

    #[test]
    fn ledger_queries_follow_creation_order() {
        let ledger = InMemoryLedgerStore::new();
        let first = ledger.save(entry("A", "B")).unwrap();
        let second = ledger.save(entry("B", "C")).unwrap();
        let third = ledger.save(entry("C", "D")).unwrap();

        let for_b: Vec<_> = ledger
            .find_by_account_id(&"B".into())
            .unwrap()
            .iter()
            .map(LedgerEntry::reference_id)
            .collect();
        assert_eq!(for_b, vec![first.reference_id(), second.reference_id()]);

        let recent: Vec<_> = ledger
            .find_recent(2)
            .unwrap()
            .iter()
            .map(LedgerEntry::reference_id)
            .collect();
        assert_eq!(recent, vec![third.reference_id(), second.reference_id()]);
        assert_eq!(ledger.find_recent(10).unwrap().len(), 3);
    }

    #[test]
    fn finalized_entries_cannot_be_replaced() {
        let ledger = InMemoryLedgerStore::new();
        let mut e = ledger.save(entry("A", "B")).unwrap();
        let pending = e.clone();

        e.complete(BalanceSnapshot {
            from_before: Money::from_minor(100),
            from_after: Money::ZERO,
            to_before: Money::ZERO,
            to_after: Money::from_minor(100),
        })
        .unwrap();
        ledger.save(e.clone()).unwrap();

        let err = ledger.save(pending).unwrap_err();
        assert_eq!(
            err,
            StoreError::Finalized {
                reference: e.reference_id(),
                status: EntryStatus::Completed,
            }
        );
        let stored = ledger.find_by_reference_id(e.reference_id()).unwrap().unwrap();
        assert_eq!(stored.status(), EntryStatus::Completed);
    }
}
