use futures::Stream;

use crate::domain::{
    Account, AccountId, AccountStatus, Command, Error, LedgerEntry, ReferenceId, StoreError,
};

pub trait CommandStream {
    type CmdStream: Stream<Item = Result<Command, Error>> + Send + Unpin + 'static;
    fn stream(&mut self) -> Self::CmdStream;
}

pub trait DeadLetterQueue {
    fn report(&self, error: &Error);
}

/// Account persistence.
///
/// Every read hands back an owned copy; changes only become visible to other
/// callers after an explicit [`AccountStore::save`].
pub trait AccountStore: Send + Sync {
    fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, StoreError>;

    fn find_by_alias(&self, alias: &str) -> Result<Option<Account>, StoreError>;

    /// Upsert, replacing any stored record with the same id.
    fn save(&self, account: Account) -> Result<Account, StoreError>;

    fn exists_by_id(&self, id: &AccountId) -> Result<bool, StoreError>;

    fn find_by_status(&self, status: AccountStatus) -> Result<Vec<Account>, StoreError>;
}

/// Ledger persistence. Entries are never deleted, and a stored entry that
/// reached a terminal status must not be replaced.
pub trait LedgerStore: Send + Sync {
    fn save(&self, entry: LedgerEntry) -> Result<LedgerEntry, StoreError>;

    fn find_by_reference_id(&self, reference: ReferenceId)
    -> Result<Option<LedgerEntry>, StoreError>;

    /// Entries where the account is sender or receiver, oldest first.
    fn find_by_account_id(&self, id: &AccountId) -> Result<Vec<LedgerEntry>, StoreError>;

    /// The `n` most recently created entries, newest first.
    fn find_recent(&self, n: usize) -> Result<Vec<LedgerEntry>, StoreError>;
}
