use tracing::{debug, error, info, warn};

use crate::domain::{
    Account, AccountId, AccountStatus, AccountStore, BalanceSnapshot, Error, LedgerEntry,
    LedgerStore, LookupBy, Money, ReferenceId, StoreError, TransferError,
};
use crate::locks::LockTable;

/// How a caller names an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountLookup {
    Id(AccountId),
    Alias(String),
}

/// Result of a completed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReceipt {
    pub reference_id: ReferenceId,
    pub from_balance: Money,
    pub to_balance: Money,
}

/// Moves money between accounts and keeps the ledger.
///
/// This is the only component that mutates two accounts together. Each
/// transfer holds both account locks from the first read until the ledger
/// entry is finalized.
#[derive(Debug)]
pub struct TransferService<A, L>
where
    A: AccountStore,
    L: LedgerStore,
{
    accounts: A,
    ledger: L,
    locks: LockTable,
}

impl<A, L> TransferService<A, L>
where
    A: AccountStore,
    L: LedgerStore,
{
    pub fn new(accounts: A, ledger: L) -> Self {
        Self {
            accounts,
            ledger,
            locks: LockTable::new(),
        }
    }

    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Transfers `amount` from one account to another.
    ///
    /// Validation runs in a fixed order: same account, amount, source lookup,
    /// target lookup, status of both, source balance. Those failures leave no
    /// ledger entry. From then on exactly one entry is written, finalized as
    /// `COMPLETED` or `FAILED`.
    pub fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Money,
        description: &str,
    ) -> Result<TransferReceipt, Error> {
        if from == to {
            debug!(account = %from, "Rejected transfer to the same account");
            return Err(TransferError::SameAccountTransfer {
                account_id: from.clone(),
            }
            .into());
        }

        if !amount.is_positive() {
            debug!(%from, %to, %amount, "Rejected non-positive transfer amount");
            return Err(TransferError::InvalidTransfer {
                reason: format!("amount must be positive, got {}", amount),
            }
            .into());
        }

        self.locks.with_pair(from, to, || {
            self.transfer_locked(from, to, amount, description)
        })
    }

    /// Steps from the first account read to the finalized entry. Both
    /// account locks are held by the caller.
    fn transfer_locked(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Money,
        description: &str,
    ) -> Result<TransferReceipt, Error> {
        let source = self.load(from)?;
        let target = self.load(to)?;

        for account in [&source, &target] {
            if !account.permits_transactions() {
                return Err(TransferError::AccountNotActive {
                    account_id: account.id().clone(),
                    status: account.status(),
                }
                .into());
            }
        }

        if source.balance() < amount {
            return Err(TransferError::InsufficientBalance {
                account_id: source.id().clone(),
                available: source.balance(),
                requested: amount,
                shortfall: Money::from_minor(amount.as_minor() - source.balance().as_minor()),
            }
            .into());
        }

        let entry = self.ledger.save(LedgerEntry::pending(
            from.clone(),
            to.clone(),
            amount,
            description,
        ))?;

        let mut written = Vec::with_capacity(2);
        match self.settle(&entry, source, target, &mut written) {
            Ok(receipt) => {
                info!(
                    reference = %receipt.reference_id,
                    %from,
                    %to,
                    %amount,
                    "Transfer completed"
                );
                Ok(receipt)
            }
            Err(cause) => Err(self.abandon(entry, written, cause)),
        }
    }

    /// Debit, credit, persist both accounts and complete the entry.
    ///
    /// Every account original whose new state reached the store is pushed to
    /// `written` so a later failure can restore it.
    fn settle(
        &self,
        entry: &LedgerEntry,
        mut source: Account,
        mut target: Account,
        written: &mut Vec<Account>,
    ) -> Result<TransferReceipt, Error> {
        let amount = entry.amount();
        let source_original = source.clone();
        let target_original = target.clone();

        source.debit(amount)?;
        target.credit(amount)?;

        let source = self.accounts.save(source)?;
        written.push(source_original.clone());
        let target = self.accounts.save(target)?;
        written.push(target_original.clone());

        let mut completed = entry.clone();
        completed.complete(BalanceSnapshot {
            from_before: source_original.balance(),
            from_after: source.balance(),
            to_before: target_original.balance(),
            to_after: target.balance(),
        })?;
        self.ledger.save(completed)?;

        Ok(TransferReceipt {
            reference_id: entry.reference_id(),
            from_balance: source.balance(),
            to_balance: target.balance(),
        })
    }

    /// Restores written accounts, records the entry as `FAILED` and hands back
    /// the error for the caller. The entry is finalized even when a restore
    /// fails; a store failure on this path then wins over the original cause.
    fn abandon(&self, mut entry: LedgerEntry, written: Vec<Account>, cause: Error) -> Error {
        let mut rollback_failure: Option<StoreError> = None;
        for original in written.into_iter().rev() {
            let id = original.id().clone();
            if let Err(e) = self.accounts.save(original) {
                error!(reference = %entry.reference_id(), account = %id, error = %e, cause = %cause, "Rollback failed");
                rollback_failure.get_or_insert(e);
            }
        }

        let reason = match &rollback_failure {
            Some(e) => format!("{}; rollback failed: {}", cause, e),
            None => cause.to_string(),
        };
        if let Err(e) = entry.fail(reason) {
            return e.into();
        }

        match self.ledger.save(entry) {
            Ok(saved) => {
                warn!(
                    reference = %saved.reference_id(),
                    from = %saved.from_account_id(),
                    to = %saved.to_account_id(),
                    reason = %cause,
                    "Transfer failed"
                );
                match rollback_failure {
                    Some(e) => e.into(),
                    None => cause,
                }
            }
            Err(e) => {
                error!(error = %e, cause = %cause, "Could not record failed transfer");
                e.into()
            }
        }
    }

    pub fn open_account(&self, account: Account) -> Result<Account, Error> {
        let id = account.id().clone();
        self.locks.with_account(&id, || -> Result<Account, Error> {
            if self.accounts.exists_by_id(&id)? {
                return Err(Error::AccountExists(id.clone()));
            }

            let account = self.accounts.save(account)?;
            info!(account = %id, balance = %account.balance(), "Account opened");
            Ok(account)
        })
    }

    pub fn change_status(&self, id: &AccountId, status: AccountStatus) -> Result<Account, Error> {
        self.locks.with_account(id, || -> Result<Account, Error> {
            let mut account = self.load(id)?;
            let previous = account.status();
            account.set_status(status)?;
            let account = self.accounts.save(account)?;

            info!(account = %id, from = %previous, to = %status, "Account status changed");
            Ok(account)
        })
    }

    /// Soft delete. The account stays in the store as `CLOSED`.
    pub fn close_account(&self, id: &AccountId) -> Result<Account, Error> {
        self.change_status(id, AccountStatus::Closed)
    }

    pub fn account(&self, lookup: &AccountLookup) -> Result<Account, Error> {
        match lookup {
            AccountLookup::Id(id) => self.load(id),
            AccountLookup::Alias(alias) => self.accounts.find_by_alias(alias)?.ok_or_else(|| {
                TransferError::AccountNotFound {
                    key: alias.clone(),
                    lookup: LookupBy::Alias,
                }
                .into()
            }),
        }
    }

    /// Every account, ordered by id.
    pub fn all_accounts(&self) -> Result<Vec<Account>, Error> {
        let mut all = Vec::new();
        for status in [
            AccountStatus::Active,
            AccountStatus::Dormant,
            AccountStatus::Blocked,
            AccountStatus::Closed,
        ] {
            all.extend(self.accounts.find_by_status(status)?);
        }
        all.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(all)
    }

    pub fn entry(&self, reference: ReferenceId) -> Result<Option<LedgerEntry>, Error> {
        Ok(self.ledger.find_by_reference_id(reference)?)
    }

    pub fn history(&self, id: &AccountId) -> Result<Vec<LedgerEntry>, Error> {
        Ok(self.ledger.find_by_account_id(id)?)
    }

    pub fn recent(&self, n: usize) -> Result<Vec<LedgerEntry>, Error> {
        Ok(self.ledger.find_recent(n)?)
    }

    fn load(&self, id: &AccountId) -> Result<Account, Error> {
        self.accounts
            .find_by_id(id)?
            .ok_or_else(|| TransferError::not_found(id).into())
    }
}
