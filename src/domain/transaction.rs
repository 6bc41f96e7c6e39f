use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::{AccountId, Money, StoreError};

/// Ledger reference, a ULID assigned when the entry is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReferenceId(ulid::Ulid);

impl ReferenceId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for ReferenceId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReferenceId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryStatus {
    Pending,
    Completed,
    Failed,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "PENDING",
            EntryStatus::Completed => "COMPLETED",
            EntryStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, EntryStatus::Pending)
    }
}

impl core::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Balances of both parties around a completed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub from_before: Money,
    pub from_after: Money,
    pub to_before: Money,
    pub to_after: Money,
}

/// Audit record of one transfer attempt.
///
/// Starts `PENDING` and is finalized exactly once, to `COMPLETED` with a
/// [`BalanceSnapshot`] or to `FAILED` with a reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    reference_id: ReferenceId,
    from_account_id: AccountId,
    to_account_id: AccountId,
    amount: Money,
    description: String,
    status: EntryStatus,
    balances: Option<BalanceSnapshot>,
    failure_reason: Option<String>,
    created_at: DateTime<Utc>,
    finalized_at: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    pub fn pending(
        from_account_id: AccountId,
        to_account_id: AccountId,
        amount: Money,
        description: impl Into<String>,
    ) -> Self {
        Self {
            reference_id: ReferenceId::new(),
            from_account_id,
            to_account_id,
            amount,
            description: description.into(),
            status: EntryStatus::Pending,
            balances: None,
            failure_reason: None,
            created_at: Utc::now(),
            finalized_at: None,
        }
    }

    pub fn reference_id(&self) -> ReferenceId {
        self.reference_id
    }

    pub fn from_account_id(&self) -> &AccountId {
        &self.from_account_id
    }

    pub fn to_account_id(&self) -> &AccountId {
        &self.to_account_id
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }

    pub fn balances(&self) -> Option<&BalanceSnapshot> {
        self.balances.as_ref()
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn finalized_at(&self) -> Option<DateTime<Utc>> {
        self.finalized_at
    }

    /// True when the account is either party of the transfer.
    pub fn involves(&self, account_id: &AccountId) -> bool {
        &self.from_account_id == account_id || &self.to_account_id == account_id
    }

    pub fn complete(&mut self, balances: BalanceSnapshot) -> Result<(), StoreError> {
        self.ensure_pending()?;
        self.status = EntryStatus::Completed;
        self.balances = Some(balances);
        self.finalized_at = Some(Utc::now());
        Ok(())
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), StoreError> {
        self.ensure_pending()?;
        self.status = EntryStatus::Failed;
        self.failure_reason = Some(reason.into());
        self.finalized_at = Some(Utc::now());
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), StoreError> {
        if self.status.is_terminal() {
            return Err(StoreError::Finalized {
                reference: self.reference_id,
                status: self.status,
            });
        }
        Ok(())
    }
}

impl core::fmt::Display for LedgerEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{},ref={},from={},to={},amount={}",
            self.status, self.reference_id, self.from_account_id, self.to_account_id, self.amount
        )?;
        if let Some(reason) = &self.failure_reason {
            write!(f, ",reason={}", reason)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> LedgerEntry {
        LedgerEntry::pending(
            AccountId::from("S"),
            AccountId::from("R"),
            Money::from_minor(1_000_00),
            "rent",
        )
    }

    fn snapshot() -> BalanceSnapshot {
        BalanceSnapshot {
            from_before: Money::from_minor(10_000_00),
            from_after: Money::from_minor(9_000_00),
            to_before: Money::from_minor(5_000_00),
            to_after: Money::from_minor(6_000_00),
        }
    }

    #[test]
    fn new_entry_is_pending_without_balances() {
        let e = entry();
        assert_eq!(e.status(), EntryStatus::Pending);
        assert!(e.balances().is_none());
        assert!(e.failure_reason().is_none());
        assert!(e.finalized_at().is_none());
        assert!(e.involves(&AccountId::from("S")));
        assert!(e.involves(&AccountId::from("R")));
        assert!(!e.involves(&AccountId::from("X")));
    }

    #[test]
    fn completion_records_balances_once() {
        let mut e = entry();
        let created = e.created_at();
        e.complete(snapshot()).unwrap();

        assert_eq!(e.status(), EntryStatus::Completed);
        assert_eq!(e.balances(), Some(&snapshot()));
        assert!(e.failure_reason().is_none());
        assert_eq!(e.created_at(), created);

        let err = e.fail("late").unwrap_err();
        assert_eq!(
            err,
            StoreError::Finalized {
                reference: e.reference_id(),
                status: EntryStatus::Completed,
            }
        );
        assert_eq!(e.status(), EntryStatus::Completed);
    }

    #[test]
    fn failure_keeps_balances_empty() {
        let mut e = entry();
        e.fail("credit rejected").unwrap();

        assert_eq!(e.status(), EntryStatus::Failed);
        assert_eq!(e.failure_reason(), Some("credit rejected"));
        assert!(e.balances().is_none());
        assert!(e.complete(snapshot()).is_err());
    }

    #[test]
    fn reference_ids_are_unique_and_parse_back() {
        let a = ReferenceId::new();
        let b = ReferenceId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().parse::<ReferenceId>().unwrap(), a);
        assert!("not-a-ulid".parse::<ReferenceId>().is_err());
    }
}
