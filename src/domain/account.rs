use std::str::FromStr;

use serde::Deserialize;

use crate::domain::{AmountIssue, Money, TransferError};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for AccountId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountStatus {
    Active,
    Dormant,
    Blocked,
    Closed,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Dormant => "DORMANT",
            AccountStatus::Blocked => "BLOCKED",
            AccountStatus::Closed => "CLOSED",
        }
    }

    pub fn permits_transactions(&self) -> bool {
        matches!(self, AccountStatus::Active)
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(AccountStatus::Active),
            "dormant" => Ok(AccountStatus::Dormant),
            "blocked" => Ok(AccountStatus::Blocked),
            "closed" => Ok(AccountStatus::Closed),
            other => Err(format!("Unknown account status: {}", other)),
        }
    }
}

impl core::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named account. The balance can only move through [`Account::debit`]
/// and [`Account::credit`], so it never drops below zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    holder_name: String,
    alias: Option<String>,
    balance: Money,
    status: AccountStatus,
}

impl Account {
    /// Opens an `ACTIVE` account. A negative opening balance is refused.
    pub fn open(
        id: impl Into<AccountId>,
        holder_name: impl Into<String>,
        initial_balance: Money,
    ) -> Result<Self, TransferError> {
        if initial_balance.is_negative() {
            return Err(TransferError::InvalidAmount {
                amount: initial_balance,
                reason: AmountIssue::Negative,
            });
        }

        Ok(Self {
            id: id.into(),
            holder_name: holder_name.into(),
            alias: None,
            balance: initial_balance,
            status: AccountStatus::Active,
        })
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn status(&self) -> AccountStatus {
        self.status
    }

    pub fn permits_transactions(&self) -> bool {
        self.status.permits_transactions()
    }

    pub fn rename(&mut self, holder_name: impl Into<String>) {
        self.holder_name = holder_name.into();
    }

    pub fn debit(&mut self, amount: Money) -> Result<(), TransferError> {
        validate_amount(amount)?;
        self.ensure_not_closed()?;

        if amount > self.balance {
            return Err(TransferError::InsufficientBalance {
                account_id: self.id.clone(),
                available: self.balance,
                requested: amount,
                shortfall: Money::from_minor(amount.as_minor() - self.balance.as_minor()),
            });
        }

        // amount <= balance, so this stays non-negative
        self.balance = Money::from_minor(self.balance.as_minor() - amount.as_minor());
        Ok(())
    }

    pub fn credit(&mut self, amount: Money) -> Result<(), TransferError> {
        validate_amount(amount)?;
        self.ensure_not_closed()?;

        self.balance =
            self.balance
                .checked_add(amount)
                .ok_or(TransferError::InvalidAmount {
                    amount,
                    reason: AmountIssue::Overflow,
                })?;
        Ok(())
    }

    /// Administrative status change. `CLOSED` is final.
    pub fn set_status(&mut self, status: AccountStatus) -> Result<(), TransferError> {
        if self.status == AccountStatus::Closed && status != AccountStatus::Closed {
            return Err(TransferError::AccountNotActive {
                account_id: self.id.clone(),
                status: self.status,
            });
        }
        self.status = status;
        Ok(())
    }

    /// Soft delete: the record is kept with status `CLOSED`.
    pub fn close(&mut self) -> Result<(), TransferError> {
        self.set_status(AccountStatus::Closed)
    }

    fn ensure_not_closed(&self) -> Result<(), TransferError> {
        if self.status == AccountStatus::Closed {
            return Err(TransferError::AccountNotActive {
                account_id: self.id.clone(),
                status: self.status,
            });
        }
        Ok(())
    }
}

fn validate_amount(amount: Money) -> Result<(), TransferError> {
    match AmountIssue::of(amount) {
        Some(reason) => Err(TransferError::InvalidAmount { amount, reason }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(n: i64) -> Money {
        Money::from_minor(n * Money::SCALE)
    }

    fn account(id: &str, balance: i64) -> Account {
        Account::open(id, "holder", units(balance)).unwrap()
    }

    #[test]
    fn debit_reduces_balance() {
        let mut s = account("S", 10_000);
        s.debit(units(3_000)).unwrap();
        assert_eq!(s.balance(), units(7_000));
    }

    #[test]
    fn debit_over_balance_reports_shortfall() {
        let mut z = account("Z", 0);
        let err = z.debit(units(1)).unwrap_err();
        assert_eq!(
            err,
            TransferError::InsufficientBalance {
                account_id: AccountId::from("Z"),
                available: units(0),
                requested: units(1),
                shortfall: units(1),
            }
        );
        assert_eq!(z.balance(), units(0));
    }

    #[test]
    fn zero_and_negative_amounts_are_distinguished() {
        let mut s = account("S", 100);
        let zero = s.debit(Money::ZERO).unwrap_err();
        let negative = s.credit(units(-5)).unwrap_err();

        assert!(matches!(
            zero,
            TransferError::InvalidAmount {
                reason: AmountIssue::Zero,
                ..
            }
        ));
        assert!(matches!(
            negative,
            TransferError::InvalidAmount {
                reason: AmountIssue::Negative,
                ..
            }
        ));
        assert_eq!(zero.code(), negative.code());
        assert_eq!(s.balance(), units(100));
    }

    #[test]
    fn debit_then_credit_restores_balance() {
        let mut s = account("S", 250);
        let amount = Money::from_decimal_str("99.99").unwrap();
        s.debit(amount).unwrap();
        s.credit(amount).unwrap();
        assert_eq!(s.balance(), units(250));
    }

    #[test]
    fn closed_account_refuses_mutation() {
        let mut c = account("C", 500);
        c.close().unwrap();

        let err = c.debit(units(1)).unwrap_err();
        assert_eq!(
            err,
            TransferError::AccountNotActive {
                account_id: AccountId::from("C"),
                status: AccountStatus::Closed,
            }
        );
        assert!(c.credit(units(1)).is_err());
        assert_eq!(c.balance(), units(500));
    }

    #[test]
    fn closed_is_final() {
        let mut c = account("C", 0);
        c.set_status(AccountStatus::Blocked).unwrap();
        c.set_status(AccountStatus::Active).unwrap();
        c.close().unwrap();
        assert!(c.set_status(AccountStatus::Active).is_err());
        assert!(c.close().is_ok());
        assert_eq!(c.status(), AccountStatus::Closed);
    }

    #[test]
    fn blocked_account_can_still_be_adjusted_directly() {
        let mut b = account("B", 10);
        b.set_status(AccountStatus::Blocked).unwrap();
        b.credit(units(5)).unwrap();
        assert_eq!(b.balance(), units(15));
        assert!(!b.permits_transactions());
    }

    #[test]
    fn credit_overflow_leaves_balance() {
        let mut big = Account::open("B", "holder", Money::from_minor(i64::MAX - 1)).unwrap();
        let err = big.credit(Money::from_minor(2)).unwrap_err();
        assert!(matches!(
            err,
            TransferError::InvalidAmount {
                reason: AmountIssue::Overflow,
                ..
            }
        ));
        assert_eq!(big.balance(), Money::from_minor(i64::MAX - 1));
    }

    #[test]
    fn negative_opening_balance_is_refused() {
        assert!(Account::open("N", "holder", units(-1)).is_err());
        assert!(Account::open("N", "holder", Money::ZERO).is_ok());
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Blocked".parse::<AccountStatus>(), Ok(AccountStatus::Blocked));
        assert_eq!(" DORMANT ".parse::<AccountStatus>(), Ok(AccountStatus::Dormant));
        assert!("frozen".parse::<AccountStatus>().is_err());
    }
}
