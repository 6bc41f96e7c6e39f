use crate::domain::{AccountId, AccountStatus, EntryStatus, Money, ReferenceId};

/// Why an amount was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountIssue {
    Zero,
    Negative,
    /// The result would not fit in the representable range.
    Overflow,
}

impl AmountIssue {
    /// Classifies an amount that a debit or credit must refuse.
    pub fn of(amount: Money) -> Option<Self> {
        if amount.is_zero() {
            Some(AmountIssue::Zero)
        } else if amount.is_negative() {
            Some(AmountIssue::Negative)
        } else {
            None
        }
    }
}

impl core::fmt::Display for AmountIssue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            AmountIssue::Zero => "ZERO",
            AmountIssue::Negative => "NEGATIVE",
            AmountIssue::Overflow => "OVERFLOW",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupBy {
    Id,
    Alias,
}

impl core::fmt::Display for LookupBy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            LookupBy::Id => "id",
            LookupBy::Alias => "alias",
        })
    }
}

/// Domain failures of account mutation and transfer validation.
///
/// Each kind keeps the stable code exposed to API clients (see [`TransferError::code`]).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("Invalid amount {amount} ({reason})")]
    InvalidAmount { amount: Money, reason: AmountIssue },

    #[error(
        "Insufficient balance in account {account_id}: available {available}, requested {requested}, short by {shortfall}"
    )]
    InsufficientBalance {
        account_id: AccountId,
        available: Money,
        requested: Money,
        shortfall: Money,
    },

    #[error("Account not found by {lookup}: {key}")]
    AccountNotFound { key: String, lookup: LookupBy },

    #[error("Account {account_id} is not active (status {status})")]
    AccountNotActive {
        account_id: AccountId,
        status: AccountStatus,
    },

    #[error("Cannot transfer from account {account_id} to itself")]
    SameAccountTransfer { account_id: AccountId },

    #[error("Invalid transfer: {reason}")]
    InvalidTransfer { reason: String },
}

impl TransferError {
    pub fn code(&self) -> Option<&'static str> {
        match self {
            TransferError::InvalidAmount { .. } => Some("U09"),
            TransferError::InsufficientBalance { .. } => Some("U30"),
            TransferError::AccountNotFound { .. } => Some("U30"),
            TransferError::AccountNotActive { .. } => None,
            TransferError::SameAccountTransfer { .. } => Some("U16"),
            TransferError::InvalidTransfer { .. } => None,
        }
    }

    pub(crate) fn not_found(id: &AccountId) -> Self {
        TransferError::AccountNotFound {
            key: id.to_string(),
            lookup: LookupBy::Id,
        }
    }
}

/// Infrastructure failures. Never reported as a domain outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Store backend failed: {0}")]
    Backend(String),

    #[error("Ledger entry {reference} is already {status}")]
    Finalized {
        reference: ReferenceId,
        status: EntryStatus,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("Ingestion failed with: {0}")]
    Ingestion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("Account {0} already exists")]
    AccountExists(AccountId),

    #[error("Storage failed with: {0}")]
    Storage(#[from] StoreError),
}

impl Error {
    pub fn code(&self) -> Option<&'static str> {
        self.as_transfer().and_then(TransferError::code)
    }

    pub fn as_transfer(&self) -> Option<&TransferError> {
        match self {
            Error::Transfer(e) => Some(e),
            _ => None,
        }
    }
}
