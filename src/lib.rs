//! Moves money between named accounts and keeps an audit ledger of every
//! attempt.
//!
//! [`transfer::TransferService`] is the entry point. Account and ledger
//! persistence sit behind the [`domain::AccountStore`] and
//! [`domain::LedgerStore`] traits; [`repository`] holds in-memory versions.

pub mod config;
pub mod dlq;
pub mod domain;
pub mod engine;
pub mod ingestion;
pub mod locks;
pub mod logging;
pub mod output;
pub mod repository;
pub mod transfer;

pub use domain::{
    Account, AccountId, AccountStatus, AmountIssue, EntryStatus, Error, LedgerEntry, Money,
    ReferenceId, TransferError,
};
pub use transfer::{AccountLookup, TransferReceipt, TransferService};
