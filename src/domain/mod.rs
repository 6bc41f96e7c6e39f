pub mod account;
pub mod command;
pub mod error;
pub mod money;
pub mod traits;
pub mod transaction;

pub use account::{Account, AccountId, AccountStatus};
pub use command::Command;
pub use error::{AmountIssue, Error, LookupBy, StoreError, TransferError};
pub use money::Money;
pub use traits::{AccountStore, CommandStream, DeadLetterQueue, LedgerStore};
pub use transaction::{BalanceSnapshot, EntryStatus, LedgerEntry, ReferenceId};
