use crate::domain::{AccountId, AccountStatus, Money};

/// One instruction read from the command feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open {
        account_id: AccountId,
        holder_name: String,
        initial_balance: Money,
    },
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Money,
        description: String,
    },
    SetStatus {
        account_id: AccountId,
        status: AccountStatus,
    },
    Close {
        account_id: AccountId,
    },
}

impl core::fmt::Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Command::Open {
                account_id,
                initial_balance,
                ..
            } => write!(f, "open,account={},balance={}", account_id, initial_balance),
            Command::Transfer {
                from, to, amount, ..
            } => write!(f, "transfer,from={},to={},amount={}", from, to, amount),
            Command::SetStatus { account_id, status } => {
                write!(f, "status,account={},status={}", account_id, status)
            }
            Command::Close { account_id } => write!(f, "close,account={}", account_id),
        }
    }
}
