use std::io::Write;

use futures::StreamExt;
use tracing::{debug, info};

use crate::domain::{
    Account, AccountStore, Command, Error, LedgerStore,
    traits::{CommandStream, DeadLetterQueue},
};
use crate::output::CsvReport;
use crate::transfer::TransferService;

/// Batch driver: feeds a command stream through the [`TransferService`].
///
/// Rejected commands go to the dead-letter queue and processing continues.
/// Store failures stop the run.
#[derive(Debug)]
pub struct Engine<I, D, A, L>
where
    I: CommandStream,
    D: DeadLetterQueue,
    A: AccountStore,
    L: LedgerStore,
{
    ingestion: I,
    service: TransferService<A, L>,
    dlq: D,
}

impl<I, D, A, L> Engine<I, D, A, L>
where
    I: CommandStream,
    D: DeadLetterQueue,
    A: AccountStore,
    L: LedgerStore,
{
    pub fn new(ingestion: I, service: TransferService<A, L>, dlq: D) -> Self {
        Self {
            ingestion,
            service,
            dlq,
        }
    }

    pub fn service(&self) -> &TransferService<A, L> {
        &self.service
    }

    pub async fn process(&mut self) -> Result<(), Error> {
        let mut res = self.ingestion.stream();
        let mut applied = 0usize;
        let mut rejected = 0usize;

        while let Some(cmd) = res.next().await {
            let outcome = match cmd {
                Ok(cmd) => {
                    debug!(command = %cmd, "Applying command");
                    self.apply_command(cmd)
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => applied += 1,
                Err(e @ Error::Storage(_)) => return Err(e),
                Err(e) => {
                    rejected += 1;
                    self.dlq.report(&e);
                }
            }
        }

        info!(applied, rejected, "Command stream processed");
        Ok(())
    }

    fn apply_command(&self, cmd: Command) -> Result<(), Error> {
        match cmd {
            Command::Open {
                account_id,
                holder_name,
                initial_balance,
            } => {
                let account = Account::open(account_id, holder_name, initial_balance)?;
                self.service.open_account(account)?;
            }
            Command::Transfer {
                from,
                to,
                amount,
                description,
            } => {
                self.service.transfer(&from, &to, amount, &description)?;
            }
            Command::SetStatus { account_id, status } => {
                self.service.change_status(&account_id, status)?;
            }
            Command::Close { account_id } => {
                self.service.close_account(&account_id)?;
            }
        }
        Ok(())
    }

    /// Writes the account table, followed by the ledger when asked.
    pub fn flush<W: Write>(&self, out: W, include_ledger: bool) -> Result<(), Error> {
        let mut report = CsvReport::new(out);
        report.write_accounts(&self.service.all_accounts()?)?;
        if include_ledger {
            let mut entries = self.service.recent(usize::MAX)?;
            entries.reverse();
            report.write_ledger(&entries)?;
        }
        report.finish()
    }
}
