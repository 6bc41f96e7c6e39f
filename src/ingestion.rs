use std::io::Read;
use std::pin::Pin;

use futures::stream::{self, Stream};
use serde::Deserialize;

use crate::domain::traits::CommandStream;
use crate::domain::{AccountId, AccountStatus, Command, Error, Money};

pub struct CsvReader<R: Read> {
    reader: Option<csv::Reader<R>>,
}

impl<R: Read> CsvReader<R> {
    pub fn new(reader: R) -> Self {
        let rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        Self { reader: Some(rdr) }
    }
}

/// Internal shape used only for CSV deserialization.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "type")]
    kind: String,
    account: AccountId,
    #[serde(default)]
    counterparty: Option<AccountId>,
    #[serde(default)]
    amount: Option<Money>,
    #[serde(default)]
    note: Option<String>,
}

impl TryFrom<CsvRow> for Command {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self, Self::Error> {
        let note = row.note.unwrap_or_default();
        let command = match (row.kind.to_ascii_lowercase().as_str(), row.counterparty, row.amount) {
            ("open", None, amount) => Command::Open {
                account_id: row.account,
                holder_name: note,
                initial_balance: amount.unwrap_or(Money::ZERO),
            },
            ("transfer", Some(to), Some(amount)) => Command::Transfer {
                from: row.account,
                to,
                amount,
                description: note,
            },
            ("status", None, None) => Command::SetStatus {
                account_id: row.account,
                status: note.parse::<AccountStatus>().map_err(Error::Ingestion)?,
            },
            ("close", None, None) => Command::Close {
                account_id: row.account,
            },
            (other, _, _) => {
                return Err(Error::Ingestion(format!(
                    "Invalid or incomplete command: {}",
                    other
                )));
            }
        };

        Ok(command)
    }
}

impl<R: Read + Send + 'static> CommandStream for CsvReader<R> {
    type CmdStream = Pin<Box<dyn Stream<Item = Result<Command, Error>> + Send>>;

    fn stream(&mut self) -> Self::CmdStream {
        // Take ownership of the reader so the iterator we build owns all data and is 'static.
        let reader = match self.reader.take() {
            Some(r) => r,
            None => {
                // Already consumed; return an empty stream.
                return Box::pin(stream::iter(Vec::<Result<Command, Error>>::new()));
            }
        };

        let iter = reader
            .into_deserialize::<CsvRow>()
            .map(|row_res| match row_res {
                Ok(row) => Command::try_from(row),
                Err(e) => Err(Error::Ingestion(format!(
                    "CSV deserialization error: {}",
                    e
                ))),
            });

        Box::pin(stream::iter(iter))
    }
}
