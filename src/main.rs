use std::process::ExitCode;
use std::{env, fs::File, io};

use tracing::error;

use transfer_ledger::config::Config;
use transfer_ledger::dlq::StdErrDLQ;
use transfer_ledger::domain::Error;
use transfer_ledger::engine::Engine;
use transfer_ledger::ingestion::CsvReader;
use transfer_ledger::logging;
use transfer_ledger::repository::{InMemoryAccountStore, InMemoryLedgerStore};
use transfer_ledger::transfer::TransferService;

#[tokio::main] // using Tokio runtime for async
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Error> {
    let config = Config::from_args(env::args().skip(1))?;
    logging::init(&config);

    let file = File::open(&config.input)?;

    // Set up the components
    let ingestion = CsvReader::new(file);
    let service = TransferService::new(InMemoryAccountStore::new(), InMemoryLedgerStore::new());
    let mut engine = Engine::new(ingestion, service, StdErrDLQ::default());

    if let Err(e) = engine.process().await {
        error!(error = %e, "Processing aborted");
        return Err(e);
    }

    engine.flush(io::stdout().lock(), config.print_ledger)
}
