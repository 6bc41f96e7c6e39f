use std::io::Write;

use crate::domain::{Account, Error, LedgerEntry};

/// CSV snapshot of the books. Sections are separated by a blank line.
pub struct CsvReport<W: Write> {
    out: W,
    sections: usize,
}

impl<W: Write> CsvReport<W> {
    pub fn new(out: W) -> Self {
        Self { out, sections: 0 }
    }

    pub fn write_accounts(&mut self, accounts: &[Account]) -> Result<(), Error> {
        let mut wtr = self.section()?;
        wtr.write_record(["account", "holder", "balance", "status"])?;
        for account in accounts {
            wtr.write_record([
                account.id().as_str(),
                account.holder_name(),
                account.balance().to_string().as_str(),
                account.status().as_str(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_ledger(&mut self, entries: &[LedgerEntry]) -> Result<(), Error> {
        let mut wtr = self.section()?;
        wtr.write_record(["reference", "from", "to", "amount", "status", "reason"])?;
        for entry in entries {
            wtr.write_record([
                entry.reference_id().to_string().as_str(),
                entry.from_account_id().as_str(),
                entry.to_account_id().as_str(),
                entry.amount().to_string().as_str(),
                entry.status().as_str(),
                entry.failure_reason().unwrap_or_default(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<(), Error> {
        self.out.flush()?;
        Ok(())
    }

    fn section(&mut self) -> Result<csv::Writer<&mut W>, Error> {
        if self.sections > 0 {
            self.out.write_all(b"\n")?;
        }
        self.sections += 1;
        Ok(csv::Writer::from_writer(&mut self.out))
    }
}
