use crate::domain::{DeadLetterQueue, Error};

#[derive(Default, Debug)]
pub struct StdErrDLQ {}

impl StdErrDLQ {
    /// One report line; the stable code leads when the error has one.
    pub fn format(error: &Error) -> String {
        match error.code() {
            Some(code) => format!("DLQ Report - Error [{}]: {}", code, error),
            None => format!("DLQ Report - Error: {}", error),
        }
    }
}

impl DeadLetterQueue for StdErrDLQ {
    fn report(&self, error: &Error) {
        tracing::debug!(code = ?error.code(), "Command rejected");
        eprintln!("{}", Self::format(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransferError;

    #[test]
    fn report_line_includes_code_when_known() {
        let same = Error::from(TransferError::SameAccountTransfer {
            account_id: "S".into(),
        });
        assert_eq!(
            StdErrDLQ::format(&same),
            "DLQ Report - Error [U16]: Cannot transfer from account S to itself"
        );

        let ingest = Error::Ingestion("bad row".to_string());
        assert_eq!(
            StdErrDLQ::format(&ingest),
            "DLQ Report - Error: Ingestion failed with: bad row"
        );
    }
}
