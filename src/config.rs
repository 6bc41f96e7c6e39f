use std::path::PathBuf;

use crate::domain::Error;

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Command line settings for the batch binary.
///
/// `<commands.csv> [--ledger] [--log-level <filter>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    pub print_ledger: bool,
    pub log_filter: String,
}

impl Config {
    /// Parses arguments without the program name.
    pub fn from_args<I, S>(args: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut input = None;
        let mut print_ledger = false;
        let mut log_filter = DEFAULT_LOG_FILTER.to_string();

        let mut args = args.into_iter().map(Into::<String>::into);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--ledger" => print_ledger = true,
                "--log-level" => {
                    log_filter = args
                        .next()
                        .ok_or_else(|| Error::Config("--log-level needs a value".to_string()))?;
                }
                flag if flag.starts_with("--") => {
                    return Err(Error::Config(format!("Unknown option: {}", flag)));
                }
                _ if input.is_some() => {
                    return Err(Error::Config(format!("Unexpected argument: {}", arg)));
                }
                _ => input = Some(PathBuf::from(&arg)),
            }
        }

        let input =
            input.ok_or_else(|| Error::Config("No command file was provided".to_string()))?;

        Ok(Self {
            input,
            print_ledger,
            log_filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_with_only_input() {
        let config = Config::from_args(["commands.csv"]).unwrap();
        assert_eq!(config.input, PathBuf::from("commands.csv"));
        assert!(!config.print_ledger);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn flags_in_any_position() {
        let config =
            Config::from_args(["--ledger", "in.csv", "--log-level", "transfer_ledger=debug"])
                .unwrap();
        assert_eq!(config.input, PathBuf::from("in.csv"));
        assert!(config.print_ledger);
        assert_eq!(config.log_filter, "transfer_ledger=debug");
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(matches!(
            Config::from_args(Vec::<String>::new()),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_args(["a.csv", "b.csv"]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_args(["a.csv", "--verbose"]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_args(["a.csv", "--log-level"]),
            Err(Error::Config(_))
        ));
    }
}
