use clap::Parser;

/// Scrape election results for every district of a territorial unit on
/// volby.cz into a CSV file and a top-parties bar chart.
#[derive(Clone, Debug, PartialEq, Eq, Parser)]
#[command(name = "ingest", version)]
pub struct CliArgs {
    /// Index page of a territorial unit, e.g.
    /// "https://volby.cz/pls/ps2017nss/ps32?xjazyk=CZ&xkraj=2&xnumnuts=2101"
    #[arg(value_name = "DISTRICT_URL", value_parser = non_empty)]
    pub index_url: String,

    /// Base name of the output files; .csv and .png are added
    #[arg(value_name = "FILENAME", value_parser = non_empty)]
    pub name: String,
}

fn non_empty(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        Err("must not be empty".to_string())
    } else {
        Ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn two_positionals_run() {
        let args =
            CliArgs::try_parse_from(["ingest", "https://volby.cz/pls/ps2017nss/ps32", "benesov"])
                .unwrap();
        assert_eq!(
            args,
            CliArgs {
                index_url: "https://volby.cz/pls/ps2017nss/ps32".to_string(),
                name: "benesov".to_string(),
            }
        );
    }

    #[test]
    fn wrong_arity_is_rejected() {
        assert!(CliArgs::try_parse_from(["ingest"]).is_err());
        assert!(CliArgs::try_parse_from(["ingest", "only-url"]).is_err());
        assert!(CliArgs::try_parse_from(["ingest", "a", "b", "c"]).is_err());
    }

    #[test]
    fn blank_argument_is_rejected() {
        let err = CliArgs::try_parse_from(["ingest", "a", " "]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn help_is_not_a_usage_error() {
        let err = CliArgs::try_parse_from(["ingest", "a", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);
    }
}
