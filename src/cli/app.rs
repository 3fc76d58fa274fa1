use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bulk-app-update")]
#[command(about = "Bulk-update Veracode application profiles from an Excel workbook")]
#[command(long_about = "Reads every row of the workbook's first sheet and updates the matching \
application profile. Column headers are read from the header row; a status column is written \
after the last header, and rows already marked 'success' are skipped on later runs. A cell \
containing NULL clears that field, a blank cell leaves it unchanged.")]
pub struct Cli {
    /// Excel workbook with the application definitions
    #[arg(short = 'f', long = "file_name", value_name = "FILE")]
    pub file_name: Option<PathBuf>,

    /// Row holding the column headers
    #[arg(
        short = 'r',
        long = "header_row",
        default_value_t = 2,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub header_row: u32,

    /// Verbose output
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Send only the changed fields instead of replacing the whole profile
    #[arg(long)]
    pub partial: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_and_short_flags() {
        let cli = Cli::try_parse_from(["bulk-app-update", "-f", "apps.xlsx", "-d"]).unwrap();
        assert_eq!(cli.file_name, Some(PathBuf::from("apps.xlsx")));
        assert_eq!(cli.header_row, 2);
        assert!(cli.debug);
        assert!(!cli.partial);
    }

    #[test]
    fn test_long_flags() {
        let cli = Cli::try_parse_from([
            "bulk-app-update",
            "--file_name",
            "apps.xlsx",
            "--header_row",
            "5",
            "--partial",
        ])
        .unwrap();
        assert_eq!(cli.header_row, 5);
        assert!(cli.partial);
    }

    #[test]
    fn test_header_row_must_be_positive() {
        assert!(Cli::try_parse_from(["bulk-app-update", "-f", "a.xlsx", "-r", "0"]).is_err());
    }

    #[test]
    fn test_file_is_optional_at_parse_time() {
        let cli = Cli::try_parse_from(["bulk-app-update"]).unwrap();
        assert!(cli.file_name.is_none());
    }
}
