use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::YearOfStudy;

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Cli {
    /// SQLite file holding the timetable
    #[arg(long, value_name = "FILE", env = "TIMETABLE_DB", global = true)]
    pub database: Option<PathBuf>,

    /// Directory printable exports are written to
    #[arg(long, value_name = "DIR", env = "TIMETABLE_EXPORT_DIR", global = true)]
    pub export_dir: Option<PathBuf>,

    /// Log file (the terminal is owned by the UI)
    #[arg(long, value_name = "FILE", env = "TIMETABLE_LOG", global = true)]
    pub log_file: Option<PathBuf>,

    /// Run a one-off command instead of the interactive UI
    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write the printable timetable for a program and year
    Export {
        /// Program of study, exactly as entered
        #[arg(long)]
        program: String,

        /// Year of study, e.g. "First Year" or "PhD"
        #[arg(long, value_parser = parse_year)]
        year: YearOfStudy,

        /// Only save the file; do not open it
        #[arg(long)]
        no_open: bool,
    },
    /// Print the timetable for a program and year, or the available filters
    List {
        #[arg(long)]
        program: Option<String>,

        #[arg(long, value_parser = parse_year)]
        year: Option<YearOfStudy>,
    },
}

fn parse_year(raw: &str) -> Result<YearOfStudy, String> {
    raw.parse().map_err(|err: crate::models::EntryError| {
        let choices: Vec<&str> = YearOfStudy::ALL.iter().map(|year| year.label()).collect();
        format!("{err} Expected one of: {}", choices.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_parses_year_labels() {
        let cli = Cli::try_parse_from([
            "timetable-manager",
            "export",
            "--program",
            "Computer Science",
            "--year",
            "second year",
            "--no-open",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Export {
                program,
                year,
                no_open,
            }) => {
                assert_eq!(program, "Computer Science");
                assert_eq!(year, YearOfStudy::Second);
                assert!(no_open);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_year_is_a_usage_error() {
        let result = Cli::try_parse_from([
            "timetable-manager",
            "list",
            "--program",
            "CS",
            "--year",
            "Fifth Year",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn no_subcommand_means_interactive() {
        let args = ["timetable-manager", "--database", "/tmp/t.sqlite"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/t.sqlite")));
    }
}
