//! Binary entry point: resolve settings, bring up logging and the SQLite
//! store, then either run a one-off subcommand or drive the Ratatui loop
//! until the user exits.
use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing::{error, info};

use timetable_manager::cli::{Cli, Command};
use timetable_manager::config::{init_logging, Settings};
use timetable_manager::document::{print_timetable, render_plain_text, BrowserPresenter};
use timetable_manager::projection::{distinct_filter_options, ordered_days, Projection};
use timetable_manager::{ensure_schema, fetch_entries, run_app, App};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_cli(&cli)?;
    init_logging(&settings.log_path)?;
    info!(?settings, "starting");

    let conn = ensure_schema(&settings.database_path)?;
    let entries = fetch_entries(&conn)?;

    match cli.command {
        None => {
            let presenter = BrowserPresenter::new(settings.export_dir.clone());
            let mut app = App::new(conn, entries, Box::new(presenter));
            run_app(&mut app).inspect_err(|err| error!(error = %err, "ui exited with error"))
        }
        Some(Command::Export {
            program,
            year,
            no_open,
        }) => {
            let projection = Projection::build(&entries, Some(program.as_str()), Some(year));
            let presenter = if no_open {
                BrowserPresenter::save_only(settings.export_dir.clone())
            } else {
                BrowserPresenter::new(settings.export_dir.clone())
            };
            let path = print_timetable(
                &presenter,
                &projection.groups,
                &program,
                year,
                Local::now().naive_local(),
            )?;
            info!(
                path = %path.display(),
                entries = projection.groups.entry_count(),
                "timetable exported"
            );
            println!("{}", path.display());
            Ok(())
        }
        Some(Command::List { program, year }) => {
            match (program.as_deref(), year) {
                (Some(program), Some(year)) => {
                    let projection = Projection::build(&entries, Some(program), Some(year));
                    if projection.groups.is_empty() {
                        println!("No timetable entries found for the selected criteria.");
                    } else {
                        print!("{}", render_plain_text(&projection.groups, ordered_days()));
                    }
                }
                _ => {
                    let options = distinct_filter_options(&entries);
                    println!("Programs:");
                    for program in &options.programs {
                        println!("  {program}");
                    }
                    println!("Years:");
                    for year in &options.years {
                        println!("  {year}");
                    }
                }
            }
            Ok(())
        }
    }
}
