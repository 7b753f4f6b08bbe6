//! Resolved runtime settings. Flags and environment variables come in through
//! [`Cli`](crate::cli::Cli); anything left unset falls back to a per-user
//! data directory under the home folder.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".timetable-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "timetable.sqlite";
const EXPORT_DIR_NAME: &str = "exports";
const LOG_FILE_NAME: &str = "timetable.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_path: PathBuf,
    pub export_dir: PathBuf,
    pub log_path: PathBuf,
}

impl Settings {
    /// Merge CLI/env overrides with the defaults rooted at `data_dir`.
    pub fn resolve(cli: &Cli, data_dir: &Path) -> Self {
        Self {
            database_path: cli
                .database
                .clone()
                .unwrap_or_else(|| data_dir.join(DB_FILE_NAME)),
            export_dir: cli
                .export_dir
                .clone()
                .unwrap_or_else(|| data_dir.join(EXPORT_DIR_NAME)),
            log_path: cli
                .log_file
                .clone()
                .unwrap_or_else(|| data_dir.join(LOG_FILE_NAME)),
        }
    }

    /// [`Settings::resolve`] against the real home directory.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Ok(Self::resolve(cli, &default_data_dir()?))
    }
}

/// `~/.timetable-manager`.
pub fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

/// Route `tracing` output to `log_path`. `RUST_LOG` overrides the default
/// `info` level.
pub fn init_logging(log_path: &Path) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).context("failed to create log directory")?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| anyhow!("failed to install log subscriber: {err}"))
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn defaults_live_under_the_data_dir() {
        let cli = Cli::parse_from(["timetable-manager"]);
        let cli = Cli {
            database: None,
            export_dir: None,
            log_file: None,
            ..cli
        };

        let settings = Settings::resolve(&cli, Path::new("/home/ada/.timetable-manager"));
        assert_eq!(
            settings,
            Settings {
                database_path: PathBuf::from("/home/ada/.timetable-manager/timetable.sqlite"),
                export_dir: PathBuf::from("/home/ada/.timetable-manager/exports"),
                log_path: PathBuf::from("/home/ada/.timetable-manager/timetable.log"),
            }
        );
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "timetable-manager",
            "--database",
            "/srv/tt.sqlite",
            "--export-dir",
            "/tmp/prints",
            "--log-file",
            "/var/log/tt.log",
        ]);

        let settings = Settings::resolve(&cli, Path::new("/unused"));
        assert_eq!(settings.database_path, PathBuf::from("/srv/tt.sqlite"));
        assert_eq!(settings.export_dir, PathBuf::from("/tmp/prints"));
        assert_eq!(settings.log_path, PathBuf::from("/var/log/tt.log"));
    }
}
