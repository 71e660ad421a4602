//! Configuration management for menextract

use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// Log target of this crate, used to build the default filter
const LOG_TARGET: &str = "menextract";

/// Settings for one run, threaded through the pipeline
#[derive(Debug, Clone)]
pub struct Config {
    /// Mendeley SQLite database
    pub database: PathBuf,
    /// Directory receiving the annotated copies
    pub dest: PathBuf,
    /// Replace existing files in `dest` instead of skipping them
    pub overwrite: bool,
    pub verbosity: Verbosity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose(u8),
}

impl Config {
    pub fn new(database: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Config {
            database: database.into(),
            dest: dest.into(),
            overwrite: false,
            verbosity: Verbosity::default(),
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn from_cli(cli: &Cli) -> Self {
        let verbosity = match (cli.quiet, cli.verbose) {
            (true, _) => Verbosity::Quiet,
            (false, 0) => Verbosity::Normal,
            (false, n) => Verbosity::Verbose(n),
        };

        Config {
            database: absolute(&cli.mendeleydb),
            dest: absolute(&cli.dest),
            overwrite: cli.overwrite,
            verbosity,
        }
    }

    /// Default `tracing` filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> String {
        let level = match self.verbosity {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose(1) => "info",
            Verbosity::Verbose(2) => "debug",
            Verbosity::Verbose(_) => "trace",
        };
        format!("{LOG_TARGET}={level}")
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
