//! Menextract Library
//!
//! Reads highlights and sticky notes from a Mendeley desktop database and
//! writes annotated copies of the PDFs they belong to.
//!
//! # Modules
//!
//! - `db`: read-only access to the Mendeley SQLite database
//! - `resolver`: file URL to path resolution
//! - `annotations`: records and the per-file, per-page annotation map
//! - `pdf`: annotation objects and PDF rewriting via lopdf
//! - `pipeline`: per-file driver with skip classification

pub mod annotations;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod pdf;
pub mod pipeline;
pub mod resolver;

pub use config::Config;
pub use error::{AppError, Result, SkipReason};
pub use pipeline::{run, RunSummary};
