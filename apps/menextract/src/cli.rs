use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Burn Mendeley highlights and notes into copies of the annotated PDFs.
#[derive(Parser, Debug)]
#[command(name = "menextract2pdf", author, version, about, long_about = None)]
pub struct Cli {
    /// The mendeley sqlite database file
    #[arg(env = "MENEXTRACT_DB")]
    pub mendeleydb: PathBuf,

    /// The destination directory where to save the annotated pdfs
    #[arg(env = "MENEXTRACT_DEST")]
    pub dest: PathBuf,

    /// Overwrite any PDF files in the destination directory
    #[arg(short = 'w', long)]
    pub overwrite: bool,

    /// Increase verbosity (use multiple times for more).
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only report errors.
    #[arg(short, long)]
    pub quiet: bool,
}
