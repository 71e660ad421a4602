//! Error types for menextract

use std::path::PathBuf;

use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
///
/// Every variant here aborts the run. Per-file problems that only skip the
/// current document are [`SkipReason`]s.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database file not found: {}", .0.display())]
    DatabaseNotFound(PathBuf),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single document was skipped
#[derive(Error, Debug)]
pub enum SkipReason {
    #[error("Could not find pdffile {}", .0.display())]
    SourceFileNotFound(PathBuf),

    #[error("{} exists skipping.", .0.display())]
    OutputAlreadyExists(PathBuf),

    #[error("Empty URL found for document \"{}\"", .title.as_deref().unwrap_or("<unknown>"))]
    UnresolvedDocument {
        title: Option<String>,
        file_hash: String,
    },

    #[error("compressed stream error, skipping file: {}", .0.display())]
    StreamDecode(PathBuf),

    #[error("broken PDF structure, skipping file: {}", .0.display())]
    StructureRead(PathBuf),

    #[error("unreadable PDF, skipping file: {}", .0.display())]
    StreamRead(PathBuf),
}

/// Outcome of a failed per-document step
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Skip(#[from] SkipReason),

    #[error(transparent)]
    Fatal(#[from] AppError),
}

impl From<std::io::Error> for ProcessError {
    fn from(err: std::io::Error) -> Self {
        ProcessError::Fatal(AppError::Io(err))
    }
}

/// How a PDF library failure affects the current document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfFailure {
    /// A compressed stream could not be inflated
    StreamDecode,
    /// The object graph (xref, trailer, object streams) is broken
    StructureRead,
    /// The file could not be parsed as PDF at all
    StreamRead,
}

impl PdfFailure {
    /// Classify a `lopdf` error. `None` means the error is not a known
    /// per-file failure and must abort the run.
    pub fn classify(err: &lopdf::Error) -> Option<Self> {
        use lopdf::Error as E;

        match err {
            E::ContentDecode => Some(PdfFailure::StreamDecode),
            E::Xref(_)
            | E::Trailer
            | E::ObjectNotFound
            | E::ObjectIdMismatch
            | E::ReferenceLimit => Some(PdfFailure::StructureRead),
            E::Header | E::Parse { .. } | E::Offset(_) => Some(PdfFailure::StreamRead),
            _ => None,
        }
    }

    pub fn into_skip(self, path: PathBuf) -> SkipReason {
        match self {
            PdfFailure::StreamDecode => SkipReason::StreamDecode(path),
            PdfFailure::StructureRead => SkipReason::StructureRead(path),
            PdfFailure::StreamRead => SkipReason::StreamRead(path),
        }
    }
}
