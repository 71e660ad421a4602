//! PDF writing module
//!
//! Turns page-indexed highlights and notes into PDF annotation objects using
//! `lopdf`.

mod annotator;
mod objects;

pub use annotator::{annotate, annotate_bytes, clear_false_encryption, load_document};
pub use objects::{highlight_annotation, pdf_date, text_annotation, text_string};
