//! Annotation module
//!
//! Highlight and note records as read from Mendeley, and the per-file,
//! per-page map that the PDF writer consumes.
//!
//! # Layout
//!
//! - `types`: records, geometry, colors and timestamps
//! - `map`: grouping of records by resolved file and page

mod map;
mod types;

pub use map::{AnnotationMap, PageAnnotations};
pub use types::{
    parse_timestamp, Color, Highlight, HighlightRecord, Note, NoteRecord, PageBag, PageNumber,
    Rect, NOTE_BOX_SIZE,
};
