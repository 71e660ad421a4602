//! Annotation types shared between the database reader and the PDF writer
//!
//! Coordinates are PDF user-space points with the origin at the bottom-left
//! of the page, which is how Mendeley stores them.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Side length of the box synthesized for a sticky note.
///
/// Readers only use the anchor point of a `/Text` annotation.
pub const NOTE_BOX_SIZE: f64 = 30.0;

/// 1-based page number as stored in the Mendeley database
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageNumber(u32);

impl PageNumber {
    /// Build a page number from a database value. Pages start at 1.
    pub fn new(page: i64) -> Option<Self> {
        u32::try_from(page).ok().filter(|p| *p >= 1).map(Self)
    }

    /// Page number of the page at a 0-based position in the page tree
    pub fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }

    /// 0-based position of this page in the page tree
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// RGB color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Default color used by readers when an annotation carries none
    pub const YELLOW: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 0.0,
    };

    /// Parse a Mendeley color value (`#rrggbb`, with or without the `#`)
    pub fn parse(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };

        Some(Color {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    pub fn components(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// Axis-aligned rectangle `[x1, y1, x2, y2]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rect {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Fixed-size box anchored at a note position
    pub fn note_box(x: f64, y: f64) -> Self {
        Self::new(x, y, x + NOTE_BOX_SIZE, y + NOTE_BOX_SIZE)
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Same rectangle with corners ordered so that `x1 <= x2` and `y1 <= y2`
    pub fn normalized(&self) -> Self {
        Self::new(
            self.x1.min(self.x2),
            self.y1.min(self.y2),
            self.x1.max(self.x2),
            self.y1.max(self.y2),
        )
    }

    /// Smallest rectangle containing all of `rects`
    pub fn bounding(rects: &[Rect]) -> Option<Self> {
        let mut iter = rects.iter().map(Rect::normalized);
        let first = iter.next()?;
        Some(iter.fold(first, |acc, r| {
            Rect::new(
                acc.x1.min(r.x1),
                acc.y1.min(r.y1),
                acc.x2.max(r.x2),
                acc.y2.max(r.y2),
            )
        }))
    }
}

/// One highlight rectangle row read from the database
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightRecord {
    pub file_url: String,
    pub file_hash: String,
    pub page: PageNumber,
    pub rect: Rect,
    pub created: Option<DateTime<Utc>>,
    pub color: Option<Color>,
}

/// One sticky note row read from the database
#[derive(Debug, Clone, PartialEq)]
pub struct NoteRecord {
    pub file_url: String,
    pub file_hash: String,
    pub page: PageNumber,
    pub x: f64,
    pub y: f64,
    pub author: String,
    pub content: String,
    pub modified: Option<DateTime<Utc>>,
    pub color: Option<Color>,
}

impl NoteRecord {
    pub fn rect(&self) -> Rect {
        Rect::note_box(self.x, self.y)
    }
}

/// A highlight ready to be written to a page
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub rects: Vec<Rect>,
    pub created: Option<DateTime<Utc>>,
    pub color: Option<Color>,
}

impl From<HighlightRecord> for Highlight {
    fn from(record: HighlightRecord) -> Self {
        Self {
            rects: vec![record.rect],
            created: record.created,
            color: record.color,
        }
    }
}

/// A sticky note ready to be written to a page
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub rect: Rect,
    pub author: String,
    pub content: String,
    pub created: Option<DateTime<Utc>>,
    pub color: Option<Color>,
}

impl From<NoteRecord> for Note {
    fn from(record: NoteRecord) -> Self {
        Self {
            rect: record.rect(),
            author: record.author,
            content: record.content,
            created: record.modified,
            color: record.color,
        }
    }
}

/// Highlights and notes for a single page, in database read order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageBag {
    pub highlights: Vec<Highlight>,
    pub notes: Vec<Note>,
}

/// Parse a Mendeley timestamp.
///
/// Accepts RFC 3339 (`2016-03-04T12:34:56Z`) and zone-less forms with a `T`
/// or space separator, which are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
    ];

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}
