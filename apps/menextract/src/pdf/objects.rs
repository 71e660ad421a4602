//! Annotation dictionaries
//!
//! Builds `/Highlight` and `/Text` annotation dictionaries as described in
//! ISO 32000-1, section 12.5.6.

use chrono::{DateTime, Utc};
use lopdf::{dictionary, Dictionary, Object, StringFormat};

use crate::annotations::{Color, Highlight, Note, Rect};

/// Annotation flag "Print"
const FLAG_PRINT: i64 = 4;

/// Highlight annotation covering every rectangle of `highlight`
pub fn highlight_annotation(highlight: &Highlight) -> Dictionary {
    let bbox = Rect::bounding(&highlight.rects).unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));

    let mut dict = dictionary! {
        "Type" => "Annot",
        "Subtype" => "Highlight",
        "Rect" => rect_array(&bbox),
        "QuadPoints" => quad_points(&highlight.rects),
        "C" => color_array(highlight.color.unwrap_or(Color::YELLOW)),
        "CA" => Object::Real(1.0),
        "F" => FLAG_PRINT,
    };
    set_dates(&mut dict, highlight.created);
    dict
}

/// Sticky note anchored at the note's rectangle
pub fn text_annotation(note: &Note) -> Dictionary {
    let mut dict = dictionary! {
        "Type" => "Annot",
        "Subtype" => "Text",
        "Rect" => rect_array(&note.rect),
        "Contents" => text_string(&note.content),
        "T" => text_string(&note.author),
        "Name" => "Comment",
        "Open" => false,
        "C" => color_array(note.color.unwrap_or(Color::YELLOW)),
        "F" => FLAG_PRINT,
    };
    set_dates(&mut dict, note.created);
    dict
}

fn set_dates(dict: &mut Dictionary, timestamp: Option<DateTime<Utc>>) {
    if let Some(ts) = timestamp {
        dict.set("CreationDate", Object::string_literal(pdf_date(&ts)));
        dict.set("M", Object::string_literal(pdf_date(&ts)));
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn rect_array(rect: &Rect) -> Object {
    let r = rect.normalized();
    Object::Array(vec![real(r.x1), real(r.y1), real(r.x2), real(r.y2)])
}

/// Quadrilaterals in the reader-compatible order: top-left, top-right,
/// bottom-left, bottom-right.
fn quad_points(rects: &[Rect]) -> Object {
    let points = rects
        .iter()
        .map(Rect::normalized)
        .flat_map(|r| [r.x1, r.y2, r.x2, r.y2, r.x1, r.y1, r.x2, r.y1])
        .map(real)
        .collect();
    Object::Array(points)
}

fn color_array(color: Color) -> Object {
    Object::Array(
        color
            .components()
            .iter()
            .map(|c| Object::Real(*c))
            .collect(),
    )
}

/// PDF date string, `D:YYYYMMDDHHmmSSZ`
pub fn pdf_date(ts: &DateTime<Utc>) -> String {
    ts.format("D:%Y%m%d%H%M%SZ").to_string()
}

/// PDF text string: a literal for ASCII, UTF-16BE with a byte-order mark
/// otherwise
pub fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
