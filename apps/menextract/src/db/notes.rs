//! Sticky note queries

use crate::annotations::{parse_timestamp, Color, NoteRecord, PageNumber};
use crate::error::Result;

use super::MendeleyDb;

/// Raw note row
#[derive(Debug, Clone, sqlx::FromRow)]
struct NoteRow {
    local_url: Option<String>,
    hash: String,
    page: i64,
    x: f64,
    y: f64,
    author: Option<String>,
    note: Option<String>,
    modified_time: Option<String>,
    color: Option<String>,
}

impl NoteRow {
    fn into_record(self) -> Option<NoteRecord> {
        let Some(page) = PageNumber::new(self.page) else {
            tracing::warn!("Ignoring note on invalid page {} of file {}", self.page, self.hash);
            return None;
        };

        Some(NoteRecord {
            file_url: self.local_url.unwrap_or_default(),
            file_hash: self.hash,
            page,
            x: self.x,
            y: self.y,
            author: self.author.unwrap_or_default(),
            content: self.note.unwrap_or_default(),
            modified: self.modified_time.as_deref().and_then(parse_timestamp),
            color: self.color.as_deref().and_then(Color::parse),
        })
    }
}

impl MendeleyDb {
    /// Every sticky note placed on a page, in database order
    pub async fn fetch_notes(&self) -> Result<Vec<NoteRecord>> {
        let rows = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT Files.localUrl AS local_url,
                   Files.hash AS hash,
                   CAST(FileNotes.page AS INTEGER) AS page,
                   CAST(FileNotes.x AS REAL) AS x,
                   CAST(FileNotes.y AS REAL) AS y,
                   FileNotes.author AS author,
                   FileNotes.note AS note,
                   FileNotes.modifiedTime AS modified_time,
                   FileNotes.color AS color
            FROM Files
            LEFT JOIN FileNotes
                ON FileNotes.fileHash = Files.hash
            WHERE FileNotes.page IS NOT NULL
            ORDER BY FileNotes.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let records: Vec<_> = rows.into_iter().filter_map(NoteRow::into_record).collect();
        tracing::info!("Read {} notes", records.len());
        Ok(records)
    }
}
