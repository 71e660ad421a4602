//! Highlight queries

use crate::annotations::{parse_timestamp, Color, HighlightRecord, PageNumber, Rect};
use crate::error::Result;

use super::MendeleyDb;

/// Raw highlight rectangle row
#[derive(Debug, Clone, sqlx::FromRow)]
struct HighlightRow {
    local_url: Option<String>,
    hash: String,
    page: i64,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    created_time: Option<String>,
    color: Option<String>,
}

impl HighlightRow {
    fn into_record(self) -> Option<HighlightRecord> {
        let Some(page) = PageNumber::new(self.page) else {
            tracing::warn!(
                "Ignoring highlight on invalid page {} of file {}",
                self.page,
                self.hash
            );
            return None;
        };

        Some(HighlightRecord {
            file_url: self.local_url.unwrap_or_default(),
            file_hash: self.hash,
            page,
            rect: Rect::new(self.x1, self.y1, self.x2, self.y2),
            created: self.created_time.as_deref().and_then(parse_timestamp),
            color: self.color.as_deref().and_then(Color::parse),
        })
    }
}

impl MendeleyDb {
    /// Every highlight rectangle, one record per rectangle, in database order
    pub async fn fetch_highlights(&self) -> Result<Vec<HighlightRecord>> {
        let rows = sqlx::query_as::<_, HighlightRow>(
            r#"
            SELECT Files.localUrl AS local_url,
                   Files.hash AS hash,
                   CAST(FileHighlightRects.page AS INTEGER) AS page,
                   CAST(FileHighlightRects.x1 AS REAL) AS x1,
                   CAST(FileHighlightRects.y1 AS REAL) AS y1,
                   CAST(FileHighlightRects.x2 AS REAL) AS x2,
                   CAST(FileHighlightRects.y2 AS REAL) AS y2,
                   FileHighlights.createdTime AS created_time,
                   FileHighlights.color AS color
            FROM Files
            LEFT JOIN FileHighlights
                ON FileHighlights.fileHash = Files.hash
            LEFT JOIN FileHighlightRects
                ON FileHighlightRects.highlightId = FileHighlights.id
            WHERE FileHighlightRects.page IS NOT NULL
            ORDER BY FileHighlightRects.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let records: Vec<_> = rows.into_iter().filter_map(HighlightRow::into_record).collect();
        tracing::info!("Read {} highlight rectangles", records.len());
        Ok(records)
    }
}
