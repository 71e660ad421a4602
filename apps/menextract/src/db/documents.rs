//! Document title lookups for files without a local URL

use async_trait::async_trait;

use crate::error::Result;
use crate::resolver::TitleLookup;

use super::MendeleyDb;

impl MendeleyDb {
    /// Title of the document owning a file, when exactly one document does
    pub async fn lookup_title(&self, file_hash: &str) -> Result<Option<String>> {
        let titles = sqlx::query_scalar::<_, Option<String>>(
            r#"
            SELECT Documents.title
            FROM Documents
            WHERE Documents.id IN (
                SELECT DocumentFiles.documentId
                FROM DocumentFiles
                WHERE DocumentFiles.hash = ?
            )
            "#,
        )
        .bind(file_hash)
        .fetch_all(&self.pool)
        .await?;

        match titles.as_slice() {
            [title] => Ok(title.clone()),
            [] => Ok(None),
            _ => {
                tracing::debug!("{} documents share file {}", titles.len(), file_hash);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl TitleLookup for MendeleyDb {
    async fn lookup_title(&self, file_hash: &str) -> Result<Option<String>> {
        MendeleyDb::lookup_title(self, file_hash).await
    }
}
