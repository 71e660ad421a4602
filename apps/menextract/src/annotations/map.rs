//! Group database rows by file and page

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::resolver::{resolve, Resolution, TitleLookup};

use super::types::{HighlightRecord, NoteRecord, PageBag, PageNumber};

/// Annotations of one PDF, keyed by page
pub type PageAnnotations = BTreeMap<PageNumber, PageBag>;

/// Every annotation of a run, grouped by source file
#[derive(Debug, Default)]
pub struct AnnotationMap {
    documents: BTreeMap<PathBuf, PageAnnotations>,
    /// file hash → document title, for records with no local file
    unresolved: BTreeMap<String, Option<String>>,
}

impl AnnotationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold highlights, then notes, into a fresh map
    pub async fn build<L>(
        highlights: Vec<HighlightRecord>,
        notes: Vec<NoteRecord>,
        lookup: &L,
    ) -> Result<Self>
    where
        L: TitleLookup + ?Sized,
    {
        let mut map = Self::new();
        for record in highlights {
            map.add_highlight(record, lookup).await?;
        }
        for record in notes {
            map.add_note(record, lookup).await?;
        }

        tracing::debug!(
            documents = map.documents.len(),
            unresolved = map.unresolved.len(),
            "Aggregated annotations"
        );
        Ok(map)
    }

    pub async fn add_highlight<L>(&mut self, record: HighlightRecord, lookup: &L) -> Result<()>
    where
        L: TitleLookup + ?Sized,
    {
        if let Some(bag) = self.bag_for(&record.file_url, &record.file_hash, record.page, lookup).await? {
            bag.highlights.push(record.into());
        }
        Ok(())
    }

    pub async fn add_note<L>(&mut self, record: NoteRecord, lookup: &L) -> Result<()>
    where
        L: TitleLookup + ?Sized,
    {
        if let Some(bag) = self.bag_for(&record.file_url, &record.file_hash, record.page, lookup).await? {
            bag.notes.push(record.into());
        }
        Ok(())
    }

    /// Page bag for a record, or `None` when its file is unresolved
    async fn bag_for<L>(
        &mut self,
        url: &str,
        file_hash: &str,
        page: PageNumber,
        lookup: &L,
    ) -> Result<Option<&mut PageBag>>
    where
        L: TitleLookup + ?Sized,
    {
        match resolve(url, file_hash, lookup).await? {
            Resolution::Resolved(path) => Ok(Some(
                self.documents
                    .entry(path)
                    .or_default()
                    .entry(page)
                    .or_default(),
            )),
            Resolution::Unresolved(title) => {
                self.unresolved.insert(file_hash.to_string(), title);
                Ok(None)
            }
        }
    }

    /// Resolved documents in path order
    pub fn documents(&self) -> impl Iterator<Item = (&Path, &PageAnnotations)> {
        self.documents.iter().map(|(path, pages)| (path.as_path(), pages))
    }

    pub fn get(&self, path: &Path) -> Option<&PageAnnotations> {
        self.documents.get(path)
    }

    /// Unresolved documents as `(file_hash, title)`
    pub fn unresolved(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.unresolved
            .iter()
            .map(|(hash, title)| (hash.as_str(), title.as_deref()))
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn unresolved_count(&self) -> usize {
        self.unresolved.len()
    }
}
