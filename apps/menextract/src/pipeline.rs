//! Extract annotations from the database and write annotated PDFs
//!
//! Files are handled one at a time. Each file either ends up written or
//! skipped with a [`SkipReason`]; any other failure aborts the run.

use std::path::{Path, PathBuf};

use crate::annotations::{AnnotationMap, PageAnnotations};
use crate::config::Config;
use crate::db::MendeleyDb;
use crate::error::{AppError, PdfFailure, ProcessError, Result, SkipReason};
use crate::pdf;

/// What happened to a single resolved document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written(PathBuf),
    Overwritten(PathBuf),
}

/// Tally of a run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
    pub overwritten: Vec<PathBuf>,
    pub skipped: Vec<SkipReason>,
}

impl RunSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Written(path) => self.written.push(path),
            Outcome::Overwritten(path) => self.overwritten.push(path),
        }
    }

    fn record_skip(&mut self, reason: SkipReason) {
        report_skip(&reason);
        self.skipped.push(reason);
    }

    /// Number of files written or overwritten
    pub fn changed(&self) -> usize {
        self.written.len() + self.overwritten.len()
    }
}

/// Run the whole extraction
pub async fn run(config: &Config) -> Result<RunSummary> {
    let db = MendeleyDb::open(&config.database).await?;

    let highlights = db.fetch_highlights().await?;
    let notes = db.fetch_notes().await?;
    let annotations = AnnotationMap::build(highlights, notes, &db).await?;
    db.close().await;

    process_all(&annotations, config)
}

/// Write an annotated copy of every resolved document in `annotations`
pub fn process_all(annotations: &AnnotationMap, config: &Config) -> Result<RunSummary> {
    std::fs::create_dir_all(&config.dest)?;

    let mut summary = RunSummary::default();

    for (file_hash, title) in annotations.unresolved() {
        summary.record_skip(SkipReason::UnresolvedDocument {
            title: title.map(str::to_string),
            file_hash: file_hash.to_string(),
        });
    }

    for (source, pages) in annotations.documents() {
        match process_document(source, pages, config) {
            Ok(outcome) => summary.record(outcome),
            Err(ProcessError::Skip(reason)) => summary.record_skip(reason),
            Err(ProcessError::Fatal(err)) => return Err(err),
        }
    }

    tracing::info!(
        "Done: {} written, {} overwritten, {} skipped",
        summary.written.len(),
        summary.overwritten.len(),
        summary.skipped.len()
    );
    Ok(summary)
}

/// Where the annotated copy of `source` goes: same file name, in `dest`
pub fn output_path(source: &Path, dest: &Path) -> Option<PathBuf> {
    source.file_name().map(|name| dest.join(name))
}

/// Annotate one source file according to the overwrite policy
pub fn process_document(
    source: &Path,
    pages: &PageAnnotations,
    config: &Config,
) -> std::result::Result<Outcome, ProcessError> {
    if !source.is_file() {
        return Err(SkipReason::SourceFileNotFound(source.to_path_buf()).into());
    }
    let output = output_path(source, &config.dest)
        .ok_or_else(|| SkipReason::SourceFileNotFound(source.to_path_buf()))?;

    let exists = output.exists();
    if exists && !config.overwrite {
        return Err(SkipReason::OutputAlreadyExists(output).into());
    }

    let bytes = std::fs::read(source).map_err(|err| {
        tracing::debug!("Cannot read {}: {}", source.display(), err);
        SkipReason::SourceFileNotFound(source.to_path_buf())
    })?;

    let (annotated, added) = match pdf::annotate_bytes(&bytes, pages) {
        Ok(result) => result,
        Err(err) => match PdfFailure::classify(&err) {
            Some(failure) => {
                tracing::debug!("PDF error in {}: {}", source.display(), err);
                return Err(failure.into_skip(source.to_path_buf()).into());
            }
            None => return Err(AppError::Pdf(err).into()),
        },
    };

    std::fs::write(&output, &annotated)?;
    tracing::debug!(
        "Added {} annotations to {} ({} bytes)",
        added,
        output.display(),
        annotated.len()
    );

    if exists {
        println!("overwriting {}", output.display());
        Ok(Outcome::Overwritten(output))
    } else {
        println!("writing pdf to {}", output.display());
        Ok(Outcome::Written(output))
    }
}

/// Skip notices for existing outputs are progress messages; the rest are
/// diagnostics.
fn report_skip(reason: &SkipReason) {
    match reason {
        SkipReason::OutputAlreadyExists(_) => println!("{reason}"),
        SkipReason::UnresolvedDocument { file_hash, .. } => {
            tracing::warn!(file_hash = %file_hash, "{reason}")
        }
        _ => tracing::error!("{reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{HighlightRecord, NoteRecord, PageNumber, Rect};
    use crate::db::fixtures as db_fixtures;
    use crate::pdf::fixtures::{annotation_count, page_count, sample_pdf};
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
    use std::collections::HashMap;
    use tempfile::TempDir;

    struct Library {
        dir: TempDir,
    }

    impl Library {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::create_dir(dir.path().join("papers")).unwrap();
            Self { dir }
        }

        fn add_pdf(&self, name: &str, pages: usize) -> PathBuf {
            let path = self.dir.path().join("papers").join(name);
            std::fs::write(&path, sample_pdf(pages)).unwrap();
            path
        }

        fn dest(&self) -> PathBuf {
            self.dir.path().join("annotated")
        }

        fn url(path: &Path) -> String {
            format!("file://{}", path.display()).replace(' ', "%20")
        }
    }

    fn highlight(path: &Path, page: i64) -> HighlightRecord {
        HighlightRecord {
            file_url: Library::url(path),
            file_hash: path.display().to_string(),
            page: PageNumber::new(page).unwrap(),
            rect: Rect::new(72.0, 600.0, 300.0, 614.0),
            created: None,
            color: None,
        }
    }

    fn note(path: &Path, page: i64) -> NoteRecord {
        NoteRecord {
            file_url: Library::url(path),
            file_hash: path.display().to_string(),
            page: PageNumber::new(page).unwrap(),
            x: 40.0,
            y: 40.0,
            author: "Ana".to_string(),
            content: "note".to_string(),
            modified: None,
            color: None,
        }
    }

    async fn map_of(highlights: Vec<HighlightRecord>, notes: Vec<NoteRecord>) -> AnnotationMap {
        let lookup: HashMap<String, String> = HashMap::new();
        AnnotationMap::build(highlights, notes, &lookup).await.unwrap()
    }

    #[tokio::test]
    async fn test_writes_one_file_per_document() {
        let lib = Library::new();
        let a = lib.add_pdf("a.pdf", 5);
        let b = lib.add_pdf("with space.pdf", 2);

        let map = map_of(vec![highlight(&a, 3), highlight(&b, 1)], vec![note(&a, 3)]).await;
        let config = Config::new("/unused", lib.dest());

        let summary = process_all(&map, &config).unwrap();
        assert_eq!(summary.written.len(), 2);
        assert!(summary.skipped.is_empty());

        let out_a = lib.dest().join("a.pdf");
        let written = lopdf::Document::load(&out_a).unwrap();
        let pages: Vec<_> = written.get_pages().into_values().collect();
        assert_eq!(pages.len(), 5);
        assert_eq!(annotation_count(&written, pages[2]), 2);
        assert_eq!(annotation_count(&written, pages[0]), 0);

        assert!(lib.dest().join("with space.pdf").is_file());
    }

    #[tokio::test]
    async fn test_second_run_without_overwrite_changes_nothing() {
        let lib = Library::new();
        let a = lib.add_pdf("a.pdf", 2);
        let b = lib.add_pdf("b.pdf", 2);
        let map = map_of(vec![highlight(&a, 1), highlight(&b, 2)], Vec::new()).await;
        let config = Config::new("/unused", lib.dest());

        let first = process_all(&map, &config).unwrap();
        assert_eq!(first.changed(), 2);

        let before: Vec<_> = ["a.pdf", "b.pdf"]
            .iter()
            .map(|n| std::fs::read(lib.dest().join(n)).unwrap())
            .collect();

        let second = process_all(&map, &config).unwrap();
        assert_eq!(second.changed(), 0);
        assert_eq!(second.skipped.len(), 2);
        assert!(second
            .skipped
            .iter()
            .all(|s| matches!(s, SkipReason::OutputAlreadyExists(_))));

        let after: Vec<_> = ["a.pdf", "b.pdf"]
            .iter()
            .map(|n| std::fs::read(lib.dest().join(n)).unwrap())
            .collect();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_overwrite_rewrites_and_keeps_page_count() {
        let lib = Library::new();
        let a = lib.add_pdf("a.pdf", 4);
        let map = map_of(vec![highlight(&a, 4)], Vec::new()).await;

        std::fs::create_dir_all(lib.dest()).unwrap();
        std::fs::write(lib.dest().join("a.pdf"), b"stale").unwrap();

        let config = Config::new("/unused", lib.dest()).with_overwrite(true);
        let summary = process_all(&map, &config).unwrap();
        assert_eq!(summary.overwritten, vec![lib.dest().join("a.pdf")]);
        assert_eq!(page_count(&lib.dest().join("a.pdf")), 4);
    }

    #[tokio::test]
    async fn test_missing_source_is_skipped() {
        let lib = Library::new();
        let present = lib.add_pdf("present.pdf", 1);
        let missing = lib.dir.path().join("papers").join("missing.pdf");

        let map = map_of(vec![highlight(&missing, 1), highlight(&present, 1)], Vec::new()).await;
        let summary = process_all(&map, &Config::new("/unused", lib.dest())).unwrap();

        assert_eq!(summary.written.len(), 1);
        assert!(matches!(
            summary.skipped.as_slice(),
            [SkipReason::SourceFileNotFound(p)] if *p == missing
        ));
    }

    #[tokio::test]
    async fn test_unreadable_pdf_is_skipped_and_run_continues() {
        let lib = Library::new();
        let broken = lib.dir.path().join("papers").join("a-broken.pdf");
        std::fs::write(&broken, b"not a pdf at all").unwrap();
        let good = lib.add_pdf("b-good.pdf", 1);

        let map = map_of(vec![highlight(&broken, 1), highlight(&good, 1)], Vec::new()).await;
        let summary = process_all(&map, &Config::new("/unused", lib.dest())).unwrap();

        assert_eq!(summary.written, vec![lib.dest().join("b-good.pdf")]);
        assert_eq!(summary.skipped.len(), 1);
        assert!(matches!(
            &summary.skipped[0],
            SkipReason::StreamRead(p) | SkipReason::StructureRead(p) | SkipReason::StreamDecode(p)
                if *p == broken
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_source_that_cannot_be_read_is_skipped() {
        // A regular file whose read() fails with EIO
        let source = Path::new("/proc/self/mem");
        let dest = tempfile::tempdir().unwrap();
        let config = Config::new("/unused", dest.path());

        let result = process_document(source, &PageAnnotations::new(), &config);
        assert!(matches!(
            result,
            Err(ProcessError::Skip(SkipReason::SourceFileNotFound(p))) if p == source
        ));
        assert!(!dest.path().join("mem").exists());
    }

    #[tokio::test]
    async fn test_failed_pdf_leaves_no_output() {
        let lib = Library::new();
        let broken = lib.dir.path().join("papers").join("broken.pdf");
        std::fs::write(&broken, b"not a pdf at all").unwrap();
        std::fs::create_dir_all(lib.dest()).unwrap();

        let map = map_of(vec![highlight(&broken, 1)], Vec::new()).await;
        let pages = map.get(&broken).unwrap();
        let result = process_document(&broken, pages, &Config::new("/unused", lib.dest()));

        assert!(matches!(result, Err(ProcessError::Skip(_))));
        assert!(!lib.dest().join("broken.pdf").exists());
    }

    #[tokio::test]
    async fn test_unresolved_documents_are_reported() {
        let lib = Library::new();
        let mut record = highlight(Path::new("/nowhere.pdf"), 1);
        record.file_url = String::new();
        record.file_hash = "h-unknown".to_string();

        let map = map_of(vec![record], Vec::new()).await;
        let summary = process_all(&map, &Config::new("/unused", lib.dest())).unwrap();

        assert_eq!(summary.changed(), 0);
        assert!(matches!(
            summary.skipped.as_slice(),
            [SkipReason::UnresolvedDocument { title: None, file_hash }] if file_hash == "h-unknown"
        ));
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("/lib/papers/x.pdf"), Path::new("/out")),
            Some(PathBuf::from("/out/x.pdf"))
        );
        assert_eq!(output_path(Path::new("/"), Path::new("/out")), None);
    }

    #[tokio::test]
    async fn test_run_missing_database_writes_nothing() {
        let lib = Library::new();
        let config = Config::new(lib.dir.path().join("nope.sqlite"), lib.dest());

        let err = run(&config).await.unwrap_err();
        assert!(matches!(err, AppError::DatabaseNotFound(_)));
        assert!(!lib.dest().exists());
    }

    #[tokio::test]
    async fn test_run_end_to_end() {
        let lib = Library::new();
        let paper = lib.add_pdf("paper.pdf", 5);
        let db_path = lib.dir.path().join("mendeley.sqlite");

        let options = SqliteConnectOptions::new().filename(&db_path).create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await.unwrap();
        db_fixtures::create_schema(&pool).await;
        db_fixtures::add_file(&pool, "h1", &Library::url(&paper)).await;
        db_fixtures::add_file(&pool, "h2", "").await;
        db_fixtures::add_document(&pool, 9, "Cloud Only", "h2").await;
        db_fixtures::add_highlight(&pool, 1, "h1", "2016-03-04T12:34:56Z", Some("#ff0000"), 3, [72.0, 600.0, 300.0, 614.0])
            .await;
        db_fixtures::add_highlight(&pool, 2, "h2", "2016-03-04T12:34:56Z", None, 1, [0.0, 0.0, 1.0, 1.0])
            .await;
        db_fixtures::add_note(&pool, "h1", Some(3), 500.0, 700.0, "Ana", "Hm.", "2016-03-05T09:00:00Z")
            .await;
        pool.close().await;

        let config = Config::new(&db_path, lib.dest());
        let summary = run(&config).await.unwrap();

        assert_eq!(summary.written, vec![lib.dest().join("paper.pdf")]);
        assert!(matches!(
            summary.skipped.as_slice(),
            [SkipReason::UnresolvedDocument { title: Some(t), .. }] if t == "Cloud Only"
        ));

        let written = lopdf::Document::load(lib.dest().join("paper.pdf")).unwrap();
        let pages: Vec<_> = written.get_pages().into_values().collect();
        assert_eq!(pages.len(), 5);
        assert_eq!(annotation_count(&written, pages[2]), 2);
    }
}
