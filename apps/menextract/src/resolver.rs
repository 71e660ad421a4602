//! Map Mendeley file URLs to PDFs on disk
//!
//! Mendeley stores attachments as `file://` URLs in `Files.localUrl`. Files
//! that were never synced to this machine have an empty URL; those can only
//! be identified by the title of the document that owns them.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use url::Url;

use crate::error::Result;

/// Looks up a document title from a file content hash
#[async_trait]
pub trait TitleLookup: Send + Sync {
    /// Title of the single document owning `file_hash`, `None` when no
    /// document or more than one matches.
    async fn lookup_title(&self, file_hash: &str) -> Result<Option<String>>;
}

#[async_trait]
impl TitleLookup for HashMap<String, String> {
    async fn lookup_title(&self, file_hash: &str) -> Result<Option<String>> {
        Ok(self.get(file_hash).cloned())
    }
}

/// Where the PDF for a database record lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Absolute path of the attached file
    Resolved(PathBuf),
    /// No usable path; the document title, when exactly one was found
    Unresolved(Option<String>),
}

/// Resolve a stored file URL, falling back to a title lookup when it is empty
pub async fn resolve<L>(url: &str, file_hash: &str, lookup: &L) -> Result<Resolution>
where
    L: TitleLookup + ?Sized,
{
    if url.is_empty() {
        let title = lookup.lookup_title(file_hash).await?;
        return Ok(Resolution::Unresolved(title));
    }

    Ok(Resolution::Resolved(url_to_path(url)))
}

/// Convert a file URL into an absolute filesystem path.
///
/// Strings that do not parse as URLs are treated as plain paths.
pub fn url_to_path(url: &str) -> PathBuf {
    let raw = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };

    let decoded = match urlencoding::decode(&raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw,
    };

    absolute(Path::new(strip_drive_slash(&decoded)))
}

/// `/C:/Users/...` → `C:/Users/...`
#[cfg(windows)]
fn strip_drive_slash(path: &str) -> &str {
    let bytes = path.as_bytes();
    if bytes.len() >= 3 && bytes[0] == b'/' && bytes[1].is_ascii_alphabetic() && bytes[2] == b':' {
        &path[1..]
    } else {
        path
    }
}

#[cfg(not(windows))]
fn strip_drive_slash(path: &str) -> &str {
    path
}

/// Make `path` absolute and drop `.` and `..` segments without touching the
/// filesystem.
fn absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
