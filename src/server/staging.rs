//! Per-request staging of uploaded files
//!
//! Every upload batch gets its own directory under the configured upload root.
//! The directory and everything in it disappear when the [`StagingArea`] is
//! dropped, whether the request succeeded or not.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use unicode_normalization::UnicodeNormalization;

/// Upload names must end with this (case-sensitive)
pub const PDF_SUFFIX: &str = ".pdf";

/// Whether a client-supplied name qualifies as a PDF upload
pub fn is_pdf_name(name: &str) -> bool {
    name.ends_with(PDF_SUFFIX)
}

/// Reduce a client-supplied file name to something safe to put on disk
///
/// Decomposes accented letters to their ASCII base (`ü` becomes `u`), keeps
/// only the final path component, turns whitespace runs into `_`, drops
/// everything outside `[A-Za-z0-9._-]` and strips leading/trailing `.` and `_`.
/// May return an empty string.
pub fn secure_filename(name: &str) -> String {
    let decomposed: String = name.nfkd().collect();
    let base = decomposed.rsplit(['/', '\\']).next().unwrap_or("");
    let joined = base.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Remove everything inside `dir`, leaving the directory itself
///
/// Returns how many entries were removed.
pub fn clear_directory(dir: &Path) -> io::Result<usize> {
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            std::fs::remove_dir_all(&path)?;
        } else {
            std::fs::remove_file(&path)?;
        }
        removed += 1;
    }
    Ok(removed)
}

/// A request-scoped directory holding one upload batch
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
    files: Vec<PathBuf>,
}

impl StagingArea {
    /// Create a fresh, uniquely named directory under `root`
    pub fn create_in(root: &Path) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("batch-").tempdir_in(root)?;
        Ok(Self {
            dir,
            files: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write one file into the area
    ///
    /// Files are prefixed with their position so two uploads sharing a name
    /// both survive and keep their order.
    pub async fn stage(&mut self, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.dir.path().join(format!("{:03}-{}", self.files.len(), name));
        tokio::fs::write(&path, bytes).await?;
        self.files.push(path.clone());
        Ok(path)
    }

    /// Staged files in upload order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}
