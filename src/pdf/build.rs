//! The full pipeline: merge with padding, then stamp page numbers
//!
//! The merged document goes to an intermediate file in a scratch directory,
//! the numbering step reads it back, and only the numbered result lands in the
//! output directory. The result is written under a temporary name first and
//! renamed into place, so readers never observe a half-written file. Callers
//! that must pair the rename with other bookkeeping use [`stage_binding`] and
//! persist the [`StagedBinding`] themselves.

use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use crate::error::{Error, Result};
use crate::pdf::merge::{merge_with_padding, BlankTemplate, MergeSummary, MergedDocument};
use crate::pdf::numbering::{add_page_numbers, NumberingOptions};

/// Name of the intermediate merged file inside the scratch directory
pub const TEMP_MERGED_NAME: &str = "temp_merged.pdf";

/// Suffix appended to the first input's base name to form the output name
pub const MERGED_SUFFIX: &str = "-merged.pdf";

/// Options for one merge-and-number run
#[derive(Debug, Clone)]
pub struct BindOptions {
    /// Input PDF file paths in the order they should be merged
    pub input_paths: Vec<PathBuf>,
    /// Scratch directory for the intermediate merged file
    pub work_dir: PathBuf,
    /// Directory the numbered result is written to
    pub output_dir: PathBuf,
    /// File name of the numbered result inside `output_dir`
    pub output_filename: String,
    /// Page number appearance
    pub numbering: NumberingOptions,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindReport {
    /// Where the numbered document was written
    pub output_path: PathBuf,
    /// Counts from the merge step
    pub summary: MergeSummary,
}

/// Output file name derived from the first input's name
///
/// `A.pdf` becomes `A-merged.pdf`. Names without a usable stem fall back to
/// `merged-merged.pdf` rather than producing a hidden file.
pub fn merged_filename(first_input: &str) -> String {
    let stem = Path::new(first_input)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("merged");
    format!("{}{}", stem, MERGED_SUFFIX)
}

/// A numbered document sitting under a temporary name in the output directory
///
/// Dropping it without calling [`StagedBinding::persist`] removes the file.
#[derive(Debug)]
pub struct StagedBinding {
    pub file: NamedTempFile,
    pub summary: MergeSummary,
}

impl StagedBinding {
    /// Rename the staged file to `output_path`, replacing whatever was there
    pub fn persist(self, output_path: &Path) -> Result<MergeSummary> {
        self.file
            .persist(output_path)
            .map_err(|e| Error::Io(e.error))?;
        info!("Output: {}", output_path.display());
        Ok(self.summary)
    }
}

/// Merge, pad and number the inputs into a staged file in the output directory
///
/// Nothing becomes visible under `options.output_filename` until the caller
/// persists the result.
pub fn stage_binding(options: &BindOptions, blank: &BlankTemplate) -> Result<StagedBinding> {
    info!("Merging {} PDF files...", options.input_paths.len());

    let MergedDocument { mut document, summary } = merge_with_padding(&options.input_paths, blank)?;

    let temp_merged = options.work_dir.join(TEMP_MERGED_NAME);
    document.compress();
    document.save(&temp_merged)?;
    debug!(
        "Wrote intermediate {} ({} pages, {} padded)",
        temp_merged.display(),
        summary.page_count,
        summary.padded_count
    );

    let file = tempfile::Builder::new()
        .prefix(".binding-")
        .suffix(".pdf")
        .tempfile_in(&options.output_dir)?;

    info!("Adding page numbers...");
    add_page_numbers(&temp_merged, file.path(), &options.numbering)?;

    // Clean up temp file
    std::fs::remove_file(&temp_merged)?;

    Ok(StagedBinding { file, summary })
}

/// Merge, pad and number the inputs, then move the result into place
///
/// Nothing is left in the output directory when any step fails.
pub fn bind_pdfs(options: &BindOptions, blank: &BlankTemplate) -> Result<BindReport> {
    let output_path = options.output_dir.join(&options.output_filename);
    let summary = stage_binding(options, blank)?.persist(&output_path)?;

    Ok(BindReport { output_path, summary })
}
