//! Fixtures shared by the integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use lopdf::{Document, ObjectId};
use pdf_binder::pdf::{create_document, BlankTemplate, PageSpec};
use tempfile::TempDir;

/// Pages labelled `<prefix>1..=<count>`, all US Letter
pub fn labelled_pages(prefix: &str, count: usize) -> Vec<PageSpec> {
    (1..=count)
        .map(|n| PageSpec::labelled(612.0, 792.0, format!("{}{}", prefix, n)))
        .collect()
}

/// Write a generated PDF into `dir` and return its path
pub fn write_pdf(dir: &TempDir, name: &str, pages: &[PageSpec]) -> PathBuf {
    let path = dir.path().join(name);
    create_document(pages).save(&path).expect("Failed to write fixture PDF");
    path
}

/// Serialized bytes of a generated PDF
pub fn pdf_bytes(pages: &[PageSpec]) -> Vec<u8> {
    let mut buffer = Vec::new();
    create_document(pages)
        .save_to(&mut buffer)
        .expect("Failed to serialize fixture PDF");
    buffer
}

/// A two-page template whose pages are labelled `T1` and `T2`
///
/// Only `T1` may ever show up in merged output.
pub fn labelled_template(dir: &TempDir) -> BlankTemplate {
    let path = write_pdf(dir, "template.pdf", &labelled_pages("T", 2));
    BlankTemplate::load(&path).expect("Failed to load template")
}

/// Decoded content of every page, in page order
pub fn page_texts(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .into_values()
        .map(|id| page_text(doc, id))
        .collect()
}

pub fn page_text(doc: &Document, page_id: ObjectId) -> String {
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap_or_default()).into_owned()
}

pub fn load(path: &Path) -> Document {
    Document::load(path).expect("Failed to load output PDF")
}
