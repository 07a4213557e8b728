//! PDF merging with blank-page padding using lopdf

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use lopdf::{Document, Object, ObjectId, Dictionary};
use tracing::debug;
use crate::error::{Error, Result};
use crate::pdf::metadata::inherited_attribute;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Options for merging PDFs
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Input PDF file paths in the order they should be merged
    pub input_paths: Vec<PathBuf>,
    /// Output PDF file path
    pub output_path: PathBuf,
}

/// The document whose first page is inserted after odd-length inputs
///
/// Loaded once and shared read-only; every padding insertion works on its own
/// copy, so the same page object never appears twice in a merged page tree.
#[derive(Debug, Clone)]
pub struct BlankTemplate {
    path: PathBuf,
    document: Document,
}

impl BlankTemplate {
    /// Load the template from disk, checking that it has a page to offer
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::BlankTemplate {
                path: path.to_path_buf(),
                reason: "file does not exist".to_string(),
            });
        }

        let document = Document::load(path).map_err(|e| Error::BlankTemplate {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_document(path, document)
    }

    /// Wrap an already loaded document; `path` is only used for reporting
    pub fn from_document(path: &Path, document: Document) -> Result<Self> {
        if document.get_pages().is_empty() {
            return Err(Error::BlankTemplate {
                path: path.to_path_buf(),
                reason: "template has no pages".to_string(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    /// Where the template was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Counts describing a finished merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    /// Number of source documents merged
    pub source_count: usize,
    /// Number of sources that were followed by a blank page
    pub padded_count: usize,
    /// Total pages in the merged document
    pub page_count: usize,
}

/// A merged document that has not been written anywhere yet
#[derive(Debug)]
pub struct MergedDocument {
    pub document: Document,
    pub summary: MergeSummary,
}

/// Merge PDFs in order, appending the template's first page after any
/// document with an odd page count
///
/// Any input that fails to load aborts the whole merge.
///
/// Based on the lopdf merge example:
/// https://github.com/J-F-Liu/lopdf/blob/main/examples/merge.rs
pub fn merge_with_padding(input_paths: &[PathBuf], blank: &BlankTemplate) -> Result<MergedDocument> {
    if input_paths.is_empty() {
        return Err(Error::NoInputs);
    }

    // Validate all input files exist
    for path in input_paths {
        if !path.exists() {
            return Err(Error::FileNotFound(path.clone()));
        }
    }

    let mut max_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();
    let mut version = String::from("1.5");
    let mut padded_count = 0;

    for path in input_paths {
        let doc = Document::load(path)?;

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(Error::EmptyPdf(path.clone()));
        }
        if doc.version > version {
            version = doc.version.clone();
        }

        let pages = absorb_document(doc, &mut max_id, &mut objects)?;
        page_ids.extend(pages);

        if page_count % 2 == 1 {
            let blank_pages = absorb_document(blank.document.clone(), &mut max_id, &mut objects)?;
            page_ids.extend(blank_pages.into_iter().take(1));
            padded_count += 1;
        }

        debug!(
            "Appended {} ({} pages{})",
            path.display(),
            page_count,
            if page_count % 2 == 1 { ", padded" } else { "" }
        );
    }

    let mut merged_doc = Document::with_version(version);

    // Add all collected objects FIRST
    merged_doc.objects.extend(objects);

    // Keep new ids clear of everything just added
    merged_doc.max_id = max_id - 1;

    let pages_id = merged_doc.new_object_id();

    let kids: Vec<Object> = page_ids
        .iter()
        .map(|&id| Object::Reference(id))
        .collect();

    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(page_ids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));

    let catalog_id = merged_doc.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    merged_doc.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged_doc.objects.insert(pages_id, Object::Dictionary(pages_object));
    merged_doc.trailer.set("Root", Object::Reference(catalog_id));

    // Re-parent every page under the new flat page tree
    for &page_id in &page_ids {
        if let Ok(Object::Dictionary(dict)) = merged_doc.get_object_mut(page_id) {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    // Old catalogs, old page-tree nodes and unused template pages
    merged_doc.prune_objects();

    Ok(MergedDocument {
        document: merged_doc,
        summary: MergeSummary {
            source_count: input_paths.len(),
            padded_count,
            page_count: page_ids.len(),
        },
    })
}

/// Merge PDFs with padding and write the result to `options.output_path`
///
/// # Example
///
/// ```no_run
/// use pdf_binder::pdf::{merge_pdfs, BlankTemplate, MergeOptions};
/// use std::path::{Path, PathBuf};
///
/// let blank = BlankTemplate::load(Path::new("Blank PDF Document.pdf")).expect("template");
/// let options = MergeOptions {
///     input_paths: vec![PathBuf::from("A.pdf"), PathBuf::from("B.pdf")],
///     output_path: PathBuf::from("merged.pdf"),
/// };
///
/// merge_pdfs(&options, &blank).expect("Failed to merge");
/// ```
pub fn merge_pdfs(options: &MergeOptions, blank: &BlankTemplate) -> Result<MergeSummary> {
    let MergedDocument { mut document, summary } = merge_with_padding(&options.input_paths, blank)?;

    document.compress();
    document.save(&options.output_path)?;

    Ok(summary)
}

/// Renumber a document past `max_id`, move its objects into `objects` and
/// return its page ids in page order
fn absorb_document(
    mut doc: Document,
    max_id: &mut u32,
    objects: &mut BTreeMap<ObjectId, Object>,
) -> Result<Vec<ObjectId>> {
    // Must happen while the original page tree is still intact
    inherit_page_attributes(&mut doc)?;

    doc.renumber_objects_with(*max_id);
    *max_id = doc.max_id + 1;

    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    objects.extend(doc.objects);

    Ok(pages)
}

/// Copy inherited attributes from ancestor `Pages` nodes onto each page
fn inherit_page_attributes(doc: &mut Document) -> Result<()> {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    for page_id in page_ids {
        let inherited: Vec<(&[u8], Object)> = {
            let page = doc.get_dictionary(page_id)?;
            INHERITABLE_ATTRIBUTES
                .iter()
                .filter(|key| !page.has(key))
                .filter_map(|key| inherited_attribute(doc, page, key).map(|value| (*key, value)))
                .collect()
        };

        if inherited.is_empty() {
            continue;
        }

        let page = doc.get_dictionary_mut(page_id)?;
        for (key, value) in inherited {
            page.set(key.to_vec(), value);
        }
    }

    Ok(())
}
