//! PDF metadata extraction

use std::path::Path;
use lopdf::{Dictionary, Document, Object, ObjectId};
use crate::error::{Error, Result};
use crate::layout::MediaBox;

/// Deepest page-tree nesting we follow when looking up inherited attributes
const MAX_TREE_DEPTH: usize = 64;

/// Count pages by reading the Count field from the Pages dictionary
/// This is more reliable than get_pages() which doesn't handle nested page trees
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    // Get the catalog (root)
    let catalog_ref = doc.trailer.get(b"Root")
        .map_err(|_| Error::General("No Root in trailer".to_string()))?;

    let catalog_id = match catalog_ref {
        Object::Reference(id) => *id,
        _ => return Err(Error::General("Root is not a reference".to_string())),
    };

    let catalog = doc.get_object(catalog_id)?;

    let catalog_dict = match catalog {
        Object::Dictionary(dict) => dict,
        _ => return Err(Error::General("Catalog is not a dictionary".to_string())),
    };

    // Get the Pages reference
    let pages_ref = catalog_dict.get(b"Pages")
        .map_err(|_| Error::General("No Pages in catalog".to_string()))?;

    let pages_id = match pages_ref {
        Object::Reference(id) => *id,
        _ => return Err(Error::General("Pages is not a reference".to_string())),
    };

    let pages_obj = doc.get_object(pages_id)?;

    let pages_dict = match pages_obj {
        Object::Dictionary(dict) => dict,
        _ => return Err(Error::General("Pages is not a dictionary".to_string())),
    };

    // Get the Count field
    let count = pages_dict.get(b"Count")
        .map_err(|_| Error::General("No Count in Pages".to_string()))?;

    match count {
        Object::Integer(n) => usize::try_from(*n)
            .map_err(|_| Error::General(format!("Count is negative: {}", n))),
        _ => Err(Error::General("Count is not an integer".to_string())),
    }
}

/// PDF metadata
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
    /// Effective mediabox of every page, in page order
    pub media_boxes: Vec<MediaBox>,
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;

    // Use catalog-based counting for accuracy
    let page_count = count_pages_from_catalog(&doc)?;

    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    let title = info_string(&doc, b"Title");
    let author = info_string(&doc, b"Author");

    let media_boxes = doc
        .get_pages()
        .into_values()
        .map(|page_id| page_media_box(&doc, page_id))
        .collect::<Result<Vec<_>>>()?;

    Ok(PdfMetadata {
        page_count,
        title,
        author,
        media_boxes,
    })
}

/// Read a UTF-8 text entry from the document's Info dictionary
fn info_string(doc: &Document, key: &[u8]) -> Option<String> {
    let info_id = doc.trailer.get(b"Info").and_then(Object::as_reference).ok()?;
    let info = doc.get_dictionary(info_id).ok()?;
    let bytes = info.get(key).and_then(Object::as_str).ok()?;
    String::from_utf8(bytes.to_vec()).ok()
}

/// Count the number of pages in a PDF file
///
/// This is a quick operation that reads the Count field from the Pages dictionary.
pub fn count_pages(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    let page_count = count_pages_from_catalog(&doc)?;

    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    Ok(page_count)
}

/// Look up a possibly inherited page attribute
///
/// Page-tree attributes such as `MediaBox` and `Resources` may live on any
/// ancestor `Pages` node. The page's own entry wins, then the nearest ancestor.
pub fn inherited_attribute(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    if let Ok(value) = page.get(key) {
        return Some(value.clone());
    }

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(parent_id) = parent {
        if depth >= MAX_TREE_DEPTH {
            break;
        }
        let node = doc.get_dictionary(parent_id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    None
}

/// Effective mediabox of a page
///
/// Follows inheritance and indirect references. Pages that declare no usable
/// mediabox anywhere are treated as US Letter.
pub fn page_media_box(doc: &Document, page_id: ObjectId) -> Result<MediaBox> {
    let page = doc.get_dictionary(page_id)?;

    let media_box = inherited_attribute(doc, page, b"MediaBox")
        .and_then(|object| match object {
            Object::Reference(id) => doc.get_object(id).ok().cloned(),
            other => Some(other),
        })
        .and_then(|object| MediaBox::from_object(&object));

    Ok(media_box.unwrap_or_else(MediaBox::letter))
}
