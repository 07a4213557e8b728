//! PDF creation: blank-page templates and simple labelled documents

use std::path::Path;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use crate::error::Result;
use crate::layout::{MediaBox, PageSize};

/// Description of one page of a generated document
#[derive(Debug, Clone)]
pub struct PageSpec {
    /// Page size and origin
    pub media_box: MediaBox,
    /// Text drawn near the top-left corner; `None` leaves the page without content
    pub label: Option<String>,
}

impl PageSpec {
    /// An empty page of the given size
    pub fn blank(size: PageSize) -> Self {
        Self { media_box: size.media_box(), label: None }
    }

    /// A page of arbitrary size carrying a text label
    pub fn labelled(width: f32, height: f32, label: impl Into<String>) -> Self {
        Self {
            media_box: MediaBox::new(width, height),
            label: Some(label.into()),
        }
    }
}

/// Build an in-memory document with one page per spec
///
/// Labelled pages share a single Helvetica font resource. Blank pages carry no
/// `Contents` entry at all, matching what most "blank page" templates look like.
pub fn create_document(pages: &[PageSpec]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    let font_id = doc.add_object(Object::Dictionary(font));

    let kids: Vec<Object> = pages
        .iter()
        .map(|spec| Object::Reference(add_page(&mut doc, pages_id, font_id, spec)))
        .collect();

    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(kids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages_object));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    doc
}

fn add_page(doc: &mut Document, pages_id: ObjectId, font_id: ObjectId, spec: &PageSpec) -> ObjectId {
    let mut page = Dictionary::new();
    page.set("Type", Object::Name(b"Page".to_vec()));
    page.set("Parent", Object::Reference(pages_id));
    page.set("MediaBox", spec.media_box.to_object());

    if let Some(ref label) = spec.label {
        let top = spec.media_box.lly + spec.media_box.height() - 72.0;
        let left = spec.media_box.llx + 72.0;
        let content = format!(
            "BT\n/F1 18 Tf\n1 0 0 1 {} {} Tm\n{} Tj\nET\n",
            left,
            top,
            literal_string(label),
        );
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        page.set("Contents", Object::Reference(content_id));

        let mut fonts = Dictionary::new();
        fonts.set("F1", Object::Reference(font_id));
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));
        page.set("Resources", Object::Dictionary(resources));
    } else {
        page.set("Resources", Object::Dictionary(Dictionary::new()));
    }

    doc.add_object(Object::Dictionary(page))
}

/// Wrap text in a PDF literal string, escaping the special characters
fn literal_string(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
        .replace('\r', "\\r")
        .replace('\n', "\\n");
    format!("({})", escaped)
}

/// Write a blank PDF with `page_count` pages of the given size
///
/// Used to provision the padding template when none is configured on disk.
pub fn create_blank_pdf(output: &Path, size: PageSize, page_count: usize) -> Result<()> {
    let pages = vec![PageSpec::blank(size); page_count.max(1)];
    let mut doc = create_document(&pages);
    doc.compress();
    doc.save(output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_document_page_count() {
        let doc = create_document(&[
            PageSpec::labelled(612.0, 792.0, "A1"),
            PageSpec::blank(PageSize::A4),
            PageSpec::labelled(400.0, 600.0, "A3"),
        ]);
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_labelled_page_has_text() {
        let doc = create_document(&[PageSpec::labelled(612.0, 792.0, "Chapter (1)")]);
        let page_id = *doc.get_pages().get(&1).unwrap();
        let content = String::from_utf8(doc.get_page_content(page_id).unwrap()).unwrap();
        assert!(content.contains("Chapter \\(1\\)"), "content was: {}", content);
    }

    #[test]
    fn test_blank_page_has_no_contents() {
        let doc = create_document(&[PageSpec::blank(PageSize::Letter)]);
        let page_id = *doc.get_pages().get(&1).unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        assert!(!page.has(b"Contents"));
    }

    #[test]
    fn test_create_blank_pdf_roundtrips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blank.pdf");
        create_blank_pdf(&path, PageSize::Letter, 1).unwrap();

        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_create_blank_pdf_never_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blank.pdf");
        create_blank_pdf(&path, PageSize::A4, 0).unwrap();

        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
