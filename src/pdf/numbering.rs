//! Page number stamping written directly into page content streams
//!
//! Each page gets its number drawn in the bottom-right corner of its own
//! mediabox. The original content is bracketed by `q`/`Q` so whatever
//! transformations it leaves active cannot displace the number, and the number
//! stream is appended last so it paints on top.

use std::path::Path;
use lopdf::{Document, Object, ObjectId, Dictionary, Stream};
use tracing::debug;
use crate::error::Result;
use crate::layout::number_position;
use crate::pdf::metadata::{inherited_attribute, page_media_box};

/// Resource name for the number font; chosen so it won't collide with `/F1`-style names
const NUMBER_FONT_RESOURCE: &str = "PgNumFont";

/// Options for stamping page numbers
#[derive(Debug, Clone)]
pub struct NumberingOptions {
    /// One of the 14 standard PDF fonts, so nothing has to be embedded
    pub font: String,
    /// Font size in points
    pub font_size: f32,
    /// Distance of the text origin from the mediabox's right edge
    pub right_offset: f32,
    /// Distance of the text baseline from the mediabox's bottom edge
    pub bottom_offset: f32,
}

impl Default for NumberingOptions {
    fn default() -> Self {
        Self {
            font: "Helvetica".to_string(),
            font_size: 10.0,
            right_offset: 50.0,
            bottom_offset: 30.0,
        }
    }
}

/// Stamp page numbers onto a PDF file and write the result to `output_path`
///
/// # Example
///
/// ```no_run
/// use pdf_binder::pdf::{add_page_numbers, NumberingOptions};
/// use std::path::Path;
///
/// add_page_numbers(
///     Path::new("merged.pdf"),
///     Path::new("numbered.pdf"),
///     &NumberingOptions::default(),
/// ).expect("Failed to add page numbers");
/// ```
pub fn add_page_numbers(
    input_path: &Path,
    output_path: &Path,
    options: &NumberingOptions,
) -> Result<usize> {
    let mut doc = Document::load(input_path)?;

    let page_count = stamp_page_numbers(&mut doc, options)?;

    doc.compress();
    doc.save(output_path)?;

    Ok(page_count)
}

/// Stamp page numbers onto an already loaded document
///
/// Returns the number of pages stamped.
pub fn stamp_page_numbers(doc: &mut Document, options: &NumberingOptions) -> Result<usize> {
    let font_id = use_standard_font(doc, &options.font);

    // Collect page ids first (to avoid borrow issues)
    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

    for (index, page_id) in pages.iter().enumerate() {
        let page_number = index + 1;

        let media_box = page_media_box(doc, *page_id)?;
        let (x, y) = number_position(&media_box, options.right_offset, options.bottom_offset);

        add_font_to_page_resources(doc, *page_id, font_id)?;
        isolate_page_content(doc, *page_id)?;

        let content = generate_number_content(page_number, x, y, options.font_size);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        append_content_to_page(doc, *page_id, content_id)?;

        debug!("Stamped page {} at ({}, {})", page_number, x, y);
    }

    Ok(pages.len())
}

/// Register a standard Type1 font (no embedding needed)
fn use_standard_font(doc: &mut Document, base_font: &str) -> ObjectId {
    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(base_font.as_bytes().to_vec()));
    font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));

    doc.add_object(Object::Dictionary(font))
}

/// Content stream operators that draw one page number
fn generate_number_content(page_number: usize, x: f32, y: f32, font_size: f32) -> String {
    let mut content = String::new();
    content.push_str("q\n");
    content.push_str("0 g\n"); // black fill
    content.push_str("BT\n");
    content.push_str(&format!("/{} {} Tf\n", NUMBER_FONT_RESOURCE, font_size));
    content.push_str(&format!("1 0 0 1 {} {} Tm\n", x, y));
    content.push_str(&format!("({}) Tj\n", page_number));
    content.push_str("ET\n");
    content.push_str("Q\n");
    content
}

/// Resolve an object that may be an indirect reference to a dictionary
fn resolve_dictionary(doc: &Document, object: &Object) -> Dictionary {
    match object {
        Object::Dictionary(dict) => dict.clone(),
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        },
        _ => Dictionary::new(),
    }
}

/// Add the number font to the page's own Resources dictionary
///
/// Resources shared through a reference are copied onto the page rather than
/// modified in place.
fn add_font_to_page_resources(doc: &mut Document, page_id: ObjectId, font_id: ObjectId) -> Result<()> {
    let mut resources = {
        let page_dict = doc.get_dictionary(page_id)?;
        match page_dict.get(b"Resources") {
            Ok(res) => resolve_dictionary(doc, res),
            Err(_) => inherited_attribute(doc, page_dict, b"Resources")
                .map(|res| resolve_dictionary(doc, &res))
                .unwrap_or_default(),
        }
    };

    let mut fonts = match resources.get(b"Font") {
        Ok(font_res) => resolve_dictionary(doc, font_res),
        Err(_) => Dictionary::new(),
    };
    fonts.set(NUMBER_FONT_RESOURCE, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    let page_dict = doc.get_dictionary_mut(page_id)?;
    page_dict.set("Resources", Object::Dictionary(resources));

    Ok(())
}

/// Bracket the page's existing content with `q` ... `Q`
///
/// Pages without content are left alone.
fn isolate_page_content(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    if content_references(doc, page_id)?.is_empty() {
        return Ok(());
    }

    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let restore_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));

    prepend_content_to_page(doc, page_id, save_id)?;
    append_content_to_page(doc, page_id, restore_id)?;

    Ok(())
}

/// The page's content stream references, with an indirect array flattened
fn content_references(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let page_dict = doc.get_dictionary(page_id)?;
    let refs = match page_dict.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(arr)) => arr.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(arr)) => arr.clone(),
        _ => Vec::new(),
    };
    Ok(refs)
}

/// Prepend a content stream to a page's Contents
fn prepend_content_to_page(doc: &mut Document, page_id: ObjectId, new_content_id: ObjectId) -> Result<()> {
    let mut contents = content_references(doc, page_id)?;
    contents.insert(0, Object::Reference(new_content_id));

    let page_dict = doc.get_dictionary_mut(page_id)?;
    page_dict.set("Contents", Object::Array(contents));

    Ok(())
}

/// Append a content stream to a page's Contents
///
/// Appended content is drawn after the original, i.e. on top of it.
fn append_content_to_page(doc: &mut Document, page_id: ObjectId, new_content_id: ObjectId) -> Result<()> {
    let mut contents = content_references(doc, page_id)?;
    contents.push(Object::Reference(new_content_id));

    let page_dict = doc.get_dictionary_mut(page_id)?;
    page_dict.set("Contents", Object::Array(contents));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageSize;
    use crate::pdf::create::{create_document, PageSpec};
    use tempfile::TempDir;

    fn page_text(doc: &Document, page_number: u32) -> String {
        let page_id = *doc.get_pages().get(&page_number).unwrap();
        String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
    }

    #[test]
    fn test_generate_number_content() {
        let content = generate_number_content(7, 562.0, 30.0, 10.0);
        assert!(content.contains("/PgNumFont 10 Tf"));
        assert!(content.contains("1 0 0 1 562 30 Tm"));
        assert!(content.contains("(7) Tj"));
    }

    #[test]
    fn test_numbers_follow_page_order() {
        let mut doc = create_document(&[
            PageSpec::labelled(612.0, 792.0, "first"),
            PageSpec::labelled(612.0, 792.0, "second"),
            PageSpec::labelled(612.0, 792.0, "third"),
        ]);

        let stamped = stamp_page_numbers(&mut doc, &NumberingOptions::default()).unwrap();
        assert_eq!(stamped, 3);

        for n in 1..=3u32 {
            let text = page_text(&doc, n);
            assert!(text.contains(&format!("({}) Tj", n)), "page {} content: {}", n, text);
        }
    }

    #[test]
    fn test_number_position_per_page_size() {
        let mut doc = create_document(&[
            PageSpec::labelled(612.0, 792.0, "letter"),
            PageSpec::labelled(400.0, 600.0, "small"),
        ]);

        stamp_page_numbers(&mut doc, &NumberingOptions::default()).unwrap();

        assert!(page_text(&doc, 1).contains("1 0 0 1 562 30 Tm"));
        assert!(page_text(&doc, 2).contains("1 0 0 1 350 30 Tm"));
    }

    #[test]
    fn test_original_content_is_isolated_and_kept_underneath() {
        let mut doc = create_document(&[PageSpec::labelled(612.0, 792.0, "body")]);

        stamp_page_numbers(&mut doc, &NumberingOptions::default()).unwrap();

        let text = page_text(&doc, 1);
        let body = text.find("(body) Tj").unwrap();
        let number = text.find("(1) Tj").unwrap();
        assert!(text.trim_start().starts_with('q'));
        assert!(body < number, "number must be drawn after the original content");
    }

    #[test]
    fn test_blank_page_gets_number() {
        let mut doc = create_document(&[PageSpec::blank(PageSize::Letter)]);

        stamp_page_numbers(&mut doc, &NumberingOptions::default()).unwrap();

        assert!(page_text(&doc, 1).contains("(1) Tj"));
    }

    #[test]
    fn test_existing_fonts_are_preserved() {
        let mut doc = create_document(&[PageSpec::labelled(612.0, 792.0, "body")]);

        stamp_page_numbers(&mut doc, &NumberingOptions::default()).unwrap();

        let page_id = *doc.get_pages().get(&1).unwrap();
        let resources = doc.get_dictionary(page_id).unwrap().get(b"Resources").unwrap();
        let fonts = resolve_dictionary(&doc, resources);
        let fonts = resolve_dictionary(&doc, fonts.get(b"Font").unwrap());
        assert!(fonts.has(b"F1"));
        assert!(fonts.has(NUMBER_FONT_RESOURCE.as_bytes()));
    }

    #[test]
    fn test_shared_resource_reference_is_resolved() {
        let mut doc = create_document(&[PageSpec::labelled(612.0, 792.0, "body")]);
        let page_id = *doc.get_pages().get(&1).unwrap();

        // Move the page's resources behind an indirect reference
        let resources = doc.get_dictionary(page_id).unwrap().get(b"Resources").unwrap().clone();
        let resources_id = doc.add_object(resources);
        doc.get_dictionary_mut(page_id).unwrap().set("Resources", Object::Reference(resources_id));

        stamp_page_numbers(&mut doc, &NumberingOptions::default()).unwrap();

        let page = doc.get_dictionary(page_id).unwrap();
        let Ok(Object::Dictionary(resources)) = page.get(b"Resources") else {
            panic!("resources should be inlined on the page");
        };
        let Ok(Object::Dictionary(fonts)) = resources.get(b"Font") else {
            panic!("font dictionary missing");
        };
        assert!(fonts.has(b"F1"));
        assert!(fonts.has(NUMBER_FONT_RESOURCE.as_bytes()));
    }

    #[test]
    fn test_inherited_resources_are_kept() {
        let mut doc = create_document(&[PageSpec::labelled(612.0, 792.0, "body")]);
        let page_id = *doc.get_pages().get(&1).unwrap();
        let parent_id = doc.get_dictionary(page_id).unwrap().get(b"Parent").unwrap().as_reference().unwrap();

        let resources = doc.get_dictionary_mut(page_id).unwrap().remove(b"Resources").unwrap();
        doc.get_dictionary_mut(parent_id).unwrap().set("Resources", resources);

        stamp_page_numbers(&mut doc, &NumberingOptions::default()).unwrap();

        let page = doc.get_dictionary(page_id).unwrap();
        let resources = resolve_dictionary(&doc, page.get(b"Resources").unwrap());
        let fonts = resolve_dictionary(&doc, resources.get(b"Font").unwrap());
        assert!(fonts.has(b"F1"));
        assert!(fonts.has(NUMBER_FONT_RESOURCE.as_bytes()));
    }

    #[test]
    fn test_indirect_contents_array_is_flattened() {
        let mut doc = create_document(&[PageSpec::labelled(612.0, 792.0, "body")]);
        let page_id = *doc.get_pages().get(&1).unwrap();
        let contents = doc.get_dictionary(page_id).unwrap().get(b"Contents").unwrap().clone();
        let array_id = doc.add_object(Object::Array(vec![contents]));
        doc.get_dictionary_mut(page_id).unwrap().set("Contents", Object::Reference(array_id));

        stamp_page_numbers(&mut doc, &NumberingOptions::default()).unwrap();

        let Ok(Object::Array(refs)) = doc.get_dictionary(page_id).unwrap().get(b"Contents") else {
            panic!("contents should be a direct array");
        };
        assert_eq!(refs.len(), 4);
        assert!(page_text(&doc, 1).contains("(body) Tj"));
    }

    #[test]
    fn test_add_page_numbers_file_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("input.pdf");
        let output = temp_dir.path().join("output.pdf");
        create_document(&[
            PageSpec::labelled(612.0, 792.0, "1"),
            PageSpec::labelled(612.0, 792.0, "2"),
        ]).save(&input).unwrap();

        let stamped = add_page_numbers(&input, &output, &NumberingOptions::default()).unwrap();
        assert_eq!(stamped, 2);

        let mut doc = Document::load(&output).unwrap();
        doc.decompress();
        assert_eq!(doc.get_pages().len(), 2);
        assert!(page_text(&doc, 2).contains("(2) Tj"));
    }
}
