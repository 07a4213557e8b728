//! PDF manipulation module

pub mod merge;
pub mod metadata;
pub mod create;
pub mod numbering;
pub mod build;

// Re-export commonly used items
pub use merge::{merge_pdfs, merge_with_padding, BlankTemplate, MergeOptions, MergeSummary, MergedDocument};
pub use metadata::{count_pages, extract_metadata, page_media_box, PdfMetadata};
pub use create::{create_blank_pdf, create_document, PageSpec};
pub use numbering::{add_page_numbers, stamp_page_numbers, NumberingOptions};
pub use build::{bind_pdfs, merged_filename, stage_binding, BindOptions, BindReport, StagedBinding};
