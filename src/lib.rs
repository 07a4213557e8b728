//! PDF Binder Library
//!
//! Merges batches of PDF files into a single print-ready document.
//! This library provides functionality to:
//! - Merge PDFs, padding every odd-length input with a blank page so each
//!   source starts on a fresh sheet when printed double-sided
//! - Stamp sequential page numbers in the bottom-right corner of every page
//! - Extract metadata (page counts, page sizes)
//! - Serve the whole pipeline over HTTP
//!
//! # Example
//!
//! ```no_run
//! use pdf_binder::pdf::{bind_pdfs, BindOptions, BlankTemplate, NumberingOptions};
//! use std::path::{Path, PathBuf};
//!
//! let blank = BlankTemplate::load(Path::new("Blank PDF Document.pdf")).expect("No template");
//! let options = BindOptions {
//!     input_paths: vec![PathBuf::from("A.pdf"), PathBuf::from("B.pdf")],
//!     work_dir: std::env::temp_dir(),
//!     output_dir: PathBuf::from("output"),
//!     output_filename: "A-merged.pdf".to_string(),
//!     numbering: NumberingOptions::default(),
//! };
//!
//! let report = bind_pdfs(&options, &blank).expect("Failed to bind PDFs");
//! println!("{} pages", report.summary.page_count);
//! ```

pub mod error;
pub mod layout;
pub mod pdf;
pub mod server;

// Re-export commonly used items
pub use error::{Error, Result};
