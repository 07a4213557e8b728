//! PDF Binder CLI tool
//!
//! Runs the merge web service, or the same merge pipeline from the command line.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::Context;
use clap::{Parser, Subcommand};
use glob::glob;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pdf_binder::layout::PageSize;
use pdf_binder::pdf::{
    bind_pdfs, create_blank_pdf, extract_metadata, merge_pdfs, merged_filename,
    BindOptions, BlankTemplate, MergeOptions, NumberingOptions,
};
use pdf_binder::server::{router, AppState, ServerConfig};
use pdf_binder::Error;

/// PDF Binder - Merge PDFs with blank-page padding and page numbers
#[derive(Parser)]
#[command(name = "pdf-binder")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Start the web service on port 5010
    pdf-binder serve

    # Merge chapters, padding odd ones, and number the pages
    pdf-binder merge -o book.pdf \"chapter-*.pdf\"

    # Create a blank padding template
    pdf-binder blank -o \"Blank PDF Document.pdf\" --size a4")]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP upload/merge service
    Serve {
        #[command(flatten)]
        config: ServerConfig,
    },

    /// Merge PDF files into one, padding odd-length inputs
    Merge {
        /// Input PDF files (in order). Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output PDF file path (defaults to <first input>-merged.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// PDF whose first page is used as padding
        #[arg(long, default_value = "Blank PDF Document.pdf")]
        blank: PathBuf,

        /// Skip page numbering
        #[arg(long)]
        no_numbers: bool,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },

    /// Write a blank PDF usable as the padding template
    Blank {
        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Page size
        #[arg(long, value_enum, default_value_t = PageSize::Letter)]
        size: PageSize,

        /// Number of pages
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("pdf_binder={},tower_http={}", default_level, default_level))),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { config } => cmd_serve(config).await,
        Commands::Merge { inputs, output, blank, no_numbers } => {
            cmd_merge(inputs, output, &blank, no_numbers)
        }
        Commands::Info { input } => cmd_info(&input),
        Commands::Blank { output, size, pages } => cmd_blank(&output, size, pages),
    }
}

/// Expand glob patterns in input paths
fn expand_globs(patterns: Vec<String>) -> pdf_binder::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        // Check if pattern contains glob characters
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let entries = glob(&pattern).map_err(|e| Error::InvalidGlob(format!("{}: {}", pattern, e)))?;
            let mut matched = false;
            for entry in entries {
                match entry {
                    Ok(path) => {
                        paths.push(path);
                        matched = true;
                    }
                    Err(e) => warn!("glob error for {}: {}", pattern, e),
                }
            }
            if !matched {
                return Err(Error::NoFilesMatched(pattern));
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }

    // Sort paths for consistent ordering
    paths.sort();

    Ok(paths)
}

async fn cmd_serve(config: ServerConfig) -> anyhow::Result<()> {
    let address = config.bind_address();
    let state = AppState::new(config).context("Failed to prepare service state")?;
    info!(
        "Serving uploads from {} into {}",
        state.config.upload_dir.display(),
        state.config.output_dir.display()
    );

    let app = router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down gracefully..."),
        () = terminate => info!("Received SIGTERM, shutting down gracefully..."),
    }
}

/// Merge (and by default number) PDFs from the command line
fn cmd_merge(inputs: Vec<String>, output: Option<PathBuf>, blank: &Path, no_numbers: bool) -> anyhow::Result<()> {
    let inputs = expand_globs(inputs)?;
    let blank = BlankTemplate::load(blank)?;

    let output = match output {
        Some(path) => path,
        None => {
            let first = inputs[0].file_name().and_then(|n| n.to_str()).unwrap_or_default();
            PathBuf::from(merged_filename(first))
        }
    };

    if no_numbers {
        let options = MergeOptions {
            input_paths: inputs,
            output_path: output.clone(),
        };
        let summary = merge_pdfs(&options, &blank)?;
        eprintln!("Merged {} files into {} pages ({} padded)", summary.source_count, summary.page_count, summary.padded_count);
        eprintln!("Output: {}", output.display());
        return Ok(());
    }

    let output_dir = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let output_filename = output
        .file_name()
        .and_then(|n| n.to_str())
        .context("Output path has no file name")?
        .to_string();

    let work_dir = tempfile::tempdir()?;
    let options = BindOptions {
        input_paths: inputs,
        work_dir: work_dir.path().to_path_buf(),
        output_dir,
        output_filename,
        numbering: NumberingOptions::default(),
    };

    let report = bind_pdfs(&options, &blank)?;
    eprintln!(
        "Merged {} files into {} pages ({} padded)",
        report.summary.source_count, report.summary.page_count, report.summary.padded_count
    );
    eprintln!("Output: {}", report.output_path.display());

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: &Path) -> anyhow::Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let metadata = extract_metadata(input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);
    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }
    for (index, media_box) in metadata.media_boxes.iter().enumerate() {
        println!("  Page {}: {} x {} pt", index + 1, media_box.width(), media_box.height());
    }

    Ok(())
}

/// Create a blank PDF
fn cmd_blank(output: &Path, size: PageSize, pages: usize) -> anyhow::Result<()> {
    create_blank_pdf(output, size, pages)?;
    eprintln!("Wrote {} blank {:?} page(s) to {}", pages.max(1), size, output.display());
    Ok(())
}
