//! HTTP service: upload a batch of PDFs, get back one numbered document

pub mod config;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod staging;

use std::sync::Arc;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use crate::error::Result;
use crate::layout::PageSize;
use crate::pdf::{create_blank_pdf, BlankTemplate};

pub use config::ServerConfig;
pub use error::ApiError;
pub use jobs::{JobRecord, JobRegistry};

/// State shared by all requests
pub struct AppState {
    pub config: ServerConfig,
    pub blank: Arc<BlankTemplate>,
    pub jobs: JobRegistry,
}

impl AppState {
    /// Prepare directories and load the blank template
    ///
    /// Leftover staging directories from an earlier run are removed. A missing
    /// blank template is generated as a single Letter page.
    pub fn new(config: ServerConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.upload_dir)?;
        std::fs::create_dir_all(&config.output_dir)?;

        let cleared = staging::clear_directory(&config.upload_dir)?;
        if cleared > 0 {
            info!("Removed {} stale entries from {}", cleared, config.upload_dir.display());
        }

        if !config.blank_template.exists() {
            warn!(
                "Blank template {} not found, generating a Letter-size blank page",
                config.blank_template.display()
            );
            create_blank_pdf(&config.blank_template, PageSize::Letter, 1)?;
        }
        let blank = BlankTemplate::load(&config.blank_template)?;

        Ok(Self {
            config,
            blank: Arc::new(blank),
            jobs: JobRegistry::new(),
        })
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/upload", post(handlers::upload))
        .route("/download", get(handlers::download))
        .route("/jobs/:id", get(handlers::job))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
