//! Route handlers

use std::path::PathBuf;
use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::pdf::{merged_filename, stage_binding, BindOptions, NumberingOptions};
use super::error::ApiError;
use super::jobs::JobRecord;
use super::staging::{is_pdf_name, secure_filename, StagingArea};
use super::AppState;

/// Multipart field carrying the uploaded files
pub const FILES_FIELD: &str = "files[]";

/// Output name assumed when `/download` is called without one
pub const DEFAULT_DOWNLOAD_NAME: &str = "merged_output.pdf";

const INDEX_HTML: &str = include_str!("../../assets/index.html");

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub download_url: String,
    pub filename: String,
    pub job_id: Uuid,
    pub page_count: usize,
}

#[derive(Deserialize, Debug)]
pub struct DownloadQuery {
    pub filename: Option<String>,
}

/// One `files[]` part as received
struct UploadedFile {
    name: Option<String>,
    bytes: Bytes,
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!("Upload is not a usable multipart body: {}", rejection.body_text());
        ApiError::Validation("No files provided".to_string())
    })?;

    let mut uploads = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;
        uploads.push(UploadedFile { name, bytes });
    }

    let first = uploads
        .first()
        .ok_or_else(|| ApiError::Validation("No files provided".to_string()))?;
    if first.name.as_deref().map_or(true, str::is_empty) {
        return Err(ApiError::Validation("No files selected".to_string()));
    }

    let mut staging = StagingArea::create_in(&state.config.upload_dir)?;
    let mut source_files = Vec::new();
    for upload in &uploads {
        let Some(name) = upload.name.as_deref() else {
            continue;
        };
        if !is_pdf_name(name) {
            debug!("Skipping non-PDF upload {:?}", name);
            continue;
        }
        let safe = secure_filename(name);
        if safe.is_empty() {
            warn!("Skipping upload with unusable name {:?}", name);
            continue;
        }
        staging.stage(&safe, &upload.bytes).await?;
        source_files.push(safe);
    }

    if source_files.is_empty() {
        return Err(ApiError::Validation("No valid PDF files".to_string()));
    }

    let output_filename = merged_filename(&source_files[0]);
    let options = BindOptions {
        input_paths: staging.files().to_vec(),
        work_dir: staging.path().to_path_buf(),
        output_dir: state.config.output_dir.clone(),
        output_filename: output_filename.clone(),
        numbering: NumberingOptions::default(),
    };

    info!(
        "Binding {} uploaded PDFs into {}",
        source_files.len(),
        output_filename
    );

    let blank = Arc::clone(&state.blank);
    let staged = tokio::task::spawn_blocking(move || stage_binding(&options, &blank)).await??;

    // Staging directory goes away here
    drop(staging);

    let job = JobRecord::new(output_filename.clone(), source_files, &staged.summary);
    let response = UploadResponse {
        success: true,
        message: format!("Successfully merged {} PDFs", job.source_files.len()),
        download_url: format!("/download?filename={}", output_filename),
        filename: output_filename,
        job_id: job.id,
        page_count: job.page_count,
    };
    let output_path = state.config.output_dir.join(&response.filename);
    state.jobs.publish(staged, &output_path, job).await?;

    Ok(Json(response))
}

pub async fn download(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let filename = query
        .filename
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_NAME.to_string());
    let not_found = || ApiError::NotFound("No file available".to_string());

    if filename.is_empty() || secure_filename(&filename) != filename {
        return Err(not_found());
    }
    if state.jobs.latest_for(&filename).await.is_none() {
        return Err(not_found());
    }

    let path: PathBuf = state.config.output_dir.join(&filename);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

pub async fn job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobRecord>, ApiError> {
    state
        .jobs
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No job with id {}", id)))
}
