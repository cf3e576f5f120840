//! Document upload and index status endpoints

use axum::{
    extract::{ConnectInfo, Multipart, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{IndexStatus, IngestOptions};

/// Upload outcome
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
    pub num_chunks: usize,
    pub generation: u64,
    pub processing_time_ms: u64,
}

/// Fields collected from the multipart form
#[derive(Default)]
struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    api_key: Option<String>,
    options: IngestOptions,
}

/// POST /api/upload - Replace the indexed document
pub async fn upload_document(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    state.check_rate_limit(&headers, connect.map(|c| c.0))?;

    let form = read_form(multipart).await?;
    let (filename, data) = form
        .file
        .ok_or_else(|| Error::invalid("multipart field 'file' is required"))?;

    let api_key = form
        .api_key
        .or_else(|| {
            headers
                .get("x-api-key")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| Error::invalid("an API key is required (form field 'api_key' or X-Api-Key header)"))?;

    tracing::info!("Upload: {} ({} bytes)", filename, data.len());

    let report = state
        .engine()
        .ingest_with(&data, &filename, &api_key, form.options)
        .await?;

    Ok(Json(UploadResponse {
        filename: report.document.filename,
        num_chunks: report.num_chunks,
        generation: report.generation,
        processing_time_ms: report.processing_time_ms,
    }))
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::invalid(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "upload.txt".to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| Error::invalid(format!("Failed to read file: {}", e)))?;
                form.file = Some((filename, data.to_vec()));
            }
            "api_key" => form.api_key = Some(text_field(field).await?),
            "chunk_size" => form.options.chunk_size = Some(number_field(field, &name).await?),
            "chunk_overlap" => {
                form.options.chunk_overlap = Some(number_field(field, &name).await?)
            }
            other => tracing::debug!("Ignoring multipart field '{}'", other),
        }
    }

    Ok(form)
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map(|s| s.trim().to_string())
        .map_err(|e| Error::invalid(format!("Failed to read form field: {}", e)))
}

async fn number_field(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<usize> {
    let raw = text_field(field).await?;
    raw.parse()
        .map_err(|_| Error::invalid(format!("'{}' must be a non-negative integer, got '{}'", name, raw)))
}

/// GET /api/index - What is currently indexed
pub async fn index_status(State(state): State<AppState>) -> Json<IndexStatus> {
    Json(state.engine().index_status())
}
