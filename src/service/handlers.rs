//! Request handlers.

use super::error::ApiError;
use super::AppState;
use crate::fill::Replacements;
use crate::pptx::PRESENTATION_MIME_TYPE;
use crate::store::has_template_extension;
use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

const UPLOAD_FORM: &str = include_str!("form.html");

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub message: String,
    pub filename: String,
    /// Base64-encoded `.pptx`
    pub data: String,
    pub mimetype: String,
}

/// `GET /`
pub async fn index() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

/// `POST /upload`: store the `file` field as the template.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let no_file = || ApiError::InvalidRequest("No file part in the request".to_string());
    let mut multipart = multipart.map_err(|_| no_file())?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        // Fields without a filename are form values, not files
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
        upload = Some((file_name, data));
        break;
    }

    let (file_name, data) = upload.ok_or_else(no_file)?;
    if file_name.is_empty() {
        return Err(ApiError::InvalidRequest("No file selected".to_string()));
    }
    if !has_template_extension(&file_name) {
        return Err(ApiError::InvalidFileType);
    }

    let store = state.store.clone();
    tokio::task::spawn_blocking(move || store.write(&data))
        .await
        .map_err(|e| ApiError::Storage(e.to_string()))?
        .map_err(|e| ApiError::Storage(e.to_string()))?;

    tracing::info!(upload = %file_name, stored = state.store.file_name(), "template uploaded");
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "File uploaded successfully. Ready for processing.".to_string(),
            filename: state.store.file_name().to_string(),
        }),
    ))
}

/// `POST /process`: fill the stored template with the JSON body.
pub async fn process(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let invalid_body = || ApiError::InvalidRequest("Invalid or missing JSON body".to_string());
    let body = body.map_err(|e| {
        tracing::debug!(error = %e.body_text(), "unreadable replacement body");
        invalid_body()
    })?;
    let replacements = Replacements::from_json_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "rejected replacement body");
        invalid_body()
    })?;

    let store = state.store.clone();
    let options = state.config.fill.clone();
    let (data, report) = tokio::task::spawn_blocking(move || {
        let template = store
            .read()
            .map_err(|e| ApiError::Storage(e.to_string()))?
            .ok_or(ApiError::NotFound)?;
        crate::fill_bytes(template, &replacements, &options)
            .map_err(|e| ApiError::Processing(e.to_string()))
    })
    .await
    .map_err(|e| ApiError::Processing(e.to_string()))??;

    tracing::info!(
        slides = report.slides,
        replacements = report.replacements,
        bytes = data.len(),
        "template processed"
    );
    Ok(Json(ProcessResponse {
        message: "File processed successfully".to_string(),
        filename: state.config.output_file_name(),
        data: STANDARD.encode(&data),
        mimetype: PRESENTATION_MIME_TYPE.to_string(),
    }))
}
