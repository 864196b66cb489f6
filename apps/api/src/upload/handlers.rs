//! Axum route handler for resume uploads.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::resumes::ResumeIdResponse;
use crate::state::AppState;
use crate::upload::UploadRequest;

/// POST {base}/upload
///
/// Multipart form: `file` (application/pdf), `jobTitle`, `jobDescription`,
/// `companyName`.
pub async fn handle_upload(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ResumeIdResponse>, AppError> {
    let mut file: Option<(Bytes, Option<String>)> = None;
    let mut job_title = String::new();
    let mut job_description = String::new();
    let mut company_name = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Malformed multipart body", e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let content_type = field.content_type().map(String::from);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Unreadable file part", e))?;
                file = Some((data, content_type));
            }
            "jobTitle" | "job_title" => job_title = read_text(field).await?,
            "jobDescription" | "job_description" => job_description = read_text(field).await?,
            "companyName" | "company_name" => company_name = read_text(field).await?,
            _ => {}
        }
    }

    let (file, content_type) =
        file.ok_or_else(|| AppError::Validation("file is required".to_string()))?;

    info!(owner_id = %user.id, username = %user.username, bytes = file.len(), "Upload received");

    let resume_id = state
        .upload
        .upload(UploadRequest {
            owner_id: user.id,
            job_title,
            job_description,
            company_name,
            file,
            content_type,
        })
        .await?;

    Ok(Json(ResumeIdResponse { resume_id }))
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| multipart_error("Unreadable form field", e))
}

/// A body cut off by the upload limit is a 413; anything else is the client's malformed form.
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Upload exceeds the size limit: {}", err.body_text()))
    } else {
        AppError::Validation(format!("{context}: {}", err.body_text()))
    }
}
