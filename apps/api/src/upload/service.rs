//! Upload pipeline: validate → save PDF → render + save preview → create record.
//!
//! Strictly sequential. Both blobs are durable before the record that points
//! at them is created; a failed record insert leaves them orphaned.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use bytes::Bytes;
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::convert::{encode_png, ConvertError, DocumentConverter};
use crate::models::resume::NewResume;
use crate::resumes::repository::{RepositoryError, ResumeRepository};
use crate::storage::{BlobStore, StorageError};

const PDF_MEDIA_TYPE: &str = "application/pdf";
const RANDOM_NAME_BYTES: usize = 32;
/// Keeps the job-title directory well under filesystem name limits.
const MAX_SEGMENT_CHARS: usize = 64;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid media type {0:?}, expected application/pdf")]
    InvalidMediaType(String),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("failed to store PDF")]
    StorageWriteFailed(#[source] StorageError),

    #[error("failed to generate preview image")]
    PreviewGenerationFailed(#[source] PreviewError),

    #[error("failed to create resume record")]
    RecordCreationFailed(#[source] RepositoryError),
}

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// One uploaded file plus the job context it should be judged against.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub owner_id: Uuid,
    pub job_title: String,
    pub job_description: String,
    pub company_name: String,
    pub file: Bytes,
    /// Content type declared for the file part; no sniffing is done.
    pub content_type: Option<String>,
}

pub struct UploadService {
    store: Arc<dyn BlobStore>,
    converter: Arc<dyn DocumentConverter>,
    resumes: Arc<dyn ResumeRepository>,
}

impl UploadService {
    pub fn new(
        store: Arc<dyn BlobStore>,
        converter: Arc<dyn DocumentConverter>,
        resumes: Arc<dyn ResumeRepository>,
    ) -> Self {
        Self {
            store,
            converter,
            resumes,
        }
    }

    /// Runs the whole upload and returns the new resume id.
    pub async fn upload(&self, request: UploadRequest) -> Result<Uuid, UploadError> {
        // Step 1: declared media type and required fields
        validate_media_type(request.content_type.as_deref())?;
        require("jobTitle", &request.job_title)?;
        require("jobDescription", &request.job_description)?;
        require("companyName", &request.company_name)?;

        // Step 2: keys from a random name, never from the uploaded filename
        let name = random_file_name();
        let dir = format!("{}/{}", request.owner_id, key_segment(&request.job_title));
        let pdf_path = format!("{dir}/pdfs/{name}.pdf");
        let image_path = format!("{dir}/images/{name}.png");

        // Step 3: store the PDF
        self.store
            .save(&pdf_path, request.file)
            .await
            .map_err(UploadError::StorageWriteFailed)?;
        info!(owner_id = %request.owner_id, key = %pdf_path, "Stored resume PDF");

        // Step 4: preview from the stored copy
        self.save_preview(&pdf_path, &image_path)
            .await
            .map_err(UploadError::PreviewGenerationFailed)?;
        info!(owner_id = %request.owner_id, key = %image_path, "Stored resume preview");

        // Step 5: link both blobs in a record
        let row = self
            .resumes
            .create(NewResume {
                owner_id: request.owner_id,
                job_title: request.job_title,
                job_description: request.job_description,
                company_name: request.company_name,
                pdf_path: pdf_path.clone(),
                image_path: image_path.clone(),
            })
            .await
            .map_err(|e| {
                error!(
                    "Resume record creation failed; blobs {pdf_path} and {image_path} are orphaned"
                );
                UploadError::RecordCreationFailed(e)
            })?;

        info!(resume_id = %row.id, owner_id = %row.owner_id, "Resume uploaded");
        Ok(row.id)
    }

    async fn save_preview(&self, pdf_path: &str, image_path: &str) -> Result<(), PreviewError> {
        let pdf = self.store.read(pdf_path).await?;
        let image = self.converter.render_first_page(pdf).await?;
        let png = encode_png(&image)?;
        self.store.save(image_path, png).await?;
        Ok(())
    }
}

fn validate_media_type(declared: Option<&str>) -> Result<(), UploadError> {
    let declared = declared.unwrap_or_default();
    match declared.parse::<mime::Mime>() {
        Ok(m) if m.essence_str() == PDF_MEDIA_TYPE => Ok(()),
        _ => Err(UploadError::InvalidMediaType(declared.to_string())),
    }
}

fn require(field: &'static str, value: &str) -> Result<(), UploadError> {
    if value.trim().is_empty() {
        return Err(UploadError::MissingField(field));
    }
    Ok(())
}

/// 32 bytes from the OS RNG, URL-safe base64 without padding.
fn random_file_name() -> String {
    let mut bytes = [0u8; RANDOM_NAME_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Turns a free-text job title into a single safe key segment of at most
/// [`MAX_SEGMENT_CHARS`] ASCII characters.
fn key_segment(job_title: &str) -> String {
    let cleaned: String = job_title
        .trim()
        .chars()
        .take(MAX_SEGMENT_CHARS)
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned.to_string()
    }
}
