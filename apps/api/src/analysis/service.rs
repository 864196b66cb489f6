//! Resume Analysis: runs one resume through the feedback pipeline.
//!
//! Flow: load record → read PDF blob → extract text → compose prompt →
//!       chat completion (under the request deadline) → overwrite feedback.
//!
//! Each step's failure ends the call. Nothing is retried; a failed run leaves
//! the previous feedback (or none) in place.

use std::sync::Arc;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

use crate::analysis::prompts::{resume_content, system_instructions, MODEL, TEMPERATURE};
use crate::convert::{ConvertError, DocumentConverter};
use crate::llm_client::{ChatClient, ChatMessage, ChatRequest, LlmError};
use crate::models::resume::ResumeRow;
use crate::resumes::repository::{RepositoryError, ResumeRepository};
use crate::storage::{BlobStore, StorageError};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("resume {0} does not exist")]
    ResumeNotFound(Uuid),

    #[error("failed to load resume")]
    Repository(#[source] RepositoryError),

    /// The record points at a PDF the store no longer has.
    #[error("PDF {key} for resume {resume_id} is missing from storage")]
    SourceMissing { resume_id: Uuid, key: String },

    #[error("failed to read resume PDF")]
    Storage(#[source] StorageError),

    #[error("failed to extract resume text")]
    Extraction(#[source] ConvertError),

    #[error("chat completion failed")]
    Upstream(#[source] LlmError),

    #[error("analysis deadline exceeded")]
    DeadlineExceeded,

    #[error("chat completion returned no choices")]
    NoFeedbackProduced,

    #[error("failed to store feedback")]
    FeedbackUpdateFailed(#[source] RepositoryError),
}

pub struct AnalysisService {
    store: Arc<dyn BlobStore>,
    converter: Arc<dyn DocumentConverter>,
    chat: Arc<dyn ChatClient>,
    resumes: Arc<dyn ResumeRepository>,
}

impl AnalysisService {
    pub fn new(
        store: Arc<dyn BlobStore>,
        converter: Arc<dyn DocumentConverter>,
        chat: Arc<dyn ChatClient>,
        resumes: Arc<dyn ResumeRepository>,
    ) -> Self {
        Self {
            store,
            converter,
            chat,
            resumes,
        }
    }

    /// Analyzes `resume_id` and stores the completion as its feedback.
    /// The chat call is abandoned once `deadline` passes.
    pub async fn analyze(&self, resume_id: Uuid, deadline: Instant) -> Result<Uuid, AnalysisError> {
        // Step 1: resolve the record
        let resume = self
            .resumes
            .get(resume_id)
            .await
            .map_err(AnalysisError::Repository)?
            .ok_or(AnalysisError::ResumeNotFound(resume_id))?;

        // Step 2: the stored PDF
        let pdf = self.store.read(&resume.pdf_path).await.map_err(|e| {
            if e.is_not_found() {
                error!(
                    resume_id = %resume_id,
                    key = %resume.pdf_path,
                    "Data integrity: resume record points at a missing PDF"
                );
                AnalysisError::SourceMissing {
                    resume_id,
                    key: resume.pdf_path.clone(),
                }
            } else {
                AnalysisError::Storage(e)
            }
        })?;

        // Step 3: text (empty extraction is fatal, never sent upstream)
        let text = self
            .converter
            .extract_text(pdf)
            .await
            .map_err(AnalysisError::Extraction)?;
        info!(resume_id = %resume_id, chars = text.len(), "Extracted resume text");

        // Steps 4-5: prompt and completion
        let request = build_chat_request(&text, &resume);
        let response = tokio::time::timeout_at(deadline, self.chat.chat(&request))
            .await
            .map_err(|_| AnalysisError::DeadlineExceeded)?
            .map_err(AnalysisError::Upstream)?;

        // Step 6: exactly the first choice, stored unvalidated
        let feedback = response
            .first_content()
            .ok_or(AnalysisError::NoFeedbackProduced)?;

        // Step 7: full overwrite
        let updated = self
            .resumes
            .update_feedback(resume_id, feedback)
            .await
            .map_err(AnalysisError::FeedbackUpdateFailed)?;

        info!(resume_id = %updated.id, "Stored resume feedback");
        Ok(updated.id)
    }
}

/// System instructions first, then the resume text with its job context.
pub fn build_chat_request(resume_text: &str, resume: &ResumeRow) -> ChatRequest {
    ChatRequest {
        model: MODEL.to_string(),
        temperature: TEMPERATURE,
        stream: false,
        messages: vec![
            ChatMessage::system(system_instructions()),
            ChatMessage::user(resume_content(
                resume_text,
                &resume.job_title,
                &resume.job_description,
                &resume.company_name,
            )),
        ],
    }
}
