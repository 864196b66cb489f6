//! In-memory stand-ins for the pipeline's collaborators.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use image::{DynamicImage, Rgba, RgbaImage};
use uuid::Uuid;

use crate::analysis::AnalysisService;
use crate::convert::{assemble_text, ConvertError, DocumentConverter};
use crate::llm_client::{ChatClient, ChatMessage, ChatRequest, ChatResponse, Choice, LlmError, Role};
use crate::models::resume::{NewResume, ResumeRow};
use crate::resumes::repository::{RepositoryError, ResumeRepository};
use crate::storage::{key_matches_prefix, validate_key, validate_prefix, BlobStore, StorageError};
use crate::upload::UploadService;

pub const PDF_HEADER: &[u8] = b"%PDF-1.4\n";

/// Fake PDF whose "text layer" is `text`.
pub fn fake_pdf(text: &str) -> Bytes {
    let mut data = PDF_HEADER.to_vec();
    data.extend_from_slice(text.as_bytes());
    Bytes::from(data)
}

// ─── Blob store ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<BTreeMap<String, Bytes>>,
    /// Saves to keys ending with this suffix fail.
    fail_saves_ending_with: Mutex<Option<String>>,
    pub saves: AtomicUsize,
    pub reads: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn fail_saves_ending_with(&self, suffix: &str) {
        *self.fail_saves_ending_with.lock().unwrap() = Some(suffix.to_string());
    }

    pub fn keys(&self) -> Vec<String> {
        self.blobs.lock().unwrap().keys().cloned().collect()
    }

    pub fn remove(&self, key: &str) {
        self.blobs.lock().unwrap().remove(key);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn save(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        validate_key(key)?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        if let Some(suffix) = self.fail_saves_ending_with.lock().unwrap().as_deref() {
            if key.ends_with(suffix) {
                return Err(StorageError::Io {
                    key: key.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
        }
        self.blobs.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Bytes, StorageError> {
        validate_key(key)?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.blobs
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.blobs
            .lock()
            .unwrap()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        validate_prefix(prefix)?;
        Ok(self
            .blobs
            .lock()
            .unwrap()
            .keys()
            .filter(|k| key_matches_prefix(k, prefix))
            .cloned()
            .collect())
    }
}

// ─── Converter ──────────────────────────────────────────────────────────────

/// Treats everything after [`PDF_HEADER`] as the document's text, one page per
/// form feed. Bytes without the header fail both conversions.
#[derive(Default)]
pub struct FakeConverter;

fn strip_header(pdf: &[u8]) -> Result<&[u8], String> {
    pdf.strip_prefix(PDF_HEADER)
        .ok_or_else(|| "missing %PDF header".to_string())
}

#[async_trait]
impl DocumentConverter for FakeConverter {
    async fn extract_text(&self, pdf: Bytes) -> Result<String, ConvertError> {
        let body = strip_header(&pdf).map_err(ConvertError::Extraction)?;
        let text = String::from_utf8_lossy(body);
        assemble_text(text.split('\u{c}').map(|p| Ok::<_, String>(p.to_string())))
    }

    async fn render_first_page(&self, pdf: Bytes) -> Result<DynamicImage, ConvertError> {
        strip_header(&pdf).map_err(ConvertError::Render)?;
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            8,
            10,
            Rgba([255, 255, 255, 255]),
        )))
    }
}

// ─── Chat client ────────────────────────────────────────────────────────────

/// Replies with queued contents in order (the last one repeats) and records
/// every request it receives.
#[derive(Default)]
pub struct StubChatClient {
    replies: Mutex<Vec<Option<String>>>,
    pub requests: Mutex<Vec<ChatRequest>>,
    delay: Mutex<Option<std::time::Duration>>,
}

impl StubChatClient {
    pub fn replying(content: &str) -> Self {
        let stub = Self::default();
        stub.push_reply(Some(content));
        stub
    }

    /// `None` queues a response with zero choices.
    pub fn push_reply(&self, content: Option<&str>) {
        self.replies
            .lock()
            .unwrap()
            .push(content.map(String::from));
    }

    pub fn delay_by(&self, delay: std::time::Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatClient for StubChatClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                replies.remove(0)
            } else {
                replies.first().cloned().flatten()
            }
        };

        let choices = reply
            .map(|content| {
                vec![Choice {
                    message: ChatMessage {
                        role: Role::Assistant,
                        content,
                    },
                    finish_reason: Some("stop".to_string()),
                }]
            })
            .unwrap_or_default();

        Ok(ChatResponse {
            model: request.model.clone(),
            choices,
            ..Default::default()
        })
    }
}

// ─── Repository ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryResumeRepository {
    rows: Mutex<BTreeMap<Uuid, ResumeRow>>,
    fail_creates: Mutex<bool>,
    pub creates: AtomicUsize,
    pub updates: AtomicUsize,
}

impl MemoryResumeRepository {
    pub fn fail_creates(&self) {
        *self.fail_creates.lock().unwrap() = true;
    }

    pub fn insert(&self, row: ResumeRow) {
        self.rows.lock().unwrap().insert(row.id, row);
    }

    pub fn row(&self, id: Uuid) -> Option<ResumeRow> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl ResumeRepository for MemoryResumeRepository {
    async fn create(&self, resume: NewResume) -> Result<ResumeRow, RepositoryError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if *self.fail_creates.lock().unwrap() {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        let now = Utc::now();
        let row = ResumeRow {
            id: Uuid::new_v4(),
            owner_id: resume.owner_id,
            job_title: resume.job_title,
            job_description: resume.job_description,
            company_name: resume.company_name,
            pdf_path: resume.pdf_path,
            image_path: resume.image_path,
            feedback: None,
            created_at: now,
            updated_at: now,
        };
        self.insert(row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ResumeRow>, RepositoryError> {
        Ok(self.row(id))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<ResumeRow>, RepositoryError> {
        let mut rows: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn update_feedback(
        &self,
        id: Uuid,
        feedback: &str,
    ) -> Result<ResumeRow, RepositoryError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        row.feedback = Some(feedback.to_string());
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

// ─── Wiring ─────────────────────────────────────────────────────────────────

/// All fakes plus both orchestrators built over them.
pub struct Harness {
    pub store: Arc<MemoryBlobStore>,
    pub chat: Arc<StubChatClient>,
    pub resumes: Arc<MemoryResumeRepository>,
    pub upload: UploadService,
    pub analysis: AnalysisService,
}

impl Harness {
    pub fn new(chat: StubChatClient) -> Self {
        let store = Arc::new(MemoryBlobStore::default());
        let chat = Arc::new(chat);
        let resumes = Arc::new(MemoryResumeRepository::default());
        let converter = Arc::new(FakeConverter);
        Self {
            upload: UploadService::new(store.clone(), converter.clone(), resumes.clone()),
            analysis: AnalysisService::new(
                store.clone(),
                converter,
                chat.clone(),
                resumes.clone(),
            ),
            store,
            chat,
            resumes,
        }
    }
}
