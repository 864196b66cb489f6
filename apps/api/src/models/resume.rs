use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One uploaded resume, its job context, and the latest AI feedback.
///
/// `pdf_path` and `image_path` are blob-store keys written before the row
/// exists and never changed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub job_title: String,
    pub job_description: String,
    pub company_name: String,
    pub pdf_path: String,
    pub image_path: String,
    /// Raw completion text; `None` until an analysis succeeds.
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a resume. The repository assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResume {
    pub owner_id: Uuid,
    pub job_title: String,
    pub job_description: String,
    pub company_name: String,
    pub pdf_path: String,
    pub image_path: String,
}
