// Resume records: persistence and the read-only API over them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::llm_client::strip_json_fences;
use crate::models::resume::ResumeRow;

pub mod handlers;
pub mod repository;

/// `{"resumeID": "<uuid>"}`, returned by upload and analyze.
#[derive(Debug, Serialize)]
pub struct ResumeIdResponse {
    #[serde(rename = "resumeID")]
    pub resume_id: Uuid,
}

/// Client-facing shape of a resume.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeView {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub job_title: String,
    pub job_description: String,
    pub company_name: String,
    pub pdf_path: String,
    pub image_path: String,
    pub feedback: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ResumeRow> for ResumeView {
    fn from(row: ResumeRow) -> Self {
        Self {
            feedback: row.feedback.as_deref().map(feedback_value),
            id: row.id,
            owner_id: row.owner_id,
            job_title: row.job_title,
            job_description: row.job_description,
            company_name: row.company_name,
            pdf_path: row.pdf_path,
            image_path: row.image_path,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Stored feedback as JSON when it parses (fences tolerated), otherwise the raw string.
fn feedback_value(raw: &str) -> Value {
    serde_json::from_str(strip_json_fences(raw)).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feedback_json_is_parsed() {
        assert_eq!(feedback_value(r#"{"overallScore": 70}"#), json!({"overallScore": 70}));
        assert_eq!(
            feedback_value("```json\n{\"overallScore\": 70}\n```"),
            json!({"overallScore": 70})
        );
    }

    #[test]
    fn test_non_json_feedback_is_kept_as_string() {
        assert_eq!(feedback_value("Great resume!"), json!("Great resume!"));
    }

    #[test]
    fn test_resume_id_response_uses_wire_name() {
        let id = Uuid::nil();
        let value = serde_json::to_value(ResumeIdResponse { resume_id: id }).unwrap();
        assert_eq!(value, json!({"resumeID": id}));
    }
}
