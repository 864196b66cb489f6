use axum::extract::{Path, State};
use axum::Json;
use tokio::time::Instant;
use uuid::Uuid;

use crate::analysis::ANALYSIS_DEADLINE;
use crate::errors::AppError;
use crate::resumes::ResumeIdResponse;
use crate::state::AppState;

/// POST {base}/ai/analyze/:id
///
/// Runs the analysis pipeline synchronously and returns the same id once
/// feedback is stored.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResumeIdResponse>, AppError> {
    let deadline = Instant::now() + ANALYSIS_DEADLINE;

    let resume_id = Uuid::parse_str(&id)
        .map_err(|_| AppError::Validation(format!("Invalid resume id '{id}'")))?;

    let resume_id = state.analysis.analyze(resume_id, deadline).await?;
    Ok(Json(ResumeIdResponse { resume_id }))
}
