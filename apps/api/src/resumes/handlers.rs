use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::resumes::ResumeView;
use crate::state::AppState;

/// GET {base}/resume/:id
///
/// Another user's resume is reported as not found.
pub async fn handle_get_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ResumeView>, AppError> {
    let resume_id = Uuid::parse_str(&id)
        .map_err(|_| AppError::Validation(format!("Invalid resume id '{id}'")))?;

    let resume = state
        .resumes
        .get(resume_id)
        .await?
        .filter(|r| r.owner_id == user.id)
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;

    Ok(Json(resume.into()))
}

/// GET {base}/resumes
///
/// The caller's resumes, newest first.
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ResumeView>>, AppError> {
    let resumes = state.resumes.list_by_owner(user.id).await?;
    Ok(Json(resumes.into_iter().map(ResumeView::from).collect()))
}
