use std::sync::Arc;

use crate::analysis::AnalysisService;
use crate::auth::TokenKeys;
use crate::resumes::repository::ResumeRepository;
use crate::upload::UploadService;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every collaborator is built once at startup and handed in; nothing is looked up globally.
#[derive(Clone)]
pub struct AppState {
    pub upload: Arc<UploadService>,
    pub analysis: Arc<AnalysisService>,
    pub resumes: Arc<dyn ResumeRepository>,
    pub tokens: Arc<TokenKeys>,
}
