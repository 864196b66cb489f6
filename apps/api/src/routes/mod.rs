pub mod health;

use std::path::PathBuf;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::analysis::handlers::handle_analyze;
use crate::resumes::handlers::{handle_get_resume, handle_list_resumes};
use crate::state::AppState;
use crate::upload::handlers::handle_upload;

/// Read-only passthrough of the filesystem blob store.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    pub url_prefix: String,
    pub root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// e.g. `/api/v1`
    pub base_path: String,
    pub max_upload_bytes: usize,
    pub static_files: Option<StaticFiles>,
}

pub fn build_router(state: AppState, config: &RouterConfig) -> Router {
    let api = Router::new()
        .route(
            "/upload",
            post(handle_upload).layer(DefaultBodyLimit::max(config.max_upload_bytes)),
        )
        .route("/ai/analyze/:id", post(handle_analyze))
        .route("/resume/:id", get(handle_get_resume))
        .route("/resumes", get(handle_list_resumes));

    let mut router = Router::new()
        .route("/health", get(health::health_handler))
        .nest(&config.base_path, api);

    if let Some(files) = &config.static_files {
        router = router.nest_service(&files.url_prefix, ServeDir::new(&files.root));
    }

    router.with_state(state)
}
