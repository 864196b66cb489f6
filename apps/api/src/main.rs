mod analysis;
mod auth;
mod config;
mod convert;
mod db;
mod errors;
mod llm_client;
mod models;
mod resumes;
mod routes;
mod state;
mod storage;
mod upload;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::AnalysisService;
use crate::auth::TokenKeys;
use crate::config::{Config, StorageBackend};
use crate::convert::PdfConverter;
use crate::db::create_pool;
use crate::llm_client::DeepSeekClient;
use crate::resumes::repository::PgResumeRepository;
use crate::routes::{build_router, RouterConfig, StaticFiles};
use crate::state::AppState;
use crate::storage::{BlobStore, FsBlobStore, S3BlobStore};
use crate::upload::UploadService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs pending migrations)
    let db = create_pool(&config.database_url).await?;
    let resumes = Arc::new(PgResumeRepository::new(db));

    // Initialize blob storage
    let (store, static_files): (Arc<dyn BlobStore>, Option<StaticFiles>) = match &config.storage {
        StorageBackend::Filesystem { root } => {
            let fs = FsBlobStore::new(root.clone())
                .await
                .with_context(|| format!("Cannot open storage directory {}", root.display()))?;
            info!("Filesystem blob store at {}", fs.root().display());
            let files = StaticFiles {
                url_prefix: config.files_url_prefix.clone(),
                root: fs.root().to_path_buf(),
            };
            let store: Arc<dyn BlobStore> = Arc::new(fs);
            (store, Some(files))
        }
        StorageBackend::S3 {
            bucket,
            endpoint,
            access_key_id,
            secret_access_key,
        } => {
            let s3 = S3BlobStore::connect(endpoint, bucket, access_key_id, secret_access_key).await;
            info!("S3 blob store (bucket: {bucket})");
            let store: Arc<dyn BlobStore> = Arc::new(s3);
            (store, None)
        }
    };

    // Initialize document converter and chat client
    let converter = Arc::new(PdfConverter::new(config.pdfium_library_dir.clone()));
    let chat = Arc::new(DeepSeekClient::new(
        config.deepseek_api_key.clone(),
        &config.deepseek_base_url,
    )?);
    info!("Chat client initialized (model: {})", analysis::prompts::MODEL);

    // Build app state
    let state = AppState {
        upload: Arc::new(UploadService::new(
            store.clone(),
            converter.clone(),
            resumes.clone(),
        )),
        analysis: Arc::new(AnalysisService::new(
            store,
            converter,
            chat,
            resumes.clone(),
        )),
        resumes,
        tokens: Arc::new(TokenKeys::new(&config.jwt_secret)),
    };

    // Build router
    let router_config = RouterConfig {
        base_path: config.base_api_path(),
        max_upload_bytes: config.max_upload_bytes,
        static_files,
    };
    let app = build_router(state, &router_config)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr} (API at {})", router_config.base_path);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Permissive unless a single browser origin is configured, in which case
/// cookies are allowed for that origin only.
fn cors_layer(config: &Config) -> Result<CorsLayer> {
    let Some(origin) = &config.cors_allowed_origin else {
        return Ok(CorsLayer::permissive());
    };

    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("CORS_ALLOWED_ORIGIN is not a valid origin: {origin}"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}
