use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::llm_client::DEFAULT_BASE_URL;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Where resume blobs are kept.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    Filesystem {
        root: PathBuf,
    },
    S3 {
        bucket: String,
        endpoint: String,
        access_key_id: String,
        secret_access_key: String,
    },
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub deepseek_api_key: String,
    pub deepseek_base_url: String,
    pub storage: StorageBackend,
    /// Directory holding the pdfium shared library; system lookup when unset.
    pub pdfium_library_dir: Option<PathBuf>,
    pub api_version: String,
    pub files_url_prefix: String,
    pub max_upload_bytes: usize,
    pub cors_allowed_origin: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt_secret: require_env("JWT_SECRET")?,
            deepseek_api_key: require_env("DEEPSEEK_API_KEY")?,
            deepseek_base_url: env_or("DEEPSEEK_BASE_URL", DEFAULT_BASE_URL),
            storage: storage_from_env()?,
            pdfium_library_dir: std::env::var("PDFIUM_LIBRARY_DIR").ok().map(PathBuf::from),
            api_version: env_or("API_VERSION", "v1"),
            files_url_prefix: env_or("FILES_URL_PREFIX", "/files"),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            cors_allowed_origin: std::env::var("CORS_ALLOWED_ORIGIN").ok(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// Prefix every API route is mounted under, e.g. `/api/v1`.
    pub fn base_api_path(&self) -> String {
        format!("/api/{}", self.api_version)
    }
}

fn storage_from_env() -> Result<StorageBackend> {
    match env_or("STORAGE_BACKEND", "fs").as_str() {
        "fs" => Ok(StorageBackend::Filesystem {
            root: PathBuf::from(env_or("STORAGE_PATH", "./storage")),
        }),
        "s3" => Ok(StorageBackend::S3 {
            bucket: require_env("S3_BUCKET")?,
            endpoint: require_env("S3_ENDPOINT")?,
            access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
        }),
        other => bail!("STORAGE_BACKEND must be 'fs' or 's3', got '{other}'"),
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
