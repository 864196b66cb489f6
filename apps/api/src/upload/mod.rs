// Resume upload: multipart intake, blob storage, preview rendering, record creation.

pub mod handlers;
pub mod service;

pub use service::{UploadError, UploadRequest, UploadService};
