use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::{debug, info};

use super::{key_matches_prefix, validate_key, validate_prefix, BlobStore, StorageError};

/// Blob store over an S3-compatible bucket (AWS or MinIO).
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Builds a client with static credentials against `endpoint`.
    /// Path-style addressing keeps MinIO deployments working.
    pub async fn connect(
        endpoint: &str,
        bucket: &str,
        access_key_id: &str,
        secret_access_key: &str,
    ) -> Self {
        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "resume-api-static",
        );

        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(true)
            .build();

        info!(bucket, endpoint, "S3 blob store ready");
        Self::new(Client::from_conf(s3_config), bucket)
    }

    fn backend_error(&self, key: &str, err: impl std::error::Error) -> StorageError {
        StorageError::Backend {
            key: key.to_string(),
            message: format!("s3://{}: {}", self.bucket, DisplayErrorContext(err)),
        }
    }
}

fn content_type_for(key: &str) -> &'static str {
    if key.ends_with(".pdf") {
        "application/pdf"
    } else if key.ends_with(".png") {
        "image/png"
    } else {
        "application/octet-stream"
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn save(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        validate_key(key)?;
        let len = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type_for(key))
            .send()
            .await
            .map_err(|e| self.backend_error(key, e))?;
        debug!(key, bytes = len, "Uploaded blob to s3://{}", self.bucket);
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Bytes, StorageError> {
        validate_key(key)?;
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                if e.as_service_error().map(|se| se.is_no_such_key()) == Some(true) {
                    return Err(StorageError::NotFound(key.to_string()));
                }
                return Err(self.backend_error(key, e));
            }
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| self.backend_error(key, e))?;
        Ok(body.into_bytes())
    }

    /// S3 deletes are idempotent, so a missing key is not reported.
    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| self.backend_error(key, e))?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        validate_prefix(prefix)?;
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix.trim_end_matches('/'))
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| self.backend_error(prefix, e))?;

            // S3 prefixes match raw strings; narrow to whole segments.
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|obj| obj.key())
                    .filter(|key| key_matches_prefix(key, prefix))
                    .map(String::from),
            );

            match page.next_continuation_token() {
                Some(token) if page.is_truncated() == Some(true) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        keys.sort();
        Ok(keys)
    }
}
