//! S3-compatible storage client
//!
//! Lists bucket objects and generates presigned GET URLs for MinIO, GCS
//! (interoperability mode) or any S3-compatible storage service.
//!
//! Uses rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};
use tracing::{debug, info, warn};

use super::{ObjectStorage, StoredObject};
use crate::core::config::StorageConfig;
use crate::core::error::AppError;

/// S3-compatible storage client
pub struct S3StorageClient {
    bucket: Box<Bucket>,
    endpoint: String,
    list_prefix: Option<String>,
}

impl S3StorageClient {
    /// Create a new storage client from configuration
    pub fn new(config: StorageConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create storage credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| AppError::Internal(format!("Failed to create storage bucket: {}", e)))?;

        // Path-style URLs (http://endpoint/bucket) for MinIO and most self-hosted backends
        if config.path_style {
            bucket.set_path_style();
        }

        info!(
            "Storage client initialized for endpoint: {}, bucket: {}, list_prefix: {}",
            config.endpoint,
            bucket.name(),
            config.list_prefix.as_deref().unwrap_or("-")
        );

        Ok(Self {
            bucket,
            endpoint: config.endpoint,
            list_prefix: config.list_prefix,
        })
    }

    /// Probe the bucket once at startup
    ///
    /// Failures are logged, not fatal: each request reports
    /// `BackendUnavailable` on its own while the backend is down.
    pub async fn check_bucket_access(&self) {
        match self
            .bucket
            .list_page(self.prefix(), None, None, None, Some(1))
            .await
        {
            Ok((_, code)) if (200..300).contains(&code) => {
                debug!("Bucket '{}' is reachable", self.bucket.name());
            }
            Ok((_, code)) => warn!(
                "Bucket '{}' at {} answered the startup probe with status {}",
                self.bucket.name(),
                self.endpoint,
                code
            ),
            Err(e) => warn!(
                "Could not reach bucket '{}' at {}: {}. Requests will fail until it is available.",
                self.bucket.name(),
                self.endpoint,
                e
            ),
        }
    }

    fn prefix(&self) -> String {
        self.list_prefix.clone().unwrap_or_default()
    }

    fn unavailable(action: &str, key: &str, e: S3Error) -> AppError {
        AppError::BackendUnavailable(format!("Failed to {} '{}': {}", action, key, e))
    }

    fn parse_last_modified(raw: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }
}

#[async_trait]
impl ObjectStorage for S3StorageClient {
    fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    async fn list_objects(&self) -> Result<Vec<StoredObject>, AppError> {
        // rust-s3 follows continuation tokens, so every page is returned
        let pages = self
            .bucket
            .list(self.prefix(), None)
            .await
            .map_err(|e| Self::unavailable("list objects in", &self.bucket.name(), e))?;

        let objects: Vec<StoredObject> = pages
            .into_iter()
            .flat_map(|page| page.contents)
            .map(|object| StoredObject {
                last_modified: Self::parse_last_modified(&object.last_modified),
                key: object.key,
                size: object.size,
            })
            .collect();

        debug!(
            "Listed {} objects from bucket '{}'",
            objects.len(),
            self.bucket.name()
        );
        Ok(objects)
    }

    async fn object_exists(&self, key: &str) -> Result<bool, AppError> {
        match self.bucket.head_object(key).await {
            Ok((_, code)) if (200..300).contains(&code) => Ok(true),
            Ok((_, 404)) => Ok(false),
            Ok((_, code)) => Err(AppError::BackendUnavailable(format!(
                "Failed to check if object '{}' exists: status {}",
                key, code
            ))),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("404") || error_str.contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(Self::unavailable("check existence of", key, e))
                }
            }
        }
    }

    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<String, AppError> {
        self.bucket
            .presign_get(key, expiry_secs, None)
            .await
            .map_err(|e| Self::unavailable("generate presigned URL for", key, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StorageConfig {
        StorageConfig {
            endpoint: "http://localhost:9000".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            bucket: "shared-files".to_string(),
            region: "us-east-1".to_string(),
            path_style: true,
            list_prefix: None,
        }
    }

    #[test]
    fn test_parse_last_modified() {
        let parsed = S3StorageClient::parse_last_modified("2024-03-01T10:15:30.000Z").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T10:15:30+00:00");
        assert!(S3StorageClient::parse_last_modified("yesterday").is_none());
    }

    #[tokio::test]
    async fn test_presign_get_is_local_and_embeds_expiry() {
        // Presigning is a local signing operation; no network round-trip happens
        let client = S3StorageClient::new(config()).unwrap();

        let url = client.presign_get("report.pdf", 900).await.unwrap();

        assert!(url.starts_with("http://localhost:9000"));
        assert!(url.contains("/shared-files/report.pdf?"));
        assert!(url.contains("X-Amz-Expires=900"));
        assert!(url.contains("X-Amz-Signature="));
        assert_eq!(client.bucket_name(), "shared-files");
    }
}
