//! Storage module for bucket access
//!
//! Defines the narrow [`ObjectStorage`] interface the link features consume
//! (enumerate objects, check existence, presign a GET) and its S3-compatible
//! implementation.

mod s3_client;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::error::AppError;

pub use s3_client::S3StorageClient;

/// One object as reported by the storage backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub size: u64,
}

/// Storage backend capable of enumerating objects and minting signed URLs
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Name of the bucket served by this backend
    fn bucket_name(&self) -> String;

    /// Snapshot of every object currently in the bucket
    async fn list_objects(&self) -> Result<Vec<StoredObject>, AppError>;

    /// Whether an object with this key exists
    async fn object_exists(&self, key: &str) -> Result<bool, AppError>;

    /// Presign a GET URL for `key` that the backend honours for `expiry_secs`
    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<String, AppError>;
}
