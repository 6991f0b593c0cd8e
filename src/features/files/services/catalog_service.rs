use std::sync::Arc;

use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::modules::storage::{ObjectStorage, StoredObject};

/// Read-only view of the objects in the configured bucket
///
/// Every call is a fresh backend query; nothing is cached.
pub struct ObjectCatalogService {
    storage: Arc<dyn ObjectStorage>,
}

impl ObjectCatalogService {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    /// Snapshot of the bucket's objects, sorted by name
    pub async fn list_objects(&self) -> Result<Vec<StoredObject>> {
        let mut objects = self.storage.list_objects().await.map_err(|e| match e {
            AppError::BackendUnavailable(_) => e,
            other => AppError::BackendUnavailable(other.to_string()),
        })?;
        objects.sort_by(|a, b| a.key.cmp(&b.key));

        debug!(
            "Listed {} objects in bucket {}",
            objects.len(),
            self.storage.bucket_name()
        );
        Ok(objects)
    }
}
