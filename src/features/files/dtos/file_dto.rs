use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::modules::storage::StoredObject;

/// Response DTO for one bucket object
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileObjectDto {
    /// Object key, usable as `fileName` when generating a link
    #[schema(example = "report.pdf")]
    pub name: String,
    /// Last-modified instant reported by the backend, when known
    pub updated: Option<DateTime<Utc>>,
    /// Size in bytes
    pub size: u64,
}

impl From<StoredObject> for FileObjectDto {
    fn from(object: StoredObject) -> Self {
        Self {
            name: object.key,
            updated: object.last_modified,
            size: object.size,
        }
    }
}
