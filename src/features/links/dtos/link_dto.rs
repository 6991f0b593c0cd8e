use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::links::models::{GrantRecord, IssuedGrant};
use crate::shared::validation::validate_object_name;

/// Request DTO for generating a signed link
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateSignedUrlDto {
    /// Name of the bucket object to share
    #[serde(rename = "fileName")]
    #[validate(custom(function = "validate_object_name"))]
    #[schema(example = "report.pdf")]
    pub file_name: String,
    /// Link validity in minutes (defaults to the configured default, usually 15)
    #[serde(default)]
    #[schema(example = 15)]
    pub expiration: Option<i64>,
}

/// Response DTO for a generated link
///
/// The only response that ever carries the raw signed URL.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GeneratedLinkDto {
    /// The signed URL. Shown once; it cannot be retrieved again.
    pub signed_url: String,
    /// Grant identifier, usable for revocation
    pub id: Uuid,
    /// Recorded expiry: the link stops working at or before this instant
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedGrant> for GeneratedLinkDto {
    fn from(issued: IssuedGrant) -> Self {
        Self {
            signed_url: issued.signed_url,
            id: issued.grant.id,
            expires_at: issued.grant.expires_at,
        }
    }
}

/// Response DTO for an active link (never includes the URL)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActiveLinkDto {
    pub id: Uuid,
    /// Object the link grants access to
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Hex digest of the signed URL
    pub signed_url_hash: String,
}

impl From<GrantRecord> for ActiveLinkDto {
    fn from(grant: GrantRecord) -> Self {
        Self {
            id: grant.id,
            file_name: grant.object_name,
            created_at: grant.issued_at,
            expires_at: grant.expires_at,
            signed_url_hash: grant.url_digest,
        }
    }
}

/// Response DTO for revocation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RevokeLinkResponseDto {
    pub revoked: bool,
    /// Reminder that the URL itself stays valid at the storage backend until it expires
    pub note: String,
}

/// Response DTO for a purge run
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurgeLinksResponseDto {
    /// Number of expired or revoked records removed
    pub removed: u64,
}
