use std::sync::Arc;

use chrono::Duration;
use tracing::{error, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::links::models::{GrantRecord, IssuedGrant, NewGrant};
use crate::features::links::services::{LinkRegistry, SignedUrlIssuer};

/// Issuance orchestrator: mint a signed URL, then register it
pub struct LinkService {
    issuer: SignedUrlIssuer,
    registry: Arc<LinkRegistry>,
    default_expiration_minutes: i64,
}

impl LinkService {
    pub fn new(
        issuer: SignedUrlIssuer,
        registry: Arc<LinkRegistry>,
        default_expiration_minutes: i64,
    ) -> Self {
        Self {
            issuer,
            registry,
            default_expiration_minutes,
        }
    }

    /// Generate a signed link for `object_name` and record the grant
    ///
    /// Issuer errors are returned unchanged and nothing is registered. If the
    /// URL was minted but could not be recorded, a live URL exists outside the
    /// registry: it is withheld from the caller and logged for reconciliation.
    pub async fn generate_link(
        &self,
        object_name: &str,
        expiration_minutes: Option<i64>,
    ) -> Result<IssuedGrant> {
        let minutes = expiration_minutes.unwrap_or(self.default_expiration_minutes);
        let validity = Duration::try_minutes(minutes).ok_or_else(|| {
            AppError::InvalidDuration(format!(
                "Expiration must be between 1 and {} minutes",
                self.issuer.max_validity().num_minutes()
            ))
        })?;

        // Reject bad durations before any backend round-trip
        self.issuer.validate_validity(validity)?;

        let issued = self.issuer.issue(object_name, validity).await?;

        let new_grant = NewGrant {
            object_name: object_name.to_string(),
            signed_url: issued.signed_url,
            issued_at: issued.issued_at,
            expires_at: issued.expires_at,
        };
        let url_digest = self.registry.digest(&new_grant.signed_url);
        let expires_at = new_grant.expires_at;

        match self.registry.register(new_grant).await {
            Ok(grant) => {
                info!(
                    "Issued signed link id={}, object={}, digest={}, expires_at={}",
                    grant.grant.id, grant.grant.object_name, grant.grant.url_digest, expires_at
                );
                Ok(grant)
            }
            Err(e) => {
                error!(
                    partial_failure = true,
                    "Signed URL issued but NOT registered: object={}, digest={}, expires_at={}, cause={}",
                    object_name,
                    url_digest,
                    expires_at,
                    e
                );
                Err(AppError::StorageExhausted(
                    "The signed link could not be recorded and was withheld".to_string(),
                ))
            }
        }
    }

    pub async fn list_active(&self) -> Result<Vec<GrantRecord>> {
        self.registry.list_active().await
    }

    pub async fn revoke(&self, id: Uuid) -> Result<bool> {
        self.registry.revoke(id).await
    }

    pub async fn purge_expired(&self) -> Result<u64> {
        self.registry.purge_expired().await
    }
}
