use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::links::models::{
    sort_newest_first, GrantRecord, GrantState, IssuedGrant, NewGrant,
};
use crate::features::links::services::UrlDigester;
use crate::features::links::stores::GrantStore;
use crate::shared::clock::Clock;
use crate::shared::constants::URL_DIGEST_HEX_LEN;

/// Active link registry
///
/// Owns every issued grant. The raw signed URL passes through `register`
/// exactly once and is never stored; reads only ever see the digest.
///
/// Revoking a grant here is local bookkeeping only. The signed URL stays
/// valid at the storage backend until its own embedded expiry.
pub struct LinkRegistry {
    store: Arc<dyn GrantStore>,
    digester: UrlDigester,
    clock: Arc<dyn Clock>,
}

impl LinkRegistry {
    pub fn new(store: Arc<dyn GrantStore>, digester: UrlDigester, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            digester,
            clock,
        }
    }

    /// Digest of a signed URL as the registry would record it
    pub fn digest(&self, signed_url: &str) -> String {
        self.digester.digest(signed_url)
    }

    /// Record a freshly issued grant
    ///
    /// Returns the grant together with its signed URL; this is the only
    /// call that ever hands the URL back. Fails only with `StorageExhausted`.
    /// Callers pass a window already checked by the issuer.
    pub async fn register(&self, grant: NewGrant) -> Result<IssuedGrant> {
        debug_assert!(
            grant.expires_at > grant.issued_at,
            "grant window must be positive"
        );

        let record = GrantRecord {
            id: Uuid::now_v7(),
            object_name: grant.object_name,
            url_digest: self.digester.digest(&grant.signed_url),
            issued_at: grant.issued_at,
            expires_at: grant.expires_at,
            state: GrantState::Issued,
        };
        debug_assert_eq!(record.url_digest.len(), URL_DIGEST_HEX_LEN);

        self.store
            .insert(record.clone(), self.clock.now())
            .await
            .map_err(|e| match e {
                AppError::StorageExhausted(_) => e,
                other => AppError::StorageExhausted(format!(
                    "Grant store ({}) rejected the write: {}",
                    self.store.kind(),
                    other
                )),
            })?;

        debug!(
            "Registered grant id={}, object={}, digest={}",
            record.id, record.object_name, record.url_digest
        );

        Ok(IssuedGrant {
            grant: record,
            signed_url: grant.signed_url,
        })
    }

    /// Grants active right now, newest first
    pub async fn list_active(&self) -> Result<Vec<GrantRecord>> {
        let now = self.clock.now();
        let mut grants = self.store.list_active(now).await?;

        // Stores filter too; this keeps the guarantee independent of the backend
        grants.retain(|grant| grant.is_active_at(now));
        sort_newest_first(&mut grants);

        Ok(grants)
    }

    /// Drop expired and revoked records; returns how many were removed
    pub async fn purge_expired(&self) -> Result<u64> {
        let removed = self.store.purge_inactive(self.clock.now()).await?;
        if removed > 0 {
            info!("Purged {} inactive link grants", removed);
        }
        Ok(removed)
    }

    /// Revoke an active grant early; `false` if no active grant has this id
    pub async fn revoke(&self, id: Uuid) -> Result<bool> {
        let revoked = self.store.revoke(id, self.clock.now()).await?;
        if revoked {
            info!(
                "Revoked grant id={} locally; its signed URL remains valid at the backend until expiry",
                id
            );
        }
        Ok(revoked)
    }

    /// Release the registry at shutdown, reporting what it still held
    pub async fn shutdown(&self) -> Result<()> {
        let retained = self.store.retained().await?;
        info!(
            "Link registry ({} store) shut down with {} retained grant records",
            self.store.kind(),
            retained
        );
        Ok(())
    }
}
