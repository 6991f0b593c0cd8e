use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::GrantStore;
use crate::core::error::{AppError, Result};
use crate::features::links::models::{GrantRecord, GrantState};

/// In-process grant store bounded by `capacity` retained records
pub struct MemoryGrantStore {
    grants: RwLock<HashMap<Uuid, GrantRecord>>,
    capacity: usize,
}

impl MemoryGrantStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            grants: RwLock::new(HashMap::new()),
            capacity,
        }
    }
}

#[async_trait]
impl GrantStore for MemoryGrantStore {
    async fn insert(&self, record: GrantRecord, now: DateTime<Utc>) -> Result<()> {
        let mut grants = self.grants.write().await;

        if grants.contains_key(&record.id) {
            return Err(AppError::Internal(format!(
                "Grant id {} is already registered",
                record.id
            )));
        }

        if grants.len() >= self.capacity {
            // Reclaim space held by expired and revoked records before refusing
            let before = grants.len();
            grants.retain(|_, grant| grant.is_active_at(now));
            debug!(
                "Grant store at capacity, reclaimed {} inactive records",
                before - grants.len()
            );

            if grants.len() >= self.capacity {
                return Err(AppError::StorageExhausted(format!(
                    "In-memory grant store is full ({} active grants)",
                    self.capacity
                )));
            }
        }

        grants.insert(record.id, record);
        Ok(())
    }

    async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<GrantRecord>> {
        let grants = self.grants.read().await;
        Ok(grants
            .values()
            .filter(|grant| grant.is_active_at(now))
            .cloned()
            .collect())
    }

    async fn purge_inactive(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut grants = self.grants.write().await;
        let before = grants.len();
        grants.retain(|_, grant| grant.is_active_at(now));
        Ok((before - grants.len()) as u64)
    }

    async fn revoke(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let mut grants = self.grants.write().await;
        match grants.get_mut(&id) {
            Some(grant) if grant.is_active_at(now) => {
                grant.state = GrantState::Revoked { at: now };
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn retained(&self) -> Result<u64> {
        Ok(self.grants.read().await.len() as u64)
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::links::models::GrantStatus;
    use crate::shared::test_helpers::t0;
    use chrono::Duration;

    fn record(issued_at: DateTime<Utc>, minutes: i64) -> GrantRecord {
        GrantRecord {
            id: Uuid::now_v7(),
            object_name: "report.pdf".to_string(),
            url_digest: "cd".repeat(32),
            issued_at,
            expires_at: issued_at + Duration::minutes(minutes),
            state: GrantState::Issued,
        }
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let store = MemoryGrantStore::new(10);
        let grant = record(t0(), 15);

        store.insert(grant.clone(), t0()).await.unwrap();
        let err = store.insert(grant, t0()).await.unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(store.retained().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_full_store_reclaims_expired_records_first() {
        let store = MemoryGrantStore::new(2);
        store.insert(record(t0(), 1), t0()).await.unwrap();
        store.insert(record(t0(), 60), t0()).await.unwrap();

        let later = t0() + Duration::minutes(5);
        store.insert(record(later, 15), later).await.unwrap();

        assert_eq!(store.retained().await.unwrap(), 2);
        assert_eq!(store.list_active(later).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_full_store_of_active_grants_is_exhausted() {
        let store = MemoryGrantStore::new(2);
        store.insert(record(t0(), 60), t0()).await.unwrap();
        store.insert(record(t0(), 60), t0()).await.unwrap();

        let err = store.insert(record(t0(), 60), t0()).await.unwrap_err();

        assert!(matches!(err, AppError::StorageExhausted(_)));
        assert_eq!(store.retained().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_revoke_marks_state_and_purge_removes_it() {
        let store = MemoryGrantStore::new(10);
        let grant = record(t0(), 15);
        let id = grant.id;
        store.insert(grant, t0()).await.unwrap();

        assert!(store.revoke(id, t0()).await.unwrap());
        assert!(!store.revoke(id, t0()).await.unwrap());

        {
            let grants = store.grants.read().await;
            assert_eq!(grants[&id].status_at(t0()), GrantStatus::Revoked);
        }

        assert_eq!(store.purge_inactive(t0()).await.unwrap(), 1);
        assert_eq!(store.purge_inactive(t0()).await.unwrap(), 0);
        assert_eq!(store.retained().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_revoke_of_expired_grant_is_refused() {
        let store = MemoryGrantStore::new(10);
        let grant = record(t0(), 15);
        let id = grant.id;
        store.insert(grant, t0()).await.unwrap();

        let after_expiry = t0() + Duration::minutes(16);
        assert!(!store.revoke(id, after_expiry).await.unwrap());
    }
}
