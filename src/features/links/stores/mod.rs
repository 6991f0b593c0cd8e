//! Persistence seam under the link registry.
//!
//! Implementations must make every operation atomic with respect to the
//! others: a listing never observes a half-written record, and a revoke or
//! purge never races an insert into an inconsistent state.

mod memory_store;
mod pg_store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::links::models::GrantRecord;

pub use memory_store::MemoryGrantStore;
pub use pg_store::PgGrantStore;

#[async_trait]
pub trait GrantStore: Send + Sync {
    /// Store a new record. Fails with `StorageExhausted` when full.
    async fn insert(&self, record: GrantRecord, now: DateTime<Utc>) -> Result<()>;

    /// Records active at `now`, in no particular order
    async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<GrantRecord>>;

    /// Remove every record that is expired or revoked at `now`
    async fn purge_inactive(&self, now: DateTime<Utc>) -> Result<u64>;

    /// Mark an active record revoked; `false` if none was active under `id`
    async fn revoke(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool>;

    /// Number of records retained, active or not
    async fn retained(&self) -> Result<u64>;

    /// Short backend name for logs
    fn kind(&self) -> &'static str;
}
