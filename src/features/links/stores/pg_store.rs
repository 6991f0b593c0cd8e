use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::GrantStore;
use crate::core::error::Result;
use crate::features::links::models::{GrantRecord, GrantState};

/// Database row for `link_grants`
#[derive(Debug, FromRow)]
struct GrantRow {
    id: Uuid,
    object_name: String,
    url_digest: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl From<GrantRow> for GrantRecord {
    fn from(row: GrantRow) -> Self {
        Self {
            id: row.id,
            object_name: row.object_name,
            url_digest: row.url_digest,
            issued_at: row.issued_at,
            expires_at: row.expires_at,
            state: match row.revoked_at {
                Some(at) => GrantState::Revoked { at },
                None => GrantState::Issued,
            },
        }
    }
}

/// PostgreSQL-backed grant store; survives restarts
pub struct PgGrantStore {
    pool: PgPool,
}

impl PgGrantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GrantStore for PgGrantStore {
    async fn insert(&self, record: GrantRecord, _now: DateTime<Utc>) -> Result<()> {
        let revoked_at = match record.state {
            GrantState::Revoked { at } => Some(at),
            GrantState::Issued => None,
        };

        sqlx::query(
            r#"
            INSERT INTO link_grants (id, object_name, url_digest, issued_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id)
        .bind(&record.object_name)
        .bind(&record.url_digest)
        .bind(record.issued_at)
        .bind(record.expires_at)
        .bind(revoked_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<GrantRecord>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT id, object_name, url_digest, issued_at, expires_at, revoked_at
            FROM link_grants
            WHERE revoked_at IS NULL AND expires_at > $1
            ORDER BY issued_at DESC, id DESC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(GrantRecord::from).collect())
    }

    async fn purge_inactive(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM link_grants
            WHERE revoked_at IS NOT NULL OR expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn revoke(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE link_grants
            SET revoked_at = $2
            WHERE id = $1 AND revoked_at IS NULL AND expires_at > $2
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn retained(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_grants")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    fn kind(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::t0;

    #[test]
    fn test_row_maps_revoked_at_to_state() {
        let row = GrantRow {
            id: Uuid::now_v7(),
            object_name: "report.pdf".to_string(),
            url_digest: "ef".repeat(32),
            issued_at: t0(),
            expires_at: t0() + chrono::Duration::minutes(15),
            revoked_at: Some(t0()),
        };

        let record = GrantRecord::from(row);
        assert_eq!(record.state, GrantState::Revoked { at: t0() });
    }
}
