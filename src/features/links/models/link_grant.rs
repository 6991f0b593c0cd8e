use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Recorded lifecycle state of a grant
///
/// Expiry is never stored: it is derived from `expires_at` at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantState {
    Issued,
    Revoked { at: DateTime<Utc> },
}

/// Effective status of a grant at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantStatus {
    Active,
    Expired,
    Revoked,
}

/// Grant data handed to the registry; the registry assigns `id` and digest
pub struct NewGrant {
    pub object_name: String,
    pub signed_url: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A registered grant as the registry stores and lists it
///
/// Carries only the digest of the signed URL; the URL itself has no field here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantRecord {
    pub id: Uuid,
    pub object_name: String,
    pub url_digest: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub state: GrantState,
}

impl GrantRecord {
    pub fn status_at(&self, now: DateTime<Utc>) -> GrantStatus {
        match self.state {
            GrantState::Revoked { .. } => GrantStatus::Revoked,
            GrantState::Issued if now < self.expires_at => GrantStatus::Active,
            GrantState::Issued => GrantStatus::Expired,
        }
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status_at(now) == GrantStatus::Active
    }
}

/// Result of a successful issuance: the only value that holds the raw URL
pub struct IssuedGrant {
    pub grant: GrantRecord,
    pub signed_url: String,
}

impl fmt::Debug for IssuedGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedGrant")
            .field("grant", &self.grant)
            .field("signed_url", &"<redacted>")
            .finish()
    }
}

/// Order grants newest first, ties broken by id (UUID v7 is time ordered)
pub fn sort_newest_first(grants: &mut [GrantRecord]) {
    grants.sort_by(|a, b| {
        b.issued_at
            .cmp(&a.issued_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
