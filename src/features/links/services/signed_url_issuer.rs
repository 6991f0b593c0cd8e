use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::modules::storage::ObjectStorage;
use crate::shared::clock::Clock;

/// A freshly minted signed URL, not yet registered
pub struct IssuedUrl {
    pub signed_url: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for IssuedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedUrl")
            .field("signed_url", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Mints signed GET URLs through the storage backend; holds no state
///
/// The backend checks a presigned URL against its own clock, so it may keep
/// honouring the URL for as long as that clock lags ours. The recorded
/// `expires_at` is therefore `issued_at + validity + skew_tolerance`; the
/// presigned expiry itself is exactly `validity`. A grant can outlive its URL
/// in the registry by at most the tolerance plus the signing latency, and
/// backend clocks lagging by no more than the tolerance never make a live URL
/// look expired.
pub struct SignedUrlIssuer {
    storage: Arc<dyn ObjectStorage>,
    clock: Arc<dyn Clock>,
    max_validity: Duration,
    skew_tolerance: Duration,
}

impl SignedUrlIssuer {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        clock: Arc<dyn Clock>,
        max_validity: Duration,
        skew_tolerance: Duration,
    ) -> Self {
        Self {
            storage,
            clock,
            max_validity,
            skew_tolerance,
        }
    }

    pub fn max_validity(&self) -> Duration {
        self.max_validity
    }

    /// Check a requested validity against `0 < validity <= max_validity`
    ///
    /// Validity is signed in whole seconds.
    pub fn validate_validity(&self, validity: Duration) -> Result<u32> {
        let secs = validity.num_seconds();

        if secs <= 0 {
            return Err(AppError::InvalidDuration(
                "Expiration must be a positive duration".to_string(),
            ));
        }

        if validity > self.max_validity {
            return Err(AppError::InvalidDuration(format!(
                "Expiration must not exceed {} minutes",
                self.max_validity.num_minutes()
            )));
        }

        u32::try_from(secs).map_err(|_| {
            AppError::InvalidDuration("Expiration is too large to sign".to_string())
        })
    }

    /// Mint a signed URL for `object_name` valid for `validity`
    ///
    /// `issued_at` is read after the backend has signed, so the signature's
    /// own timestamp never falls after it.
    pub async fn issue(&self, object_name: &str, validity: Duration) -> Result<IssuedUrl> {
        if object_name.is_empty() {
            return Err(AppError::Validation(
                "Object name must not be empty".to_string(),
            ));
        }

        let expiry_secs = self.validate_validity(validity)?;

        if !self.storage.object_exists(object_name).await? {
            return Err(AppError::ObjectNotFound(format!(
                "Object '{}' does not exist in bucket '{}'",
                object_name,
                self.storage.bucket_name()
            )));
        }

        let signed_url = self.storage.presign_get(object_name, expiry_secs).await?;

        let issued_at = self.clock.now();
        let expires_at =
            issued_at + Duration::seconds(i64::from(expiry_secs)) + self.skew_tolerance;

        debug!(
            "Signed URL minted for '{}', valid {}s until {}",
            object_name, expiry_secs, expires_at
        );

        Ok(IssuedUrl {
            signed_url,
            issued_at,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{t0, FakeStorage, ManualClock};

    fn issuer(storage: Arc<FakeStorage>) -> SignedUrlIssuer {
        SignedUrlIssuer::new(
            storage,
            Arc::new(ManualClock::new(t0())),
            Duration::minutes(60),
            Duration::zero(),
        )
    }

    #[tokio::test]
    async fn test_expires_at_is_issued_at_plus_validity() {
        let storage = Arc::new(FakeStorage::with_objects(&["report.pdf"]));
        let issuer = issuer(storage);

        for minutes in [1, 15, 59, 60] {
            let issued = issuer
                .issue("report.pdf", Duration::minutes(minutes))
                .await
                .unwrap();

            assert_eq!(issued.issued_at, t0());
            assert_eq!(issued.expires_at, issued.issued_at + Duration::minutes(minutes));
            assert!(issued
                .signed_url
                .contains(&format!("X-Amz-Expires={}", minutes * 60)));
        }
    }

    #[tokio::test]
    async fn test_skew_tolerance_extends_recorded_expiry_only() {
        let storage = Arc::new(FakeStorage::with_objects(&["report.pdf"]));
        let issuer = SignedUrlIssuer::new(
            storage,
            Arc::new(ManualClock::new(t0())),
            Duration::minutes(60),
            Duration::seconds(30),
        );

        let issued = issuer
            .issue("report.pdf", Duration::minutes(15))
            .await
            .unwrap();

        assert_eq!(
            issued.expires_at,
            issued.issued_at + Duration::minutes(15) + Duration::seconds(30)
        );
        // The backend still signs for exactly the requested validity
        assert!(issued.signed_url.contains("X-Amz-Expires=900&"));
    }

    #[tokio::test]
    async fn test_invalid_durations_never_reach_backend() {
        let storage = Arc::new(FakeStorage::with_objects(&["report.pdf"]));
        let issuer = issuer(storage.clone());

        for validity in [
            Duration::zero(),
            Duration::minutes(-5),
            Duration::milliseconds(500),
            Duration::minutes(61),
        ] {
            let err = issuer.issue("report.pdf", validity).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidDuration(_)), "{:?}", validity);
        }

        assert_eq!(storage.presign_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let storage = Arc::new(FakeStorage::with_objects(&["report.pdf"]));
        let issuer = issuer(storage.clone());

        let err = issuer
            .issue("missing.pdf", Duration::minutes(15))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ObjectNotFound(_)));
        assert_eq!(storage.presign_calls(), 0);
    }

    #[tokio::test]
    async fn test_backend_outage_is_backend_unavailable() {
        let storage = Arc::new(FakeStorage::with_objects(&["report.pdf"]));
        storage.set_unavailable(true);
        let issuer = issuer(storage);

        let err = issuer
            .issue("report.pdf", Duration::minutes(15))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BackendUnavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_name_is_rejected() {
        let storage = Arc::new(FakeStorage::with_objects(&["report.pdf"]));
        let issuer = issuer(storage);

        let err = issuer.issue("", Duration::minutes(15)).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_two_issuances_yield_distinct_urls() {
        let storage = Arc::new(FakeStorage::with_objects(&["report.pdf"]));
        let issuer = issuer(storage);

        let a = issuer.issue("report.pdf", Duration::minutes(15)).await.unwrap();
        let b = issuer.issue("report.pdf", Duration::minutes(15)).await.unwrap();

        assert_ne!(a.signed_url, b.signed_url);
    }
}
