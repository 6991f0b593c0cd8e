use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::features::links::services::LinkRegistry;

/// Background worker that periodically purges expired and revoked grants
pub struct PurgeWorker {
    registry: Arc<LinkRegistry>,
    every: Duration,
}

impl PurgeWorker {
    pub fn new(registry: Arc<LinkRegistry>, every: Duration) -> Self {
        Self { registry, every }
    }

    /// Run until `shutdown` is cancelled
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!("Starting link purge worker (every {:?})", self.every);

        let mut interval = interval(self.every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Link purge worker stopped");
                    return;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.registry.purge_expired().await {
                        tracing::error!("Error purging expired link grants: {:?}", e);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::links::models::NewGrant;
    use crate::features::links::services::UrlDigester;
    use crate::features::links::stores::{GrantStore, MemoryGrantStore};
    use crate::shared::clock::Clock;
    use crate::shared::test_helpers::{t0, ManualClock};

    #[tokio::test]
    async fn test_worker_purges_and_stops_on_cancel() {
        let clock = Arc::new(ManualClock::new(t0()));
        let store = Arc::new(MemoryGrantStore::new(10));
        let registry = Arc::new(LinkRegistry::new(
            store.clone(),
            UrlDigester::from_key(None).unwrap(),
            clock.clone(),
        ));

        registry
            .register(NewGrant {
                object_name: "report.pdf".to_string(),
                signed_url: "https://x?sig=1".to_string(),
                issued_at: clock.now(),
                expires_at: clock.now() + chrono::Duration::minutes(1),
            })
            .await
            .unwrap();
        clock.advance(chrono::Duration::minutes(2));

        let token = CancellationToken::new();
        let worker = PurgeWorker::new(Arc::clone(&registry), Duration::from_millis(10));
        let handle = tokio::spawn(worker.run(token.clone()));

        // The first tick fires immediately
        for _ in 0..50 {
            if store.retained().await.unwrap() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(store.retained().await.unwrap(), 0);

        token.cancel();
        handle.await.unwrap();
    }
}
