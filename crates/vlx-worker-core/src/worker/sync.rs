use tracing::debug;

use super::{ServiceWorker, UpdateOutcome};

impl ServiceWorker {
    /// One-off background sync. Returns None for tags this worker ignores.
    pub async fn handle_sync(&self, tag: &str) -> Option<UpdateOutcome> {
        if tag != self.config.sync_tag {
            debug!(tag = tag, "Ignoring sync event");
            return None;
        }
        debug!(tag = tag, "Background sync");
        Some(self.check_release_endpoint().await)
    }

    /// Recurring sync. The interval is negotiated by the host.
    pub async fn handle_periodic_sync(&self, tag: &str) -> Option<UpdateOutcome> {
        if tag != self.config.sync_tag {
            debug!(tag = tag, "Ignoring periodic sync event");
            return None;
        }
        debug!(tag = tag, "Periodic sync");
        Some(self.check_release_endpoint().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClientMessage;
    use crate::platform::PlatformEvent;
    use crate::test_support::{cors, release_json, Harness};

    const LATEST: &str = "https://api.github.com/repos/cparedes12/inventario-apk/releases/latest";

    #[tokio::test]
    async fn test_sync_checks_release_endpoint() {
        let mut h = Harness::with_defaults();
        let client = h.platform.connect("http://localhost/").await;
        h.fetcher.route_response(
            LATEST,
            cors(LATEST, 200, &release_json("v1.1.0", Some("https://x/y"))),
        );

        let outcome = h.worker.handle_sync("check-update").await.unwrap();
        assert!(matches!(outcome, UpdateOutcome::UpdateAvailable { .. }));
        assert!(h.drain_events().contains(&PlatformEvent::MessagePosted {
            client_id: client,
            message: ClientMessage::update_available("v1.1.0", Some("https://x/y")),
        }));
    }

    #[tokio::test]
    async fn test_periodic_sync_matches_one_off() {
        let h = Harness::with_defaults();
        h.fetcher
            .route_response(LATEST, cors(LATEST, 200, &release_json("v1.0.0", None)));

        let one_off = h.worker.handle_sync("check-update").await;
        let periodic = h.worker.handle_periodic_sync("check-update").await;
        assert_eq!(one_off, periodic);
        assert_eq!(
            periodic,
            Some(UpdateOutcome::UpToDate { version: "v1.0.0".to_string() })
        );
    }

    #[tokio::test]
    async fn test_other_tags_are_ignored() {
        let h = Harness::with_defaults();
        assert_eq!(h.worker.handle_sync("upload-photos").await, None);
        assert_eq!(h.worker.handle_periodic_sync("").await, None);
        assert!(h.fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_sync_offline_does_not_fail() {
        let h = Harness::with_defaults();
        let outcome = h.worker.handle_sync("check-update").await;
        assert!(matches!(outcome, Some(UpdateOutcome::Failed { .. })));
    }
}
