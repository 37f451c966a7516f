use tracing::{debug, error, info, warn};
use url::Url;

use super::ServiceWorker;
use crate::models::{ClientMessage, NotificationOptions, ReleaseMetadata, Request, Response};

/// Result of one update check. Checks never fail their caller; problems are
/// logged and reported as `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    UpToDate {
        version: String,
    },
    /// The metadata carried no version tag.
    MissingVersion,
    UpdateAvailable {
        version: String,
        download_url: Option<String>,
        /// Number of pages the message reached.
        clients_notified: usize,
        notification_shown: bool,
    },
    Failed {
        reason: String,
    },
}

impl ServiceWorker {
    /// Compare the release metadata in `response` against the running version
    /// and announce a new version to open pages and through a notification.
    pub async fn check_for_update(&self, response: &Response) -> UpdateOutcome {
        let release: ReleaseMetadata = match response.json() {
            Ok(release) => release,
            Err(e) => {
                error!(url = %response.url, error = %e, "Error checking for updates");
                return UpdateOutcome::Failed {
                    reason: format!("Invalid release metadata: {}", e),
                };
            }
        };

        let Some(latest) = release.version() else {
            debug!(url = %response.url, "Release metadata has no tag");
            return UpdateOutcome::MissingVersion;
        };

        let current = self.config.current_version();
        if !self.config.version_policy.is_update(latest, current) {
            debug!(latest = latest, current = current, "Application is up to date");
            return UpdateOutcome::UpToDate {
                version: latest.to_string(),
            };
        }

        if release.assets.is_none() {
            error!(url = %response.url, "Release metadata has no assets field");
            return UpdateOutcome::Failed {
                reason: "Release metadata has no assets field".to_string(),
            };
        }

        info!(latest = latest, current = current, "New version available");
        let download_url = release.first_download_url();

        let message = ClientMessage::update_available(latest, download_url);
        let clients_notified = self.broadcast(&message).await;
        let notification_shown = self.show_update_notification(latest, download_url).await;

        UpdateOutcome::UpdateAvailable {
            version: latest.to_string(),
            download_url: download_url.map(str::to_string),
            clients_notified,
            notification_shown,
        }
    }

    /// Fetch the configured release endpoint and check it.
    pub async fn check_release_endpoint(&self) -> UpdateOutcome {
        let url = match Url::parse(&self.config.release_url) {
            Ok(url) => url,
            Err(e) => {
                error!(url = %self.config.release_url, error = %e, "Invalid release URL");
                return UpdateOutcome::Failed {
                    reason: format!("Invalid release URL: {}", e),
                };
            }
        };

        match self.fetcher.fetch(&Request::get(url)).await {
            Ok(response) => self.check_for_update(&response).await,
            Err(e) => {
                error!(url = %self.config.release_url, error = %e, "Error checking for updates");
                UpdateOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Post `message` to every open page. Returns how many received it.
    async fn broadcast(&self, message: &ClientMessage) -> usize {
        let clients = match self.clients.match_all().await {
            Ok(clients) => clients,
            Err(e) => {
                warn!(error = %e, "Failed to list clients");
                return 0;
            }
        };

        let mut delivered = 0;
        for client in clients {
            match client.post_message(message).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!(client = client.id(), error = %e, "Failed to post message"),
            }
        }
        delivered
    }

    /// Best effort: skipped silently if the host has no notification support.
    async fn show_update_notification(&self, version: &str, download_url: Option<&str>) -> bool {
        if !self.registration.supports_notifications() {
            debug!("Notifications not supported, skipping");
            return false;
        }
        let options = NotificationOptions::update_available(&self.config, version, download_url);
        match self
            .registration
            .show_notification(&self.config.notification.title, &options)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to show update notification");
                false
            }
        }
    }
}
