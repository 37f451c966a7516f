use tracing::{debug, info, warn};

use super::{ServiceWorker, WorkerError};
use crate::models::NotificationClick;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The notification was closed and nothing else happened.
    Dismissed,
    /// The update action opened the download URL.
    Opened { url: String },
}

impl ServiceWorker {
    /// Close the clicked notification; on the update action, open the
    /// download URL it carries.
    pub async fn handle_notification_click(
        &self,
        click: &NotificationClick,
    ) -> Result<ClickOutcome, WorkerError> {
        if let Err(e) = self.registration.close_notification(&click.title).await {
            warn!(error = %e, "Failed to close notification");
        }

        if !click.is_update() {
            debug!(action = ?click.action, "Notification dismissed");
            return Ok(ClickOutcome::Dismissed);
        }

        let Some(url) = click.data.url.as_deref() else {
            warn!("Update action without a download URL");
            return Ok(ClickOutcome::Dismissed);
        };

        info!(url = url, "Opening update download");
        self.clients.open_window(url).await?;
        Ok(ClickOutcome::Opened {
            url: url.to_string(),
        })
    }
}
