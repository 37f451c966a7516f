use futures::future::join_all;
use tracing::{debug, info, warn};

use super::{ServiceWorker, WorkerError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateReport {
    pub kept: String,
    /// Stale buckets a deletion was issued for.
    pub deleted: Vec<String>,
}

impl ServiceWorker {
    /// Delete every bucket except the live one, then claim open pages.
    ///
    /// Deletions run concurrently and are awaited together; individual
    /// failures are logged but do not fail activation.
    pub async fn activate(&self) -> Result<ActivateReport, WorkerError> {
        let names = self.caches.keys().await?;
        let stale: Vec<String> = names
            .into_iter()
            .filter(|name| name.as_str() != &*self.cache_name)
            .collect();

        let deletions = stale.iter().map(|name| async move {
            info!(cache = %name, "Deleting stale cache");
            if let Err(e) = self.caches.delete(name).await {
                debug!(cache = %name, error = %e, "Stale cache deletion failed");
            }
        });
        join_all(deletions).await;

        if let Err(e) = self.clients.claim().await {
            warn!(error = %e, "Failed to claim clients");
        }

        Ok(ActivateReport {
            kept: self.cache_name.to_string(),
            deleted: stale,
        })
    }
}
