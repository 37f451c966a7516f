//! GitHub latest-release document.
//!
//! Only the fields the update check reads are modeled; everything else in
//! the payload is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseMetadata {
    pub tag_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// None when the payload has no `assets` field at all.
    #[serde(default)]
    pub assets: Option<Vec<ReleaseAsset>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub browser_download_url: Option<String>,
}

impl ReleaseMetadata {
    /// Tag of the release, ignoring empty strings.
    pub fn version(&self) -> Option<&str> {
        self.tag_name.as_deref().filter(|tag| !tag.is_empty())
    }

    /// Download URL of the first asset, if there is one and it has a URL.
    pub fn first_download_url(&self) -> Option<&str> {
        self.assets
            .as_deref()?
            .first()
            .and_then(|asset| asset.browser_download_url.as_deref())
    }
}
