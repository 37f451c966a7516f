use serde::{Deserialize, Serialize};

/// Structured message posted to every open client page.
///
/// Serialized as `{"type": "UPDATE_AVAILABLE", "version": ..., "downloadUrl": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    UpdateAvailable {
        version: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        download_url: Option<String>,
    },
}

impl ClientMessage {
    pub fn update_available(version: impl Into<String>, download_url: Option<&str>) -> Self {
        ClientMessage::UpdateAvailable {
            version: version.into(),
            download_url: download_url.map(str::to_string),
        }
    }
}
