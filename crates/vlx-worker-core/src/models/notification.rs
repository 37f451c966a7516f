use serde::{Deserialize, Serialize};

use crate::config::WorkerConfig;

/// Action id of the "update now" button.
pub const ACTION_UPDATE: &str = "update";

/// Action id of the "later" button.
pub const ACTION_LATER: &str = "later";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// Payload attached to the notification, read back on click.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NotificationData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

impl NotificationOptions {
    /// Options of the "new version available" notification.
    pub fn update_available(config: &WorkerConfig, version: &str, download_url: Option<&str>) -> Self {
        let notification = &config.notification;
        Self {
            body: notification.render_body(&config.app_name, version),
            icon: notification.icon.clone(),
            badge: notification.badge.clone(),
            vibrate: notification.vibrate.clone(),
            data: NotificationData {
                url: download_url.map(str::to_string),
            },
            actions: vec![
                NotificationAction {
                    action: ACTION_UPDATE.to_string(),
                    title: notification.update_label.clone(),
                },
                NotificationAction {
                    action: ACTION_LATER.to_string(),
                    title: notification.later_label.clone(),
                },
            ],
        }
    }
}

/// A user interaction with a shown notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationClick {
    pub title: String,
    /// Chosen action id. None for a click on the notification body.
    pub action: Option<String>,
    pub data: NotificationData,
}

impl NotificationClick {
    pub fn is_update(&self) -> bool {
        self.action.as_deref() == Some(ACTION_UPDATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_available_options() {
        let config = WorkerConfig::default();
        let options = NotificationOptions::update_available(&config, "v1.1.0", Some("https://x/y"));

        assert_eq!(options.body, "VLX Inventario v1.1.0 está disponible. Toca para actualizar.");
        assert_eq!(options.icon, "/icon-192.png");
        assert_eq!(options.badge, "/icon-192.png");
        assert_eq!(options.vibrate, vec![200, 100, 200]);
        assert_eq!(options.data.url.as_deref(), Some("https://x/y"));

        let actions: Vec<(&str, &str)> = options
            .actions
            .iter()
            .map(|a| (a.action.as_str(), a.title.as_str()))
            .collect();
        assert_eq!(actions, vec![("update", "Actualizar ahora"), ("later", "Más tarde")]);
    }

    #[test]
    fn test_click_action() {
        let mut click = NotificationClick {
            title: "t".to_string(),
            action: Some(ACTION_UPDATE.to_string()),
            data: NotificationData::default(),
        };
        assert!(click.is_update());

        click.action = Some(ACTION_LATER.to_string());
        assert!(!click.is_update());

        click.action = None;
        assert!(!click.is_update());
    }
}
