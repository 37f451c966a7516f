//! Worker configuration management.
//!
//! This module holds the compiled-in deployment settings of the worker: the
//! application id and version that name the cache bucket, the assets to
//! pre-cache, the release endpoint to poll and the notification text.
//!
//! Configuration is stored at `~/.config/vlx-worker/config.json`. A missing
//! file yields the defaults of the production deployment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::version::VersionPolicy;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "vlx-worker";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "VLX_WORKER_CONFIG";

/// Default recurring sync interval: once an hour.
const DEFAULT_PERIODIC_SYNC_SECS: u64 = 3600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Prefix of the cache bucket name.
    pub app_id: String,
    /// Running application version, without the `v` prefix.
    pub version: String,
    /// Human-readable application name used in notifications.
    pub app_name: String,
    /// Origin the worker is scoped to. Relative asset paths resolve against it.
    pub origin: String,
    /// Paths pre-cached at install time.
    pub assets: Vec<String>,
    /// Latest-release endpoint polled by the sync handlers.
    pub release_url: String,
    /// Requests to this host go network-first.
    pub api_host: String,
    /// Release API responses whose path contains this trigger an update check.
    pub latest_release_path: String,
    /// Tag carried by sync events that should trigger an update check.
    pub sync_tag: String,
    pub notification: NotificationConfig,
    pub version_policy: VersionPolicy,
    /// Optional network timeout. None leaves failures to the transport.
    pub request_timeout_secs: Option<u64>,
    /// How often the native host fires the periodic sync.
    pub periodic_sync_interval_secs: u64,
}

/// Text and presentation of the "new version" notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub title: String,
    /// Body template. `{app}` and `{version}` are substituted.
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub update_label: String,
    pub later_label: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: "🎉 Nueva versión disponible".to_string(),
            body: "{app} {version} está disponible. Toca para actualizar.".to_string(),
            icon: "/icon-192.png".to_string(),
            badge: "/icon-192.png".to_string(),
            vibrate: vec![200, 100, 200],
            update_label: "Actualizar ahora".to_string(),
            later_label: "Más tarde".to_string(),
        }
    }
}

impl NotificationConfig {
    pub fn render_body(&self, app_name: &str, version: &str) -> String {
        self.body
            .replace("{app}", app_name)
            .replace("{version}", version)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            app_id: "vlx-inventario".to_string(),
            version: "1.0.0".to_string(),
            app_name: "VLX Inventario".to_string(),
            origin: "http://localhost".to_string(),
            assets: vec![
                "/".to_string(),
                "/index.html".to_string(),
                "/manifest.json".to_string(),
                "/icon-192.png".to_string(),
                "/icon-512.png".to_string(),
            ],
            release_url: "https://api.github.com/repos/cparedes12/inventario-apk/releases/latest"
                .to_string(),
            api_host: "api.github.com".to_string(),
            latest_release_path: "/releases/latest".to_string(),
            sync_tag: "check-update".to_string(),
            notification: NotificationConfig::default(),
            version_policy: VersionPolicy::default(),
            request_timeout_secs: None,
            periodic_sync_interval_secs: DEFAULT_PERIODIC_SYNC_SECS,
        }
    }
}

impl WorkerConfig {
    /// Load from the default location (or `VLX_WORKER_CONFIG` when set)
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Self = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Check the fields that later code parses.
    pub fn validate(&self) -> Result<()> {
        if self.app_id.is_empty() || self.version.is_empty() {
            anyhow::bail!("app_id and version must not be empty");
        }
        self.origin_url()?;
        Url::parse(&self.release_url)
            .with_context(|| format!("Invalid release URL: {}", self.release_url))?;
        for asset in &self.assets {
            self.resolve(asset)
                .with_context(|| format!("Invalid asset path: {}", asset))?;
        }
        Ok(())
    }

    /// Name of the live cache bucket: `<app-id>-v<version>`.
    pub fn cache_name(&self) -> String {
        format!("{}-v{}", self.app_id, self.version)
    }

    pub fn current_version(&self) -> &str {
        &self.version
    }

    pub fn origin_url(&self) -> Result<Url> {
        Url::parse(&self.origin).with_context(|| format!("Invalid origin: {}", self.origin))
    }

    /// Resolve a path or absolute URL against the configured origin.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        Ok(self.origin_url()?.join(path)?)
    }

    /// Requests to the release API bypass the cache-first strategy.
    pub fn is_release_api(&self, url: &Url) -> bool {
        url.host_str() == Some(self.api_host.as_str())
    }

    /// Release API responses on this path carry the latest release metadata.
    pub fn is_latest_release(&self, url: &Url) -> bool {
        self.is_release_api(url) && url.path().contains(&self.latest_release_path)
    }
}
