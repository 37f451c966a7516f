//! Host platform primitives the worker drives but does not own.
//!
//! - `Clients`: the open pages controlled by the worker
//! - `Registration`: lifecycle signals and system notifications
//!
//! `LocalPlatform` implements both in-process and reports every effect as a
//! `PlatformEvent` on a channel, which is how the native host and the tests
//! observe broadcasts, notifications and opened windows.

pub mod local;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ClientMessage, NotificationOptions};

pub use local::{LocalPlatform, PlatformEvent};

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Client {0} is no longer open")]
    ClientGone(String),

    #[error("Not supported by this host: {0}")]
    Unsupported(&'static str),

    #[error("Host event channel closed")]
    Closed,
}

/// An open page.
#[async_trait]
pub trait Client: Send + Sync {
    fn id(&self) -> &str;

    fn url(&self) -> &str;

    async fn post_message(&self, message: &ClientMessage) -> Result<(), PlatformError>;
}

#[async_trait]
pub trait Clients: Send + Sync {
    /// Every open page currently controlled by this worker.
    async fn match_all(&self) -> Result<Vec<Arc<dyn Client>>, PlatformError>;

    /// Take control of open pages still served by a previous worker.
    async fn claim(&self) -> Result<(), PlatformError>;

    /// Open a new browsing context at `url`.
    async fn open_window(&self, url: &str) -> Result<(), PlatformError>;
}

#[async_trait]
pub trait Registration: Send + Sync {
    /// Activate without waiting for pages on the previous version to close.
    async fn skip_waiting(&self) -> Result<(), PlatformError>;

    /// Whether this host can display notifications at all.
    fn supports_notifications(&self) -> bool;

    async fn show_notification(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> Result<(), PlatformError>;

    async fn close_notification(&self, title: &str) -> Result<(), PlatformError>;
}
