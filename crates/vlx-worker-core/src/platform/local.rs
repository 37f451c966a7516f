use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

use super::{Client, Clients, PlatformError, Registration};
use crate::models::{ClientMessage, NotificationOptions};

/// Observable effect of a platform call.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    SkippedWaiting,
    ClientsClaimed { count: usize },
    MessagePosted { client_id: String, message: ClientMessage },
    NotificationShown { title: String, options: NotificationOptions },
    NotificationClosed { title: String },
    WindowOpened { url: String },
}

/// In-process platform: a registry of connected pages plus an event channel.
pub struct LocalPlatform {
    clients: RwLock<Vec<Arc<LocalClient>>>,
    events: mpsc::UnboundedSender<PlatformEvent>,
    notifications_enabled: AtomicBool,
    next_id: AtomicU64,
}

impl LocalPlatform {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<PlatformEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let platform = Arc::new(Self {
            clients: RwLock::new(Vec::new()),
            events: tx,
            notifications_enabled: AtomicBool::new(true),
            next_id: AtomicU64::new(1),
        });
        (platform, rx)
    }

    /// Register an open page and return its client id.
    pub async fn connect(&self, url: &str) -> String {
        let id = format!("client-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let client = Arc::new(LocalClient {
            id: id.clone(),
            url: url.to_string(),
            connected: AtomicBool::new(true),
            events: self.events.clone(),
        });
        self.clients.write().await.push(client);
        debug!(client = %id, url = url, "Client connected");
        id
    }

    pub async fn disconnect(&self, id: &str) -> bool {
        let mut clients = self.clients.write().await;
        let Some(index) = clients.iter().position(|c| c.id == id) else {
            return false;
        };
        let client = clients.remove(index);
        client.connected.store(false, Ordering::Relaxed);
        true
    }

    /// Simulate the notification capability being absent or denied.
    pub fn set_notifications_enabled(&self, enabled: bool) {
        self.notifications_enabled.store(enabled, Ordering::Relaxed);
    }

    fn emit(&self, event: PlatformEvent) -> Result<(), PlatformError> {
        self.events.send(event).map_err(|_| PlatformError::Closed)
    }
}

#[async_trait]
impl Clients for LocalPlatform {
    async fn match_all(&self) -> Result<Vec<Arc<dyn Client>>, PlatformError> {
        Ok(self
            .clients
            .read()
            .await
            .iter()
            .map(|c| c.clone() as Arc<dyn Client>)
            .collect())
    }

    async fn claim(&self) -> Result<(), PlatformError> {
        let count = self.clients.read().await.len();
        self.emit(PlatformEvent::ClientsClaimed { count })
    }

    async fn open_window(&self, url: &str) -> Result<(), PlatformError> {
        self.emit(PlatformEvent::WindowOpened {
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Registration for LocalPlatform {
    async fn skip_waiting(&self) -> Result<(), PlatformError> {
        self.emit(PlatformEvent::SkippedWaiting)
    }

    fn supports_notifications(&self) -> bool {
        self.notifications_enabled.load(Ordering::Relaxed)
    }

    async fn show_notification(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> Result<(), PlatformError> {
        if !self.supports_notifications() {
            return Err(PlatformError::Unsupported("notifications"));
        }
        self.emit(PlatformEvent::NotificationShown {
            title: title.to_string(),
            options: options.clone(),
        })
    }

    async fn close_notification(&self, title: &str) -> Result<(), PlatformError> {
        self.emit(PlatformEvent::NotificationClosed {
            title: title.to_string(),
        })
    }
}

pub struct LocalClient {
    id: String,
    url: String,
    connected: AtomicBool,
    events: mpsc::UnboundedSender<PlatformEvent>,
}

#[async_trait]
impl Client for LocalClient {
    fn id(&self) -> &str {
        &self.id
    }

    fn url(&self) -> &str {
        &self.url
    }

    async fn post_message(&self, message: &ClientMessage) -> Result<(), PlatformError> {
        if !self.connected.load(Ordering::Relaxed) {
            return Err(PlatformError::ClientGone(self.id.clone()));
        }
        self.events
            .send(PlatformEvent::MessagePosted {
                client_id: self.id.clone(),
                message: message.clone(),
            })
            .map_err(|_| PlatformError::Closed)
    }
}
