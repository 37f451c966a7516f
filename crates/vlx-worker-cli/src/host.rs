//! Native host wiring for the worker.
//!
//! Binds the core handlers to the disk cache, the reqwest fetcher and an
//! in-process platform whose events are printed to stdout.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::info;

use vlx_worker_core::models::{ACTION_UPDATE, NotificationClick, NotificationData};
use vlx_worker_core::{
    CacheStorage, DiskCacheStorage, HttpFetcher, LocalPlatform, PlatformEvent, Request,
    RequestMode, ServiceWorker, UpdateOutcome, WorkerConfig,
};

/// Buckets live under `<cache dir>/buckets`.
const BUCKETS_DIR: &str = "buckets";

/// A command dispatched to the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Install,
    Activate,
    Fetch { url: String, no_cors: bool },
    CheckUpdate,
    Sync { tag: String },
    PeriodicSync { tag: String },
    Watch,
    Click { action: Option<String>, url: Option<String> },
    Caches,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let arg = |i: usize, what: &str| -> Result<String> {
            args.get(i)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Missing {}", what))
        };

        let name = args.first().map(String::as_str).unwrap_or("help");
        match name {
            "install" => Ok(Command::Install),
            "activate" => Ok(Command::Activate),
            "fetch" => Ok(Command::Fetch {
                url: arg(1, "<url>")?,
                no_cors: args.iter().skip(2).any(|a| a == "--no-cors"),
            }),
            "check-update" => Ok(Command::CheckUpdate),
            "sync" => Ok(Command::Sync { tag: arg(1, "<tag>")? }),
            "periodic-sync" => Ok(Command::PeriodicSync { tag: arg(1, "<tag>")? }),
            "watch" => Ok(Command::Watch),
            "click" => {
                let action = arg(1, "<update|later|->")?;
                Ok(Command::Click {
                    action: (action != "-").then_some(action),
                    url: args.get(2).cloned(),
                })
            }
            "caches" => Ok(Command::Caches),
            other => anyhow::bail!("Unknown command: {}\n\n{}", other, USAGE),
        }
    }
}

pub const USAGE: &str = "\
Usage: vlx-worker <command>

Commands:
  install                     Pre-cache the application assets
  activate                    Delete stale caches and claim pages
  fetch <url> [--no-cors]     Send a request through the interceptor
  check-update                Poll the release endpoint once
  sync <tag>                  Fire a one-off background sync
  periodic-sync <tag>         Fire a periodic sync
  watch                       Fire the periodic sync on its interval
  click <update|later|-> [url]  Simulate a notification click
  caches                      List cache buckets and entries";

pub struct Host {
    worker: ServiceWorker,
    storage: Arc<DiskCacheStorage>,
    events: mpsc::UnboundedReceiver<PlatformEvent>,
}

impl Host {
    pub async fn new(config: WorkerConfig, cache_dir: &Path) -> Result<Self> {
        let storage = Arc::new(
            DiskCacheStorage::new(cache_dir.join(BUCKETS_DIR))
                .context("Failed to open cache storage")?,
        );
        let fetcher = Arc::new(HttpFetcher::from_config(&config)?);
        let (platform, events) = LocalPlatform::new();

        // The console itself acts as the one open page
        platform.connect(&config.origin).await;

        let worker = ServiceWorker::new(
            config,
            storage.clone(),
            fetcher,
            platform.clone(),
            platform,
        );
        Ok(Self {
            worker,
            storage,
            events,
        })
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Install => {
                let report = self.worker.install().await?;
                println!("Installed {} ({} assets)", report.cache_name, report.cached.len());
                for url in &report.cached {
                    println!("  {}", url);
                }
            }
            Command::Activate => {
                let report = self.worker.activate().await?;
                println!("Active cache: {}", report.kept);
                for name in &report.deleted {
                    println!("  deleted {}", name);
                }
            }
            Command::Fetch { url, no_cors } => {
                let url = self.worker.config().resolve(&url)?;
                let mode = if no_cors { RequestMode::NoCors } else { RequestMode::Cors };
                let mut outcome = self
                    .worker
                    .handle_fetch(Request::get(url.clone()).with_mode(mode))
                    .await;
                let update = outcome.settle().await;
                match &outcome.response {
                    Some(response) => println!(
                        "{} {} ({:?}, {:?}, {} bytes)",
                        response.status,
                        url,
                        outcome.source,
                        response.response_type,
                        response.body.len()
                    ),
                    None => println!("Network error: {} ({:?})", url, outcome.source),
                }
                if let Some(update) = update {
                    print_update(&update);
                }
            }
            Command::CheckUpdate => {
                print_update(&self.worker.check_release_endpoint().await);
            }
            Command::Sync { tag } => match self.worker.handle_sync(&tag).await {
                Some(update) => print_update(&update),
                None => println!("No handler for sync tag {:?}", tag),
            },
            Command::PeriodicSync { tag } => match self.worker.handle_periodic_sync(&tag).await {
                Some(update) => print_update(&update),
                None => println!("No handler for periodic sync tag {:?}", tag),
            },
            Command::Watch => return self.watch().await,
            Command::Click { action, url } => {
                let click = NotificationClick {
                    title: self.worker.config().notification.title.clone(),
                    action,
                    data: NotificationData { url },
                };
                let outcome = self.worker.handle_notification_click(&click).await?;
                println!("{:?}", outcome);
            }
            Command::Caches => self.list_caches().await?,
        }
        self.print_events();
        Ok(())
    }

    async fn watch(&mut self) -> Result<()> {
        let secs = self.worker.config().periodic_sync_interval_secs.max(1);
        let tag = self.worker.config().sync_tag.clone();
        info!(interval_secs = secs, tag = %tag, "Watching for updates");

        let mut interval = tokio::time::interval(Duration::from_secs(secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Some(update) = self.worker.handle_periodic_sync(&tag).await {
                print_update(&update);
            }
            self.print_events();
        }
    }

    async fn list_caches(&self) -> Result<()> {
        println!("Cache root: {}", self.storage.root().display());
        for name in self.storage.keys().await? {
            let live = if name == self.worker.cache_name() { " (live)" } else { "" };
            let bucket = self.storage.open(&name).await?;
            let keys = bucket.keys().await?;
            println!("{}{} - {} entries", name, live, keys.len());
            for key in keys {
                println!("  {}", key);
            }
        }
        Ok(())
    }

    fn print_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                PlatformEvent::SkippedWaiting => println!("[platform] skip waiting"),
                PlatformEvent::ClientsClaimed { count } => {
                    println!("[platform] claimed {} client(s)", count)
                }
                PlatformEvent::MessagePosted { client_id, message } => {
                    let json = serde_json::to_string(&message).unwrap_or_default();
                    println!("[message -> {}] {}", client_id, json);
                }
                PlatformEvent::NotificationShown { title, options } => {
                    println!("[notification] {}: {}", title, options.body);
                    for action in &options.actions {
                        let marker = if action.action == ACTION_UPDATE { "*" } else { " " };
                        println!("  {} {} ({})", marker, action.title, action.action);
                    }
                }
                PlatformEvent::NotificationClosed { title } => {
                    println!("[notification] closed: {}", title)
                }
                PlatformEvent::WindowOpened { url } => println!("[window] open {}", url),
            }
        }
    }
}

fn print_update(outcome: &UpdateOutcome) {
    match outcome {
        UpdateOutcome::UpToDate { version } => println!("Up to date ({})", version),
        UpdateOutcome::MissingVersion => println!("Release metadata has no version tag"),
        UpdateOutcome::UpdateAvailable {
            version,
            download_url,
            clients_notified,
            notification_shown,
        } => {
            println!("Update available: {}", version);
            if let Some(url) = download_url {
                println!("  download: {}", url);
            }
            println!(
                "  notified {} client(s), notification {}",
                clients_notified,
                if *notification_shown { "shown" } else { "not shown" }
            );
        }
        UpdateOutcome::Failed { reason } => println!("Update check failed: {}", reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(&args(&["install"])).unwrap(), Command::Install);
        assert_eq!(
            Command::parse(&args(&["fetch", "/index.html", "--no-cors"])).unwrap(),
            Command::Fetch { url: "/index.html".to_string(), no_cors: true }
        );
        assert_eq!(
            Command::parse(&args(&["sync", "check-update"])).unwrap(),
            Command::Sync { tag: "check-update".to_string() }
        );
        assert_eq!(
            Command::parse(&args(&["click", "-"])).unwrap(),
            Command::Click { action: None, url: None }
        );
        assert_eq!(
            Command::parse(&args(&["click", "update", "https://x/y"])).unwrap(),
            Command::Click {
                action: Some("update".to_string()),
                url: Some("https://x/y".to_string())
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse(&args(&["fetch"])).is_err());
        assert!(Command::parse(&args(&["bogus"])).is_err());
        assert!(Command::parse(&args(&[])).is_err());
    }
}
