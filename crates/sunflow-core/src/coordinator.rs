// ── Polling coordinator ──
//
// Full lifecycle management for one polled device or feed. Owns the
// fetch client for its mode, the snapshot store, the retry policy, and
// the background poll task. Single-flight by construction: one
// in-flight fetch, one snapshot, no overlap between cycles.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use sunflow_api::{CloudClient, TextClient, TransportConfig};

use crate::config::{FetchSource, PollerConfig};
use crate::convert::snapshot_from_cloud;
use crate::error::CoreError;
use crate::model::{Snapshot, Value};
use crate::parse::parse_text_feed;
use crate::retry::run_with_retry;
use crate::store::SnapshotStore;

const EVENT_CHANNEL_SIZE: usize = 64;

// ── PollEvent ────────────────────────────────────────────────────────

/// Notifications broadcast to subscribers after each poll cycle.
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// A reading id appeared that no prior snapshot contained.
    /// Emitted once per id, before the accompanying [`Updated`](Self::Updated).
    ReadingDiscovered { id: String },

    /// The snapshot was replaced after a successful cycle.
    Updated { new_ids: Vec<String> },

    /// A cycle exhausted its retry budget. The previous snapshot is
    /// retained; `message` preserves the underlying error chain.
    UpdateFailed { message: String },
}

// ── Coordinator ──────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc`. Construct with [`new`](Self::new),
/// then [`start`](Self::start) to perform the first (synchronous)
/// refresh and spawn the background loop. Multiple coordinators are
/// fully independent and share nothing.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: PollerConfig,
    fetcher: Fetcher,
    store: SnapshotStore,
    event_tx: broadcast::Sender<PollEvent>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// The mode-specific fetch client, fixed at construction.
enum Fetcher {
    Text(TextClient),
    Cloud(CloudClient),
}

impl Coordinator {
    /// Create a coordinator from configuration. Does NOT fetch --
    /// call [`start()`](Self::start) to obtain the first snapshot and
    /// begin polling.
    pub fn new(config: PollerConfig) -> Result<Self, CoreError> {
        config.validate()?;

        let transport = TransportConfig {
            timeout: config.timeout,
        };

        let fetcher = match &config.source {
            FetchSource::TextEndpoint { url, bearer_token } => Fetcher::Text(TextClient::new(
                url.clone(),
                bearer_token.clone(),
                &transport,
            )?),
            FetchSource::CloudDirect {
                credentials,
                region,
            } => Fetcher::Cloud(CloudClient::new(*region, credentials.clone(), &transport)?),
        };

        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);

        Ok(Self {
            inner: Arc::new(CoordinatorInner {
                config,
                fetcher,
                store: SnapshotStore::new(),
                event_tx,
                cancel: CancellationToken::new(),
                task: Mutex::new(None),
            }),
        })
    }

    /// Access the coordinator configuration.
    pub fn config(&self) -> &PollerConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Perform the first refresh synchronously, then spawn the
    /// background poll loop.
    ///
    /// Blocks until the first snapshot is obtained -- callers always
    /// get data or an explicit startup failure. On failure, nothing is
    /// spawned and `start` may be called again. A zero poll interval
    /// skips the background loop (one-shot use).
    pub async fn start(&self) -> Result<(), CoreError> {
        self.refresh_now().await?;

        let mut task = self.inner.task.lock().await;
        if task.is_none() && !self.inner.config.poll_interval.is_zero() {
            let coordinator = self.clone();
            let cancel = self.inner.cancel.clone();
            *task = Some(tokio::spawn(poll_task(coordinator, cancel)));
        }

        info!(
            mode = self.inner.config.source.mode_name(),
            readings = self.inner.store.snapshot().len(),
            "coordinator started"
        );
        Ok(())
    }

    /// Stop the background loop and abandon any in-flight cycle.
    ///
    /// The token cache needs no cleanup (memory-only); the snapshot
    /// remains readable after stopping.
    pub async fn stop(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.task.lock().await.take() {
            let _ = handle.await;
        }
        debug!("coordinator stopped");
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// Run one full poll cycle now: fetch (with retry), replace the
    /// snapshot, notify subscribers.
    ///
    /// On terminal failure the previous snapshot is untouched and an
    /// [`UpdateFailed`](PollEvent::UpdateFailed) event is broadcast
    /// before the error is returned.
    pub async fn refresh_now(&self) -> Result<(), CoreError> {
        let result = run_with_retry(&self.inner.config.retry, || self.fetch_snapshot()).await;

        match result {
            Ok(snapshot) => {
                let new_ids = self.inner.store.replace(snapshot);
                for id in &new_ids {
                    debug!(id = %id, "discovered new reading");
                    let _ = self.inner.event_tx.send(PollEvent::ReadingDiscovered {
                        id: id.clone(),
                    });
                }
                let _ = self.inner.event_tx.send(PollEvent::Updated { new_ids });
                Ok(())
            }
            Err(err) => {
                let _ = self.inner.event_tx.send(PollEvent::UpdateFailed {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// One fetch attempt, dispatched by mode. Wrapped by the retry
    /// controller in [`refresh_now`](Self::refresh_now).
    async fn fetch_snapshot(&self) -> Result<Snapshot, CoreError> {
        match &self.inner.fetcher {
            Fetcher::Text(client) => {
                let body = client.fetch_raw().await?;
                Ok(parse_text_feed(&body))
            }
            Fetcher::Cloud(client) => {
                let resp = client.latest_data().await?;
                Ok(snapshot_from_cloud(&resp, Utc::now()))
            }
        }
    }

    // ── Snapshot access ──────────────────────────────────────────────

    /// The current snapshot. Cheap -- clones an `Arc`.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.store.snapshot()
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.inner.store.subscribe()
    }

    /// Subscribe to snapshot replacements as a `Stream`.
    pub fn readings(&self) -> crate::stream::SnapshotStream {
        self.inner.store.subscribe_stream()
    }

    /// Subscribe to per-cycle events (updates, discoveries, failures).
    pub fn events(&self) -> broadcast::Receiver<PollEvent> {
        self.inner.event_tx.subscribe()
    }

    /// The synthetic online flag (cloud-direct mode only).
    pub fn device_online(&self) -> Option<bool> {
        self.snapshot().device_online()
    }

    /// Current value for a reading id.
    pub fn value(&self, id: &str) -> Option<Value> {
        self.snapshot().value(id).cloned()
    }

    /// Current unit for a reading id.
    pub fn unit(&self, id: &str) -> Option<String> {
        self.snapshot().unit(id).map(str::to_owned)
    }

    /// When the last successful refresh completed.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.inner.store.last_refresh()
    }

    /// How stale the current snapshot is.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.inner.store.data_age()
    }

    // ── Setup-time validation ────────────────────────────────────────

    /// Validate a configuration without constructing a coordinator.
    ///
    /// Cloud-direct mode performs one authentication round-trip with
    /// the tighter validation timeout; text mode is checked
    /// structurally (the feed may legitimately be empty or
    /// temporarily down at setup time).
    pub async fn validate(config: &PollerConfig) -> Result<(), CoreError> {
        config.validate()?;

        match &config.source {
            FetchSource::CloudDirect {
                credentials,
                region,
            } => {
                let transport = TransportConfig::for_validation();
                let client = CloudClient::new(*region, credentials.clone(), &transport)?;
                client.validate_credentials().await?;
                Ok(())
            }
            FetchSource::TextEndpoint { .. } => Ok(()),
        }
    }
}

// ── Background task ──────────────────────────────────────────────────

/// Drive poll cycles on the configured interval until cancelled.
///
/// Cycles never overlap: the next tick is awaited only after the
/// previous cycle (including its retry delays) completes, and missed
/// ticks are delayed rather than burst.
async fn poll_task(coordinator: Coordinator, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(coordinator.inner.config.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                // Cancellation abandons an in-flight cycle instead of
                // blocking shutdown on its timeouts and retry delays.
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    result = coordinator.refresh_now() => {
                        if let Err(e) = result {
                            warn!(error = %e, "periodic refresh failed; keeping last snapshot");
                        }
                    }
                }
            }
        }
    }
}
