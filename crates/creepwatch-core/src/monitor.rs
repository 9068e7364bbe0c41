// ── Poll monitor ──
//
// Drives the fetch→project→merge cycle against a Kismet sensor. One
// background task owns the watermark and the row table; everything else
// reads snapshots. A fetch is awaited inside the tick loop, so two
// fetches are never in flight and merges can never land out of order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use creepwatch_api::transport::{TlsMode, TransportConfig};
use creepwatch_api::{DeviceSummary, HttpdCredentials, KismetClient};

use crate::config::{SensorConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{DeviceKey, WirelessDevice};
use crate::project::{CreepRow, project};
use crate::settings::Settings;
use crate::table::{RowSnapshot, RowStream, RowTable};

// ── MonitorState ─────────────────────────────────────────────────────

/// Lifecycle state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Created, not yet started.
    Idle,
    /// Steady state: fetch → apply → wait.
    Polling,
    /// Stopped by the consumer; no further merges will land.
    Stopped,
}

// ── Monitor ──────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc`. Owns the poll task, the watermark, and
/// the row table for the lifetime of the hosting view.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    config: SensorConfig,
    settings: Settings,
    table: RowTable,
    state: watch::Sender<MonitorState>,
    /// Highest `last_time` processed so far; the next fetch window starts
    /// here. Begins at `initial_window_secs` (which may be relative).
    watermark: watch::Sender<i64>,
    cancel: CancellationToken,
    task_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Monitor {
    /// Create a new Monitor. Does NOT contact the sensor -- call
    /// [`start()`](Self::start) to probe connectivity and begin polling.
    pub fn new(config: SensorConfig, settings: Settings) -> Self {
        let (state, _) = watch::channel(MonitorState::Idle);
        let (watermark, _) = watch::channel(settings.initial_window_secs);

        Self {
            inner: Arc::new(MonitorInner {
                config,
                settings,
                table: RowTable::new(),
                state,
                watermark,
                cancel: CancellationToken::new(),
                task_handle: Mutex::new(None),
            }),
        }
    }

    /// The settings this monitor was started with. Immutable for its
    /// lifetime; edits land on the next restart.
    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Probe the sensor, then start the poll loop.
    ///
    /// The first fetch uses `initial_window_secs` as the window selector
    /// and fires immediately; subsequent fetches use the advancing
    /// watermark, every `poll_interval_ms`.
    pub async fn start(&self) -> Result<(), CoreError> {
        self.inner.settings.validate()?;
        let client = build_client(&self.inner.config)?;

        let status = client.system_status().await?;
        debug!(
            devices = status.devices_count,
            "sensor reachable, starting poll loop"
        );

        let monitor = self.clone();
        let cancel = self.inner.cancel.clone();
        let handle = tokio::spawn(poll_task(monitor, client, cancel));
        *self.inner.task_handle.lock().await = Some(handle);

        let _ = self.inner.state.send(MonitorState::Polling);
        info!(url = %self.inner.config.url, "monitor started");
        Ok(())
    }

    /// Stop polling and join the poll task.
    ///
    /// After this returns, no callback will fire and no merge will land --
    /// the table is frozen at its last state.
    pub async fn stop(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.task_handle.lock().await.take() {
            let _ = handle.await;
        }
        let _ = self.inner.state.send(MonitorState::Stopped);
        debug!("monitor stopped");
    }

    // ── State observation ────────────────────────────────────────────

    /// Subscribe to lifecycle state changes.
    pub fn state(&self) -> watch::Receiver<MonitorState> {
        self.inner.state.subscribe()
    }

    /// Subscribe to watermark advances.
    pub fn watermark(&self) -> watch::Receiver<i64> {
        self.inner.watermark.subscribe()
    }

    // ── Row access (delegates to the table) ──────────────────────────

    /// Subscribe to row snapshot changes.
    pub fn rows(&self) -> RowStream {
        self.inner.table.subscribe()
    }

    /// Current sorted snapshot.
    pub fn rows_snapshot(&self) -> RowSnapshot {
        self.inner.table.snapshot()
    }

    /// Look up a single row (the row-activation path).
    pub fn row(&self, key: &DeviceKey) -> Option<Arc<CreepRow>> {
        self.inner.table.get(key)
    }

    /// Number of rows currently in the view.
    pub fn row_count(&self) -> usize {
        self.inner.table.len()
    }

    // ── Cycle internals ──────────────────────────────────────────────

    /// Run one fetch→apply cycle. Failures reduce to "zero records this
    /// cycle": logged, watermark untouched, next tick proceeds.
    async fn run_cycle(&self, client: &KismetClient) {
        let since = *self.inner.watermark.borrow();
        match client.devices_since(since).await {
            Ok(batch) => self.apply_batch(batch),
            Err(e) => warn!(error = %e, since, "poll cycle failed; view kept as-is"),
        }
    }

    /// Advance the watermark past this batch, then project and merge.
    ///
    /// The watermark covers every record in the batch -- including ones
    /// the projector filters out -- and never regresses; an empty batch
    /// leaves it unchanged.
    fn apply_batch(&self, batch: Vec<DeviceSummary>) {
        if let Some(newest) = batch.iter().map(|d| d.last_time).max() {
            self.inner.watermark.send_if_modified(|w| {
                if newest > *w {
                    *w = newest;
                    true
                } else {
                    false
                }
            });
        }

        let total = batch.len();
        let rows: Vec<CreepRow> = batch
            .into_iter()
            .map(WirelessDevice::from)
            .filter_map(|d| project(&d, &self.inner.settings))
            .collect();

        debug!(
            fetched = total,
            projected = rows.len(),
            watermark = *self.inner.watermark.borrow(),
            "cycle applied"
        );
        self.inner.table.merge(rows);
    }
}

// ── Background task ──────────────────────────────────────────────────

/// The poll loop: one immediate cycle (the interval's first tick fires at
/// once), then one per tick until cancelled. Each cycle is awaited in
/// place -- the serialization guarantee lives here: two fetches are never
/// in flight, and missed ticks are delayed rather than burst.
///
/// Cancellation drops an in-flight cycle at the network boundary, so a
/// hung fetch cannot delay shutdown and its response can never be merged.
async fn poll_task(monitor: Monitor, client: KismetClient, cancel: CancellationToken) {
    let mut interval =
        tokio::time::interval(Duration::from_millis(monitor.inner.settings.poll_interval_ms));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = monitor.run_cycle(&client) => {}
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Build a [`KismetClient`] from the sensor configuration.
fn build_client(config: &SensorConfig) -> Result<KismetClient, CoreError> {
    let transport = TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
        cookie_jar: None, // KismetClient::new adds one automatically
    };

    let credentials = config.credentials.as_ref().map(|c| HttpdCredentials {
        username: c.username.clone(),
        password: c.password.clone(),
    });

    Ok(KismetClient::new(
        config.url.clone(),
        credentials,
        &transport,
    )?)
}
