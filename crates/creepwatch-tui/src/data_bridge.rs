//! Data bridge — connects [`Monitor`] streams to TUI actions.
//!
//! Runs as a background task: starts the monitor, then forwards every row
//! snapshot, watermark advance, and state transition as an [`Action`]
//! through the TUI's action channel. Stops the monitor on cancellation so
//! no merge can land against a torn-down display.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use creepwatch_core::{Monitor, MonitorState};

use crate::action::{Action, SensorStatus};

/// Spawn the data bridge for the given monitor.
pub async fn spawn_data_bridge(
    monitor: Monitor,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let _ = action_tx.send(Action::StatusChanged(SensorStatus::Starting));

    if let Err(e) = monitor.start().await {
        warn!(error = %e, "failed to start monitor");
        let _ = action_tx.send(Action::StatusChanged(SensorStatus::Failed(e.to_string())));
        return;
    }

    let _ = action_tx.send(Action::StatusChanged(SensorStatus::Polling));

    let mut rows = monitor.rows();
    let mut watermark = monitor.watermark();
    let mut state = monitor.state();

    // Push the initial snapshot so the screen has data immediately.
    let _ = action_tx.send(Action::RowsUpdated(rows.current().clone()));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(snap) = rows.changed() => {
                let _ = action_tx.send(Action::RowsUpdated(snap));
            }

            Ok(()) = watermark.changed() => {
                let mark = *watermark.borrow_and_update();
                let _ = action_tx.send(Action::WatermarkAdvanced(mark));
            }

            Ok(()) = state.changed() => {
                let status = match *state.borrow_and_update() {
                    MonitorState::Polling => SensorStatus::Polling,
                    MonitorState::Stopped => SensorStatus::Stopped,
                    MonitorState::Idle => SensorStatus::Starting,
                };
                let _ = action_tx.send(Action::StatusChanged(status));
            }
        }
    }

    monitor.stop().await;
    debug!("data bridge shut down");
}
