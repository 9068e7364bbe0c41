//! All possible UI actions. Actions are the sole mechanism for state mutation.

use creepwatch_core::{DeviceKey, RowSnapshot};

/// Sensor connection status as seen by the TUI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SensorStatus {
    #[default]
    Starting,
    Polling,
    Stopped,
    Failed(String),
}

/// Everything that can happen in the UI or arrive from the data bridge.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ───────────────────────────────────────────────────
    Quit,
    Resize(u16, u16),
    Tick,
    Render,

    // ── Overlays ────────────────────────────────────────────────────
    ToggleHelp,

    // ── From the data bridge ────────────────────────────────────────
    StatusChanged(SensorStatus),
    RowsUpdated(RowSnapshot),
    WatermarkAdvanced(i64),

    // ── Row activation ──────────────────────────────────────────────
    /// The row-click / Enter path: open the detail view for this device.
    OpenDetail(DeviceKey),
    CloseDetail,
}
