// ── Wireless device domain type ──

use serde::{Deserialize, Serialize};

use super::key::{DeviceKey, MacAddress};
use crate::geo::GeoPoint;

/// A wireless device as last reported by the sensor, normalized from the
/// raw device-view record.
///
/// Device type stays a free-form string ("Wi-Fi AP", "BTLE", ...) — the
/// sensor's phy plugins define an open set and we never branch on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WirelessDevice {
    pub key: DeviceKey,

    /// Advertised name (SSID for APs). May be empty.
    pub name: String,

    pub device_type: String,

    pub mac: MacAddress,

    /// Manufacturer resolved from the OUI, or "Unknown".
    pub manufacturer: String,

    /// Last observed signal strength in dBm, absent if the device has
    /// produced no recent signal.
    pub last_signal: Option<i32>,

    /// Epoch seconds of the last update the sensor recorded. Drives the
    /// fetch watermark.
    pub last_time: i64,

    /// Southwestern-most recorded position, if any.
    pub min_loc: Option<GeoPoint>,

    /// Northeastern-most recorded position, if any.
    pub max_loc: Option<GeoPoint>,

    /// Most recent recorded position, if any.
    pub last_loc: Option<GeoPoint>,
}

impl WirelessDevice {
    /// True if all three location extents are on record.
    ///
    /// A device that fails this is invisible to the drift pipeline — it
    /// cannot be scored, so it is never projected.
    pub fn has_location(&self) -> bool {
        self.min_loc.is_some() && self.max_loc.is_some() && self.last_loc.is_some()
    }
}
