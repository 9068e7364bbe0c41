// ── API-to-domain conversions ──
//
// Bridges raw `creepwatch_api` records into domain types. Normalizes the
// MAC, fills a readable manufacturer for blank OUI lookups, and converts
// the `[lon, lat]` pairs into `GeoPoint`s. Sentinel locations arrive here
// already decoded to `None` and pass through untouched — this layer
// normalizes, it does not filter.

use creepwatch_api::DeviceSummary;

use crate::geo::GeoPoint;
use crate::model::{DeviceKey, MacAddress, WirelessDevice};

impl From<DeviceSummary> for WirelessDevice {
    fn from(d: DeviceSummary) -> Self {
        Self {
            key: DeviceKey::from(d.key),
            name: d.name,
            device_type: d.device_type,
            mac: MacAddress::new(&d.macaddr),
            manufacturer: normalize_manuf(d.manuf),
            last_signal: d.last_signal,
            last_time: d.last_time,
            min_loc: d.min_loc.map(GeoPoint::from),
            max_loc: d.max_loc.map(GeoPoint::from),
            last_loc: d.last_loc.map(GeoPoint::from),
        }
    }
}

/// The sensor reports an empty string or "Unknown" for unresolved OUIs
/// depending on version; collapse both to one spelling.
fn normalize_manuf(raw: String) -> String {
    if raw.trim().is_empty() {
        "Unknown".to_owned()
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> DeviceSummary {
        serde_json::from_value(serde_json::json!({
            "kismet.device.base.key": "4202770D_1",
            "kismet.device.base.last_time": 1_700_000_000,
            "kismet.device.base.name": "CoffeeShopAP",
            "kismet.device.base.type": "Wi-Fi AP",
            "kismet.device.base.macaddr": "AA:BB:CC:DD:EE:FF",
            "kismet.device.base.manuf": "",
            "kismet.common.signal.last_signal": -70,
            "min_loc": [-122.5, 37.7],
            "max_loc": 0,
            "last_loc": [-122.4, 37.8],
        }))
        .expect("valid summary")
    }

    #[test]
    fn converts_and_normalizes() {
        let device = WirelessDevice::from(summary());
        assert_eq!(device.key.as_str(), "4202770D_1");
        assert_eq!(device.mac.as_str(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(device.manufacturer, "Unknown");
        assert_eq!(device.last_signal, Some(-70));
        assert_eq!(
            device.min_loc,
            Some(GeoPoint { lon: -122.5, lat: 37.7 })
        );
        assert!(device.max_loc.is_none());
    }

    #[test]
    fn missing_extent_means_no_location() {
        let device = WirelessDevice::from(summary());
        assert!(!device.has_location());
    }
}
