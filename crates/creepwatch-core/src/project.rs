// ── Row projection ──
//
// Maps a device record plus its drift score into a display row, applying
// the "show only creeps" filter. Pure given its inputs.

use serde::{Deserialize, Serialize};

use crate::geo::haversine;
use crate::model::{DeviceKey, WirelessDevice};
use crate::settings::Settings;

/// One row of the live view. Identity is `key`; everything else is
/// replaceable display state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreepRow {
    pub key: DeviceKey,
    pub ssid: String,
    pub device_type: String,
    pub macaddr: String,
    pub manufacturer: String,
    pub rssi: Option<i32>,
    pub lat: f64,
    pub lon: f64,
    /// Min↔max location spread in the configured unit — the creep score.
    pub distance: f64,
}

/// Project a device into a display row, or `None` if it should not appear.
///
/// Skips devices missing any location extent, then devices under the
/// threshold when `show_only_creeps` is set (the threshold is inclusive:
/// a spread of exactly `threshold_distance` is a creep).
///
/// The score is the distance between `min_loc` and `max_loc` — the
/// maximum historical spread — while the displayed position is
/// `last_loc`. That asymmetry is intentional: a device that has been
/// carried across town and back scores high even when it is currently
/// right next to the sensor.
pub fn project(device: &WirelessDevice, settings: &Settings) -> Option<CreepRow> {
    let (Some(min_loc), Some(max_loc), Some(last_loc)) =
        (device.min_loc, device.max_loc, device.last_loc)
    else {
        return None;
    };

    let distance = haversine(min_loc, max_loc, settings.unit);

    if settings.show_only_creeps && distance < settings.threshold_distance {
        return None;
    }

    Some(CreepRow {
        key: device.key.clone(),
        ssid: device.name.clone(),
        device_type: device.device_type.clone(),
        macaddr: device.mac.to_string(),
        manufacturer: device.manufacturer.clone(),
        rssi: device.last_signal,
        lat: last_loc.lat,
        lon: last_loc.lon,
        distance,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geo::{GeoPoint, Unit};
    use crate::model::MacAddress;

    /// A device whose min/max spread is roughly `miles` miles, pointing
    /// due north from a fixed origin. One degree of latitude ≈ 69.13
    /// miles under the 3960-mile sphere.
    fn device_with_spread(miles: f64) -> WirelessDevice {
        let origin = GeoPoint { lon: -122.0, lat: 37.0 };
        let north = GeoPoint {
            lon: -122.0,
            lat: 37.0 + miles / 69.13,
        };
        WirelessDevice {
            key: "dev_1".into(),
            name: "EvilTwin".into(),
            device_type: "Wi-Fi AP".into(),
            mac: MacAddress::new("aa:bb:cc:dd:ee:ff"),
            manufacturer: "Acme".into(),
            last_signal: Some(-55),
            last_time: 1_700_000_000,
            min_loc: Some(origin),
            max_loc: Some(north),
            last_loc: Some(origin),
        }
    }

    fn creeps_only() -> Settings {
        Settings {
            unit: Unit::Mile,
            threshold_distance: 0.2,
            show_only_creeps: true,
            ..Settings::default()
        }
    }

    #[test]
    fn missing_min_loc_is_never_projected() {
        let mut device = device_with_spread(5.0);
        device.min_loc = None;
        assert!(project(&device, &Settings::default()).is_none());
        assert!(project(&device, &creeps_only()).is_none());
    }

    #[test]
    fn missing_max_or_last_loc_is_never_projected() {
        let mut device = device_with_spread(5.0);
        device.max_loc = None;
        assert!(project(&device, &Settings::default()).is_none());

        let mut device = device_with_spread(5.0);
        device.last_loc = None;
        assert!(project(&device, &Settings::default()).is_none());
    }

    #[test]
    fn threshold_is_inclusive() {
        let settings = creeps_only();

        assert!(project(&device_with_spread(0.15), &settings).is_none());
        assert!(project(&device_with_spread(0.25), &settings).is_some());

        // Exactly at the threshold: included. Pin the threshold to the
        // computed spread so the boundary is bit-exact.
        let device = device_with_spread(0.2);
        let spread = haversine(
            device.min_loc.unwrap(),
            device.max_loc.unwrap(),
            settings.unit,
        );
        let exact = Settings {
            threshold_distance: spread,
            ..creeps_only()
        };
        let row = project(&device, &exact).unwrap();
        assert!((row.distance - spread).abs() < f64::EPSILON);

        // A hair over the spread: excluded.
        let over = Settings {
            threshold_distance: spread + 1e-9,
            ..creeps_only()
        };
        assert!(project(&device, &over).is_none());
    }

    #[test]
    fn unfiltered_is_a_superset_of_filtered() {
        let all = Settings::default();
        let filtered = creeps_only();

        for spread in [0.0, 0.1, 0.19, 0.2, 0.3, 2.0] {
            let device = device_with_spread(spread);
            let in_all = project(&device, &all).is_some();
            let in_filtered = project(&device, &filtered).is_some();
            assert!(
                in_all || !in_filtered,
                "spread {spread}: filtered row missing from unfiltered view"
            );
            // every located device appears in the unfiltered view
            assert!(in_all, "spread {spread} missing from unfiltered view");
        }
    }

    #[test]
    fn row_displays_last_position_not_extremes() {
        let device = device_with_spread(1.0);
        let row = project(&device, &Settings::default()).unwrap();
        let last = device.last_loc.unwrap();
        assert!((row.lat - last.lat).abs() < f64::EPSILON);
        assert!((row.lon - last.lon).abs() < f64::EPSILON);
        // but the score reflects the min↔max spread
        assert!((row.distance - 1.0).abs() < 0.01);
    }

    #[test]
    fn row_carries_identity_and_signal() {
        let device = device_with_spread(1.0);
        let row = project(&device, &Settings::default()).unwrap();
        assert_eq!(row.key, device.key);
        assert_eq!(row.macaddr, "aa:bb:cc:dd:ee:ff");
        assert_eq!(row.rssi, Some(-55));
    }
}
