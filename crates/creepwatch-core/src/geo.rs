// ── Geographic primitives ──
//
// Haversine great-circle distance on a spherical Earth. The per-unit
// radius constants follow the widely-used njj/haversine values, so
// thresholds tuned elsewhere carry over unchanged.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A geographic point. Kismet serializes geopoints as `[lon, lat]`; this
/// type exists so the rest of the crate never has to remember that order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl From<creepwatch_api::LonLat> for GeoPoint {
    fn from([lon, lat]: creepwatch_api::LonLat) -> Self {
        Self { lon, lat }
    }
}

/// Distance unit for thresholds and display.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Unit {
    Km,
    #[default]
    Mile,
    Meter,
    Nmi,
}

impl Unit {
    /// Earth radius in this unit (spherical approximation).
    fn earth_radius(self) -> f64 {
        match self {
            Self::Km => 6371.0,
            Self::Mile => 3960.0,
            Self::Meter => 6_371_000.0,
            Self::Nmi => 3440.0,
        }
    }

    /// Short label for table headers, e.g. `"mi"`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Km => "km",
            Self::Mile => "mi",
            Self::Meter => "m",
            Self::Nmi => "nmi",
        }
    }
}

/// Great-circle distance between two points, in the given unit.
///
/// Pure spherical haversine. Callers must have excluded sentinel/missing
/// points already; non-finite input is a contract violation, not an error
/// condition.
pub fn haversine(a: GeoPoint, b: GeoPoint, unit: Unit) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * unit.earth_radius() * h.sqrt().asin()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    const SF: GeoPoint = GeoPoint {
        lon: -122.4194,
        lat: 37.7749,
    };
    const OAKLAND: GeoPoint = GeoPoint {
        lon: -122.2712,
        lat: 37.8044,
    };

    #[test]
    fn identical_points_are_zero_in_every_unit() {
        for unit in Unit::iter() {
            assert_eq!(haversine(SF, SF, unit), 0.0, "unit {unit}");
        }
    }

    #[test]
    fn distance_is_symmetric() {
        for unit in Unit::iter() {
            let ab = haversine(SF, OAKLAND, unit);
            let ba = haversine(OAKLAND, SF, unit);
            assert!((ab - ba).abs() < 1e-12, "unit {unit}: {ab} vs {ba}");
        }
    }

    #[test]
    fn km_to_mile_ratio() {
        let km = haversine(SF, OAKLAND, Unit::Km);
        let mile = haversine(SF, OAKLAND, Unit::Mile);
        let ratio = km / mile;
        // 6371/3960, which is the usual 1.609 within the spherical constants
        assert!((ratio - 1.608_84).abs() < 1e-3, "ratio {ratio}");
    }

    #[test]
    fn sf_to_oakland_sanity() {
        // Roughly 8.3 miles across the bay
        let mile = haversine(SF, OAKLAND, Unit::Mile);
        assert!((8.0..9.0).contains(&mile), "got {mile}");
        let m = haversine(SF, OAKLAND, Unit::Meter);
        assert!((13_000.0..14_500.0).contains(&m), "got {m}");
    }

    #[test]
    fn unit_round_trips_through_strings() {
        for unit in Unit::iter() {
            let s = unit.to_string();
            assert_eq!(s.parse::<Unit>().unwrap(), unit);
        }
        assert_eq!("nmi".parse::<Unit>().unwrap(), Unit::Nmi);
        assert!("furlong".parse::<Unit>().is_err());
    }
}
