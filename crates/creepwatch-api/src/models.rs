// Kismet API request/response types
//
// Models for the Kismet REST API's device views. Kismet responds with
// whatever fields the request projected, keyed by the final path component
// (or by the requested alias), so every field here uses `#[serde(default)]`
// — a sensor that has never seen GPS simply omits location data.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Field projection ─────────────────────────────────────────────────

/// One entry in a device-view field projection.
///
/// Serializes as either a bare field path (`"kismet.device.base.key"`) or a
/// `[path, alias]` pair, matching the simplified-fields convention of the
/// `devices.json` endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FieldSpec {
    Path(&'static str),
    Aliased(&'static str, &'static str),
}

/// The `{"fields": [...]}` payload posted (form-encoded as `json=...`) to a
/// device view endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct FieldsRequest {
    pub fields: Vec<FieldSpec>,
}

/// The minimal projection needed for drift tracking: identity, name, type,
/// mac, manufacturer, last signal, last-update time, and the three location
/// extents aliased to short names.
pub fn tracking_fields() -> FieldsRequest {
    FieldsRequest {
        fields: vec![
            FieldSpec::Path("kismet.device.base.key"),
            FieldSpec::Path("kismet.device.base.last_time"),
            FieldSpec::Path("kismet.device.base.name"),
            FieldSpec::Path("kismet.device.base.type"),
            FieldSpec::Path("kismet.device.base.macaddr"),
            FieldSpec::Path("kismet.device.base.manuf"),
            FieldSpec::Path("kismet.device.base.signal/kismet.common.signal.last_signal"),
            FieldSpec::Aliased(
                "kismet.device.base.location/kismet.common.location.min_loc/kismet.common.location.geopoint",
                "min_loc",
            ),
            FieldSpec::Aliased(
                "kismet.device.base.location/kismet.common.location.max_loc/kismet.common.location.geopoint",
                "max_loc",
            ),
            FieldSpec::Aliased(
                "kismet.device.base.location/kismet.common.location.last/kismet.common.location.geopoint",
                "last_loc",
            ),
        ],
    }
}

// ── Geopoint sentinel handling ───────────────────────────────────────

/// A raw `[longitude, latitude]` pair as Kismet serializes geopoints.
pub type LonLat = [f64; 2];

/// Deserialize a location-extent field, mapping the registry's "no location
/// recorded" sentinel to `None`.
///
/// Kismet emits `0` where a `[lon, lat]` pair would otherwise appear when a
/// device has no location on record. Anything that is not a two-element
/// numeric array is treated as the sentinel — including a literal `0` and
/// `null`. A genuine `[0.0, 0.0]` pair survives; distinguishing that from
/// "missing" is not possible with this encoding and is deliberately not
/// attempted.
fn geopoint_sentinel<'de, D>(deserializer: D) -> Result<Option<LonLat>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(None);
    };
    match (items.first().and_then(Value::as_f64), items.get(1).and_then(Value::as_f64)) {
        (Some(lon), Some(lat)) => Ok(Some([lon, lat])),
        _ => Ok(None),
    }
}

// ── Device summary ───────────────────────────────────────────────────

/// One device record from a `devices.json` view, shaped by
/// [`tracking_fields`].
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSummary {
    #[serde(default, rename = "kismet.device.base.key")]
    pub key: String,

    #[serde(default, rename = "kismet.device.base.last_time")]
    pub last_time: i64,

    #[serde(default, rename = "kismet.device.base.name")]
    pub name: String,

    #[serde(default, rename = "kismet.device.base.type")]
    pub device_type: String,

    #[serde(default, rename = "kismet.device.base.macaddr")]
    pub macaddr: String,

    #[serde(default, rename = "kismet.device.base.manuf")]
    pub manuf: String,

    /// Last observed RSSI in dBm. Kismet keys complex-path fields by the
    /// final component, hence the leaf name here.
    #[serde(default, rename = "kismet.common.signal.last_signal")]
    pub last_signal: Option<i32>,

    #[serde(default, deserialize_with = "geopoint_sentinel")]
    pub min_loc: Option<LonLat>,

    #[serde(default, deserialize_with = "geopoint_sentinel")]
    pub max_loc: Option<LonLat>,

    #[serde(default, deserialize_with = "geopoint_sentinel")]
    pub last_loc: Option<LonLat>,
}

// ── System status ────────────────────────────────────────────────────

/// Subset of `/system/status.json` used as a connectivity/auth probe.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemStatus {
    #[serde(default, rename = "kismet.system.devices.count")]
    pub devices_count: u64,

    #[serde(default, rename = "kismet.system.timestamp.sec")]
    pub timestamp_sec: i64,

    /// Catch-all for the many status fields we don't interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_spec_serializes_bare_and_aliased() {
        let req = FieldsRequest {
            fields: vec![
                FieldSpec::Path("kismet.device.base.key"),
                FieldSpec::Aliased("a/b/c", "short"),
            ],
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(
            v,
            json!({ "fields": ["kismet.device.base.key", ["a/b/c", "short"]] })
        );
    }

    #[test]
    fn zero_sentinel_decodes_to_none() {
        let d: DeviceSummary = serde_json::from_value(json!({
            "kismet.device.base.key": "4202770D_1",
            "kismet.device.base.last_time": 1_700_000_000,
            "min_loc": 0,
            "max_loc": [-122.41, 37.77],
            "last_loc": null,
        }))
        .unwrap();

        assert!(d.min_loc.is_none());
        assert_eq!(d.max_loc, Some([-122.41, 37.77]));
        assert!(d.last_loc.is_none());
    }

    #[test]
    fn literal_origin_pair_is_kept() {
        // [0.0, 0.0] is a real (if dubious) reading; only the scalar 0 is
        // the absence sentinel.
        let d: DeviceSummary = serde_json::from_value(json!({
            "kismet.device.base.key": "k",
            "min_loc": [0.0, 0.0],
        }))
        .unwrap();
        assert_eq!(d.min_loc, Some([0.0, 0.0]));
    }

    #[test]
    fn missing_fields_default() {
        let d: DeviceSummary = serde_json::from_value(json!({
            "kismet.device.base.key": "k",
        }))
        .unwrap();
        assert_eq!(d.last_time, 0);
        assert!(d.name.is_empty());
        assert!(d.last_signal.is_none());
        assert!(d.min_loc.is_none());
    }
}
