// creepwatch-core: Drift-tracking pipeline between creepwatch-api and consumers.

pub mod config;
pub mod convert;
pub mod error;
pub mod geo;
pub mod model;
pub mod monitor;
pub mod project;
pub mod settings;
pub mod table;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{Credentials, SensorConfig, TlsVerification};
pub use error::CoreError;
pub use geo::{GeoPoint, Unit, haversine};
pub use model::{DeviceKey, MacAddress, WirelessDevice};
pub use monitor::{Monitor, MonitorState};
pub use project::{CreepRow, project};
pub use settings::Settings;
pub use table::{RowSnapshot, RowStream, RowTable};
