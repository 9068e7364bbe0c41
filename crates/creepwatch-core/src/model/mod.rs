// ── Domain model ──
//
// Canonical representations of everything the pipeline tracks. Raw API
// records are converted into these types at the fetch boundary (see
// `convert`); consumers never touch `creepwatch_api` types directly.

pub mod device;
pub mod key;

pub use device::WirelessDevice;
pub use key::{DeviceKey, MacAddress};
