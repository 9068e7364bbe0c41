// creepwatch-api: Async Rust client for the Kismet REST API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{HttpdCredentials, KismetClient};
pub use error::Error;
pub use models::{DeviceSummary, LonLat, SystemStatus};
