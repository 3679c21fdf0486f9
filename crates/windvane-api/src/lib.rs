// windvane-api: Async Rust client for the Ecowitt weather station cloud API

pub mod client;
pub mod error;
pub mod mac;
pub mod models;
pub mod units;

pub use client::{ClientConfig, Credentials, WeatherClient};
pub use error::{Error, ErrorKind};
pub use mac::DeviceIdentifier;
pub use models::{ApiEnvelope, DeviceSummary, SensorRef};
pub use units::{CycleType, UnitOptions};
