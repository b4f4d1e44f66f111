//! Hardware-independent core of the DHT11 telemetry reporter
//!
//! Everything that does not touch an ESP32 peripheral lives here: the data
//! model, the reporter configuration, HTTP/1.0 request building, the DHT11
//! glue over `dht-sensor` (generic over `embedded-hal`), the SNTP codec, the
//! hardware traits and the reporting state machine.
//!
//! The crate is `#![no_std]` with `alloc`, so it builds for the firmware
//! target and for the host, where its unit tests run.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod dht11;
pub mod error;
pub mod logic;
pub mod model;
pub mod request;
pub mod sntp;
pub mod traits;

pub use config::ReporterConfig;
pub use error::{PostError, SensorError, SntpError};
pub use logic::{CycleOutcome, Reporter, ReporterState};
pub use model::{DeviceIdentity, MacAddress, SensorReading, Tenths, Timestamp};
pub use request::HttpRequest;
