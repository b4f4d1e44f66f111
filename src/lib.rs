//! ESP32-S3 firmware glue for the DHT11 telemetry reporter
//!
//! Peripheral bring-up, Wi-Fi and the network stack live here. Everything
//! hardware-independent is in `reporter-core`.

#![no_std]

extern crate alloc;

pub mod clock;
pub mod config;
pub mod hardware;
pub mod net;
