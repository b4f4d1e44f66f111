//! Hardware abstraction traits

use embassy_time::Duration;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::dht11::Dht11;
use crate::error::{PostError, SensorError};
use crate::model::{SensorReading, Timestamp};
use crate::request::HttpRequest;

/// Trait for temperature/humidity sensors
pub trait HumiditySensor {
    /// Blocking poll of one sample
    fn read(&mut self) -> Result<SensorReading, SensorError>;
}

impl<P, D> HumiditySensor for Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn read(&mut self) -> Result<SensorReading, SensorError> {
        Dht11::read(self)
    }
}

/// Trait for the wall-clock source
pub trait WallClock {
    fn now(&self) -> Timestamp;
}

/// What came back from the server, for logging only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseSummary {
    pub status: Option<u16>,
    pub bytes: usize,
}

/// Trait for the one-shot HTTP transport
///
/// One call opens a connection, writes the request, drains the reply and
/// closes. Implementations never retry.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn post(&mut self, request: &HttpRequest) -> Result<ResponseSummary, PostError>;
}

/// Trait for cooperative sleeping
#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&mut self, duration: Duration);
}
