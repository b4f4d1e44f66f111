//! DHT11 glue over the `dht-sensor` driver
//!
//! The single-wire protocol itself lives in `dht_sensor::dht11`. This module
//! owns the pin and delay, converts the driver's whole-unit reading into
//! tenths and folds its errors into [`SensorError`].

use dht_sensor::{DhtError, dht11};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::error::SensorError;
use crate::model::SensorReading;

impl From<dht11::Reading> for SensorReading {
    fn from(reading: dht11::Reading) -> Self {
        SensorReading::new(
            i16::from(reading.temperature) * 10,
            i16::from(reading.relative_humidity) * 10,
        )
    }
}

impl<E> From<DhtError<E>> for SensorError {
    fn from(err: DhtError<E>) -> Self {
        match err {
            DhtError::PinError(_) => SensorError::Pin,
            DhtError::ChecksumMismatch => SensorError::ChecksumMismatch,
            DhtError::Timeout => SensorError::Timeout,
        }
    }
}

pub struct Dht11<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    /// `pin` must already be configured as open-drain with a pull-up.
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }

    /// Start pulse, response and decoding in one blocking transaction (~25 ms).
    pub fn read(&mut self) -> Result<SensorReading, SensorError> {
        let reading = dht11::blocking::read(&mut self.delay, &mut self.pin)?;
        // Leave the line idle-high for the next start pulse.
        self.pin.set_high().map_err(|_| SensorError::Pin)?;
        Ok(reading.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    /// Line nobody answers on: the pull-up keeps it high.
    struct IdleLine;

    /// Line whose GPIO refuses every operation.
    struct BrokenPin;

    struct NoDelay;

    #[derive(Debug)]
    struct GpioFault;

    impl embedded_hal::digital::Error for GpioFault {
        fn kind(&self) -> embedded_hal::digital::ErrorKind {
            embedded_hal::digital::ErrorKind::Other
        }
    }

    impl embedded_hal::digital::ErrorType for IdleLine {
        type Error = Infallible;
    }

    impl InputPin for IdleLine {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(true)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(false)
        }
    }

    impl OutputPin for IdleLine {
        fn set_low(&mut self) -> Result<(), Infallible> {
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    impl embedded_hal::digital::ErrorType for BrokenPin {
        type Error = GpioFault;
    }

    impl InputPin for BrokenPin {
        fn is_high(&mut self) -> Result<bool, GpioFault> {
            Err(GpioFault)
        }

        fn is_low(&mut self) -> Result<bool, GpioFault> {
            Err(GpioFault)
        }
    }

    impl OutputPin for BrokenPin {
        fn set_low(&mut self) -> Result<(), GpioFault> {
            Err(GpioFault)
        }

        fn set_high(&mut self) -> Result<(), GpioFault> {
            Err(GpioFault)
        }
    }

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    fn converts_whole_units_to_tenths() {
        let reading = SensorReading::from(dht11::Reading {
            temperature: 21,
            relative_humidity: 60,
        });
        assert_eq!(reading, SensorReading::new(210, 600));
    }

    #[test]
    fn keeps_sign_of_negative_temperature() {
        let reading = SensorReading::from(dht11::Reading {
            temperature: -7,
            relative_humidity: 45,
        });
        assert_eq!(reading.temperature, -70);
        assert_eq!(reading.humidity, 450);
    }

    #[test]
    fn maps_driver_errors() {
        assert_eq!(
            SensorError::from(DhtError::<GpioFault>::PinError(GpioFault)),
            SensorError::Pin
        );
        assert_eq!(
            SensorError::from(DhtError::<GpioFault>::ChecksumMismatch),
            SensorError::ChecksumMismatch
        );
        assert_eq!(
            SensorError::from(DhtError::<GpioFault>::Timeout),
            SensorError::Timeout
        );
    }

    #[test]
    fn times_out_when_sensor_is_absent() {
        let mut sensor = Dht11::new(IdleLine, NoDelay);
        assert_eq!(sensor.read(), Err(SensorError::Timeout));
    }

    #[test]
    fn gpio_failure_is_a_pin_error() {
        let mut sensor = Dht11::new(BrokenPin, NoDelay);
        assert_eq!(sensor.read(), Err(SensorError::Pin));
    }
}
