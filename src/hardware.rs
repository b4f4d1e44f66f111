use esp_hal::{
    delay::Delay,
    gpio::{AnyPin, DriveMode, Flex, InputConfig, OutputConfig, Pull},
};
use reporter_core::dht11::Dht11;
use reporter_core::traits::HumiditySensor;
use reporter_core::{MacAddress, SensorError, SensorReading};

pub struct Dht11Hardware<'a> {
    sensor: Dht11<Flex<'a>, Delay>,
}

impl<'a> Dht11Hardware<'a> {
    pub fn new<DATA>(data_gpio: DATA) -> Self
    where
        DATA: Into<AnyPin<'a>>,
    {
        let data_pin: AnyPin<'a> = data_gpio.into();

        // Open drain with pull-up: both sides may pull the line low.
        let mut line = Flex::new(data_pin);
        line.apply_output_config(
            &OutputConfig::default()
                .with_drive_mode(DriveMode::OpenDrain)
                .with_pull(Pull::Up),
        );
        line.apply_input_config(&InputConfig::default().with_pull(Pull::Up));
        line.set_high();
        line.set_output_enable(true);
        line.set_input_enable(true);

        Self {
            sensor: Dht11::new(line, Delay::new()),
        }
    }
}

impl HumiditySensor for Dht11Hardware<'_> {
    /// The whole transaction, release wait included, runs with interrupts
    /// masked so Wi-Fi work cannot stretch the pulses being timed.
    fn read(&mut self) -> Result<SensorReading, SensorError> {
        critical_section::with(|_| self.sensor.read())
    }
}

/// Factory base MAC burned into efuse.
pub fn factory_mac() -> MacAddress {
    MacAddress(esp_hal::efuse::Efuse::mac_address())
}
