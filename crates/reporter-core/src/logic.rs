//! Reporting loop (hardware-independent)

use embassy_time::Duration;
use log::{error, info};

use crate::config::ReporterConfig;
use crate::error::PostError;
use crate::model::DeviceIdentity;
use crate::request::HttpRequest;
use crate::traits::{HumiditySensor, ResponseSummary, Sleeper, Transport, WallClock};

/// Countdown after each measurement: ticks from this value down to zero.
pub const COUNTDOWN_FROM: u32 = 10;
pub const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReporterState {
    Registering,
    Measuring,
}

/// What one measuring cycle ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Sent(ResponseSummary),
    SendFailed(PostError),
    SensorFailed,
}

pub struct Reporter<S, T, C, Z> {
    config: ReporterConfig,
    identity: DeviceIdentity,
    sensor: S,
    transport: T,
    clock: C,
    sleeper: Z,
    state: ReporterState,
}

impl<S, T, C, Z> Reporter<S, T, C, Z>
where
    S: HumiditySensor,
    T: Transport,
    C: WallClock,
    Z: Sleeper,
{
    pub fn new(
        config: ReporterConfig,
        identity: DeviceIdentity,
        sensor: S,
        transport: T,
        clock: C,
        sleeper: Z,
    ) -> Self {
        Self {
            config,
            identity,
            sensor,
            transport,
            clock,
            sleeper,
            state: ReporterState::Registering,
        }
    }

    pub fn state(&self) -> ReporterState {
        self.state
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Runs until the device resets.
    pub async fn run(mut self) -> ! {
        loop {
            self.step().await;
        }
    }

    /// One registration attempt, or one full measuring cycle including the countdown.
    pub async fn step(&mut self) {
        match self.state {
            ReporterState::Registering => {
                let _ = self.register().await;
            }
            ReporterState::Measuring => {
                self.measure().await;
                self.countdown().await;
            }
        }
    }

    /// Announces the device once. The reporter moves on to measuring whatever the outcome.
    pub async fn register(&mut self) -> Result<ResponseSummary, PostError> {
        info!(
            "Registering device {} ({}) as {}",
            self.identity.device_id(),
            self.identity.device_name(),
            self.identity.mac_address()
        );
        let request = HttpRequest::registration(&self.config, &self.identity);
        let result = self.send(&request).await;
        self.state = ReporterState::Measuring;
        result
    }

    /// Polls the sensor and posts the sample. Nothing is sent when the sensor fails.
    pub async fn measure(&mut self) -> CycleOutcome {
        let timestamp = self.clock.now();

        let reading = match self.sensor.read() {
            Ok(reading) => reading,
            Err(e) => {
                error!("Could not read data from sensor: {}", e);
                return CycleOutcome::SensorFailed;
            }
        };

        info!("MAC: {}", self.identity.mac_address());
        info!(
            "Humidity: {}% Temp: {}C",
            reading.humidity(),
            reading.temperature()
        );

        let request =
            HttpRequest::measurement(&self.config, &self.identity, &reading, &timestamp);
        log::debug!("sending:\n{}", request.as_str());

        match self.send(&request).await {
            Ok(summary) => CycleOutcome::Sent(summary),
            Err(e) => CycleOutcome::SendFailed(e),
        }
    }

    pub async fn countdown(&mut self) {
        for remaining in (0..=COUNTDOWN_FROM).rev() {
            info!("{}... ", remaining);
            self.sleeper.sleep(TICK).await;
        }
        info!("Starting again!");
    }

    async fn send(&mut self, request: &HttpRequest) -> Result<ResponseSummary, PostError> {
        match self.transport.post(request).await {
            Ok(summary) => {
                match summary.status {
                    Some(code) => info!(
                        "POST {} -> {} ({} bytes)",
                        request.path(),
                        code,
                        summary.bytes
                    ),
                    None => info!(
                        "POST {} -> no status line ({} bytes)",
                        request.path(),
                        summary.bytes
                    ),
                }
                Ok(summary)
            }
            Err(e) => {
                error!("POST {} failed: {}", request.path(), e);
                self.sleeper.sleep(e.backoff()).await;
                Err(e)
            }
        }
    }
}
