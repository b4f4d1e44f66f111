#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::{clock::CpuClock, timer::timg::TimerGroup};
use log::{error, info, warn};

use dht_reporter::{
    clock::{SystemClock, TimerSleeper},
    config, hardware, net,
};
use reporter_core::{DeviceIdentity, Reporter};

/// DHT11 needs a second after power-up before it answers.
const SENSOR_WARM_UP: Duration = Duration::from_secs(1);

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

async fn park() -> ! {
    loop {
        Timer::after(Duration::from_secs(1)).await;
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);

    info!("=== DHT11 Reporter ===");

    // Initialize RTOS timer for embassy
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let config = config::reporter_config();
    let sensor = hardware::Dht11Hardware::new(peripherals.GPIO4);

    let network = match net::start(&spawner, peripherals.WIFI, config::wifi_credentials()) {
        Ok(network) => network,
        Err(e) => {
            error!("Network setup failed: {}", e);
            park().await
        }
    };

    info!("Factory MAC: {}", hardware::factory_mac());
    let identity = DeviceIdentity::new(config.device_id, config.device_name, network.mac);
    info!("MAC: {}", identity.mac_address());

    net::wait_for_ip(network.stack).await;

    let mut clock = SystemClock::new();
    match net::sync_time(network.stack, config.ntp_server).await {
        Ok(unix) => {
            clock.set_unix_time(unix);
            info!("Clock set from {}: {}", config.ntp_server, unix);
        }
        Err(e) => warn!("Time sync failed ({}); timestamps count from the epoch", e),
    }

    Timer::after(SENSOR_WARM_UP).await;

    let transport = net::TcpTransport::new(network.stack, &config);
    Reporter::new(config, identity, sensor, transport, clock, TimerSleeper)
        .run()
        .await
}
