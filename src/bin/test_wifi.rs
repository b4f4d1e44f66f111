#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer, with_timeout};
use esp_backtrace as _;
use esp_hal::{clock::CpuClock, timer::timg::TimerGroup};

use dht_reporter::{config, net};
use reporter_core::traits::Transport;
use reporter_core::{DeviceIdentity, HttpRequest, PostError, ReporterConfig, Timestamp};

extern crate alloc;

const DHCP_TIMEOUT: Duration = Duration::from_secs(30);
/// TEST-NET-1 (RFC 5737): routed nowhere, so a SYN is never answered.
const UNREACHABLE_IP: &str = "192.0.2.1";
/// Connect gives up after 5 s; anything far past that is a hang.
const FAILED_POST_BOUND: Duration = Duration::from_secs(15);

esp_bootloader_esp_idf::esp_app_desc!();

async fn park(ok: bool) -> ! {
    esp_println::println!("\nConnectivity check {}. Looping...", if ok { "passed" } else { "FAILED" });
    loop {
        Timer::after(Duration::from_secs(1)).await;
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    esp_println::println!("=== Wi-Fi Connectivity Check ===");

    let config = config::reporter_config();
    let network = match net::start(&spawner, peripherals.WIFI, config::wifi_credentials()) {
        Ok(network) => network,
        Err(e) => {
            esp_println::println!("  ✗ network setup: {}", e);
            park(false).await
        }
    };
    esp_println::println!("  ✓ radio up, station MAC {}", network.mac);

    match with_timeout(DHCP_TIMEOUT, net::wait_for_ip(network.stack)).await {
        Ok(ip) => esp_println::println!("  ✓ DHCP address {}", ip),
        Err(_) => {
            esp_println::println!("  ✗ no DHCP lease within {}s", DHCP_TIMEOUT.as_secs());
            park(false).await
        }
    }

    match net::sync_time(network.stack, config.ntp_server).await {
        Ok(unix) => esp_println::println!(
            "  ✓ SNTP time {}",
            Timestamp::from_unix_secs(unix)
        ),
        Err(e) => esp_println::println!("  ~ SNTP unavailable: {}", e),
    }

    let identity = DeviceIdentity::new(config.device_id, config.device_name, network.mac);
    let mut transport = net::TcpTransport::new(network.stack, &config);
    let request = HttpRequest::registration(&config, &identity);

    let ok = match transport.post(&request).await {
        Ok(summary) => {
            esp_println::println!(
                "  ✓ POST {} to {} answered {:?} ({} bytes)",
                request.path(),
                config.host(),
                summary.status,
                summary.bytes
            );
            true
        }
        Err(e) => {
            esp_println::println!("  ✗ POST {} to {}: {}", request.path(), config.host(), e);
            false
        }
    };

    let unreachable = ReporterConfig {
        server_ip: UNREACHABLE_IP,
        ..config
    };
    let mut transport = net::TcpTransport::new(network.stack, &unreachable);
    let request = HttpRequest::registration(&unreachable, &identity);

    let failed_fast = match with_timeout(FAILED_POST_BOUND, transport.post(&request)).await {
        Ok(Err(PostError::Connect)) => {
            esp_println::println!("  ✓ POST to {} failed with connect error", unreachable.host());
            true
        }
        Ok(other) => {
            esp_println::println!("  ✗ POST to {} returned {:?}", unreachable.host(), other);
            false
        }
        Err(_) => {
            esp_println::println!(
                "  ✗ POST to {} still pending after {}s",
                unreachable.host(),
                FAILED_POST_BOUND.as_secs()
            );
            false
        }
    };

    park(ok && failed_fast).await
}
