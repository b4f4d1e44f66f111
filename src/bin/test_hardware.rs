#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;

use dht_reporter::hardware::{self, Dht11Hardware};
use reporter_core::traits::HumiditySensor;
use reporter_core::{
    DeviceIdentity, HttpRequest, MacAddress, ReporterConfig, SensorReading, Timestamp,
};

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

// Test result tracking
struct TestResults {
    passed: u32,
    failed: u32,
    total: u32,
}

impl TestResults {
    fn new() -> Self {
        Self {
            passed: 0,
            failed: 0,
            total: 0,
        }
    }

    fn assert(&mut self, condition: bool, test_name: &str) {
        self.total += 1;
        if condition {
            self.passed += 1;
            esp_println::println!("  ✓ {}", test_name);
        } else {
            self.failed += 1;
            esp_println::println!("  ✗ {} FAILED", test_name);
        }
    }

    fn assert_eq<T: PartialEq + core::fmt::Debug>(&mut self, left: T, right: T, test_name: &str) {
        self.total += 1;
        if left == right {
            self.passed += 1;
            esp_println::println!("  ✓ {}", test_name);
        } else {
            self.failed += 1;
            esp_println::println!("  ✗ {} FAILED: {:?} != {:?}", test_name, left, right);
        }
    }

    fn print_summary(&self) {
        esp_println::println!("\n==========================================");
        esp_println::println!("Test Summary:");
        esp_println::println!("  Total:  {}", self.total);
        esp_println::println!("  Passed: {}", self.passed);
        esp_println::println!("  Failed: {}", self.failed);
        if self.failed == 0 {
            esp_println::println!("\n✓ ALL TESTS PASSED!");
        } else {
            esp_println::println!("\n✗ SOME TESTS FAILED");
        }
        esp_println::println!("==========================================");
    }
}

fn is_mac_text(text: &str) -> bool {
    text.len() == 17
        && text.bytes().enumerate().all(|(idx, b)| {
            if idx % 3 == 2 {
                b == b':'
            } else {
                b.is_ascii_digit() || (b'A'..=b'F').contains(&b)
            }
        })
}

fn test_request_building(results: &mut TestResults) {
    esp_println::println!("\n[TEST] Request building");

    let identity = DeviceIdentity::new(
        "ESP32",
        "ESP32",
        MacAddress([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]),
    );
    let config = ReporterConfig::default();

    let request = HttpRequest::measurement(
        &config,
        &identity,
        &SensorReading::new(215, 602),
        &Timestamp::from_unix_secs(1_704_110_400),
    );
    results.assert_eq(
        request.body(),
        "id=ESP32&t=21.50&h=60.20&timestamp=20240101120000&key=AA:BB:CC:DD:EE:FF",
        "measurement body",
    );
    results.assert(
        request.as_str().starts_with("POST /measurement HTTP/1.0\r\n"),
        "measurement request line",
    );

    let request = HttpRequest::registration(&config, &identity);
    results.assert_eq(
        request.body(),
        "id=ESP32&n=ESP32&k=AA:BB:CC:DD:EE:FF",
        "registration body",
    );
    results.assert(
        request.as_str().contains("Content-Length: 36\r\n\r\n"),
        "registration content length",
    );
}

fn test_identity(results: &mut TestResults) {
    esp_println::println!("\n[TEST] Device identity");

    let mac = hardware::factory_mac();
    esp_println::println!("    Factory MAC: {}", mac);
    results.assert(is_mac_text(mac.to_text().as_str()), "factory MAC format");
    results.assert(mac.0 != [0; 6], "factory MAC is programmed");
}

async fn test_dht11_sensor<DATA>(results: &mut TestResults, data_gpio: DATA)
where
    DATA: Into<esp_hal::gpio::AnyPin<'static>>,
{
    esp_println::println!("\n[TEST] DHT11 Sensor Tests");

    let mut dht11 = Dht11Hardware::new(data_gpio);

    // Sensor is unreliable during its first second
    Timer::after(Duration::from_secs(1)).await;

    esp_println::println!("  Reading DHT11 (5 samples)...");
    let mut readings = heapless::Vec::<SensorReading, 5>::new();
    for i in 0..5 {
        match dht11.read() {
            Ok(reading) => {
                esp_println::println!(
                    "    Sample {}: {}°C {}%",
                    i + 1,
                    reading.temperature(),
                    reading.humidity()
                );
                let _ = readings.push(reading);
            }
            Err(e) => {
                esp_println::println!("    Failed to read sensor: {}", e);
            }
        }
        // DHT11 needs at least a second between samples
        Timer::after(Duration::from_millis(1_500)).await;
    }

    results.assert(readings.len() >= 4, "at least 4 of 5 samples read");

    for reading in readings.iter() {
        results.assert(
            (0..=500).contains(&reading.temperature),
            "temperature in DHT11 range (0-50°C)",
        );
        results.assert(
            (200..=900).contains(&reading.humidity),
            "humidity in DHT11 range (20-90%)",
        );
    }

    if readings.len() >= 2 {
        let min = readings.iter().map(|r| r.temperature).min().unwrap_or(0);
        let max = readings.iter().map(|r| r.temperature).max().unwrap_or(0);
        results.assert(max - min <= 20, "temperature readings stable (within 2°C)");
    }
}

#[esp_rtos::main]
async fn main(_spawner: Spawner) {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default());

    esp_alloc::heap_allocator!(size: 32 * 1024);

    esp_println::println!("\n==========================================");
    esp_println::println!("=== Hardware Unit Test Runner ===");
    esp_println::println!("==========================================");

    let mut results = TestResults::new();

    // Run tests that don't need hardware
    test_request_building(&mut results);
    test_identity(&mut results);

    // Extract the pin we need before initializing RTOS timer
    let gpio4 = peripherals.GPIO4;

    // Initialize RTOS timer for embassy (this consumes TIMG0)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Run hardware tests
    test_dht11_sensor(&mut results, gpio4).await;

    // Print summary
    results.print_summary();

    esp_println::println!("\nTest run complete. Looping...");
    loop {
        if results.failed == 0 {
            Timer::after(Duration::from_millis(200)).await;
        } else {
            Timer::after(Duration::from_millis(1000)).await;
        }
    }
}
