use alloc::format;
use alloc::string::String;

pub const DEFAULT_SERVER_IP: &str = "192.168.0.3";
pub const DEFAULT_SERVER_PORT: u16 = 9090;
pub const DEFAULT_DEVICE_ID: &str = "ESP32";
pub const DEFAULT_USER_AGENT: &str = "esp-hal/1.0 esp32s3";
pub const DEFAULT_NTP_SERVER: &str = "162.159.200.1";
/// GPIO the DHT11 data line is wired to.
pub const DEFAULT_SENSOR_GPIO: u8 = 4;

/// Where and as whom the reporter talks. Fixed for the lifetime of the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReporterConfig {
    pub server_ip: &'static str,
    pub server_port: u16,
    pub device_id: &'static str,
    pub device_name: &'static str,
    pub user_agent: &'static str,
    pub ntp_server: &'static str,
}

impl ReporterConfig {
    /// Value of the `Host` header.
    pub fn host(&self) -> String {
        format!("{}:{}", self.server_ip, self.server_port)
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            server_ip: DEFAULT_SERVER_IP,
            server_port: DEFAULT_SERVER_PORT,
            device_id: DEFAULT_DEVICE_ID,
            device_name: DEFAULT_DEVICE_ID,
            user_agent: DEFAULT_USER_AGENT,
            ntp_server: DEFAULT_NTP_SERVER,
        }
    }
}
