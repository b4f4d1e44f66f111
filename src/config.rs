//! Build-time configuration, forwarded from `.env` by `build.rs`

use log::warn;
use reporter_core::config::{
    DEFAULT_DEVICE_ID, DEFAULT_NTP_SERVER, DEFAULT_SERVER_IP, DEFAULT_SERVER_PORT,
    DEFAULT_USER_AGENT,
};
use reporter_core::ReporterConfig;

#[derive(Debug, Clone, Copy)]
pub struct WifiCredentials {
    pub ssid: &'static str,
    pub password: &'static str,
}

pub fn wifi_credentials() -> WifiCredentials {
    let ssid = option_env!("WIFI_SSID").unwrap_or("");
    if ssid.is_empty() {
        warn!("WIFI_SSID was not set at build time; the station will not associate");
    }
    WifiCredentials {
        ssid,
        password: option_env!("WIFI_PASSWORD").unwrap_or(""),
    }
}

pub fn reporter_config() -> ReporterConfig {
    let server_port = match option_env!("REPORTER_SERVER_PORT") {
        Some(port) => port.parse().unwrap_or_else(|_| {
            warn!(
                "REPORTER_SERVER_PORT={} is not a port, using {}",
                port, DEFAULT_SERVER_PORT
            );
            DEFAULT_SERVER_PORT
        }),
        None => DEFAULT_SERVER_PORT,
    };
    let device_id = option_env!("REPORTER_DEVICE_ID").unwrap_or(DEFAULT_DEVICE_ID);

    ReporterConfig {
        server_ip: option_env!("REPORTER_SERVER_IP").unwrap_or(DEFAULT_SERVER_IP),
        server_port,
        device_id,
        device_name: option_env!("REPORTER_DEVICE_NAME").unwrap_or(device_id),
        user_agent: option_env!("REPORTER_USER_AGENT").unwrap_or(DEFAULT_USER_AGENT),
        ntp_server: option_env!("REPORTER_NTP_SERVER").unwrap_or(DEFAULT_NTP_SERVER),
    }
}
