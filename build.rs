//! Forwards Wi-Fi credentials and reporter settings from `.env` to the compiler.

const FORWARDED: &[&str] = &[
    "WIFI_SSID",
    "WIFI_PASSWORD",
    "REPORTER_SERVER_IP",
    "REPORTER_SERVER_PORT",
    "REPORTER_DEVICE_ID",
    "REPORTER_DEVICE_NAME",
    "REPORTER_USER_AGENT",
    "REPORTER_NTP_SERVER",
];

fn main() {
    println!("cargo:rerun-if-changed=.env");

    // A missing .env is fine: the variables may come from the shell.
    if let Ok(path) = dotenvy::dotenv() {
        println!("cargo:rerun-if-changed={}", path.display());
    }

    for name in FORWARDED {
        println!("cargo:rerun-if-env-changed={}", name);
        if let Ok(value) = std::env::var(name) {
            println!("cargo:rustc-env={}={}", name, value);
        }
    }
}
