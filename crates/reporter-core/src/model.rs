// Model of the data handled by the reporter

use alloc::string::{String, ToString};
use core::fmt::{self, Write};

const SECONDS_PER_DAY: u64 = 86_400;

/// 48-bit hardware address of the station interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub fn to_text(&self) -> heapless::String<17> {
        let mut text = heapless::String::new();
        let _ = write!(text, "{}", self);
        text
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, byte) in self.0.iter().enumerate() {
            if idx != 0 {
                f.write_char(':')?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

/// Who this device is on the wire. Resolved once at boot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    device_id: String,
    device_name: String,
    mac: MacAddress,
    mac_text: String,
}

impl DeviceIdentity {
    pub fn new(device_id: &str, device_name: &str, mac: MacAddress) -> Self {
        Self {
            device_id: device_id.to_string(),
            device_name: device_name.to_string(),
            mac,
            mac_text: mac.to_text().as_str().to_string(),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn mac(&self) -> MacAddress {
        self.mac
    }

    /// `XX:XX:XX:XX:XX:XX`
    pub fn mac_address(&self) -> &str {
        &self.mac_text
    }
}

/// One DHT11 sample, both values in tenths (215 = 21.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReading {
    pub temperature: i16,
    pub humidity: i16,
}

impl SensorReading {
    pub fn new(temperature: i16, humidity: i16) -> Self {
        Self {
            temperature,
            humidity,
        }
    }

    pub fn temperature(&self) -> Tenths {
        Tenths(self.temperature)
    }

    pub fn humidity(&self) -> Tenths {
        Tenths(self.humidity)
    }
}

/// Renders a tenths value with two decimals, without going through floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tenths(pub i16);

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = i32::from(self.0);
        let sign = if value < 0 { "-" } else { "" };
        let magnitude = value.unsigned_abs();
        write!(f, "{}{}.{}0", sign, magnitude / 10, magnitude % 10)
    }
}

/// Wall-clock time in UTC, rendered as `YYYYMMDDHHMMSS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl Timestamp {
    /// Civil date of a Unix time (proleptic Gregorian, days-from-civil inverse).
    pub fn from_unix_secs(secs: u64) -> Self {
        let days = (secs / SECONDS_PER_DAY) as i64;
        let rem = secs % SECONDS_PER_DAY;

        let z = days + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z - era * 146_097;
        let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = doy - (153 * mp + 2) / 5 + 1;
        let month = if mp < 10 { mp + 3 } else { mp - 9 };
        let year = yoe + era * 400 + i64::from(month <= 2);

        Self {
            year: year as u16,
            month: month as u8,
            day: day as u8,
            hour: (rem / 3_600) as u8,
            minute: (rem % 3_600 / 60) as u8,
            second: (rem % 60) as u8,
        }
    }

    pub fn to_text(&self) -> heapless::String<14> {
        let mut text = heapless::String::new();
        let _ = write!(text, "{}", self);
        text
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}{:02}{:02}{:02}{:02}{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_mac_text(text: &str) -> bool {
        let bytes = text.as_bytes();
        bytes.len() == 17
            && bytes.iter().enumerate().all(|(idx, b)| {
                if idx % 3 == 2 {
                    *b == b':'
                } else {
                    b.is_ascii_digit() || (b'A'..=b'F').contains(b)
                }
            })
    }

    #[test]
    fn mac_is_uppercase_colon_separated() {
        let mac = MacAddress([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        assert_eq!(mac.to_text().as_str(), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn mac_pads_single_digit_bytes() {
        let mac = MacAddress([0x00, 0x01, 0x0a, 0x10, 0x7f, 0x80]);
        assert_eq!(mac.to_text().as_str(), "00:01:0A:10:7F:80");
    }

    #[test]
    fn every_mac_matches_the_wire_format() {
        let mut seed: u32 = 0x1234_5678;
        for _ in 0..500 {
            let mut bytes = [0u8; 6];
            for byte in bytes.iter_mut() {
                seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                *byte = (seed >> 24) as u8;
            }
            let text = MacAddress(bytes).to_text();
            assert!(is_mac_text(text.as_str()), "bad MAC text {}", text);
        }
        assert!(is_mac_text(MacAddress([0xff; 6]).to_text().as_str()));
        assert!(is_mac_text(MacAddress([0x00; 6]).to_text().as_str()));
    }

    #[test]
    fn identity_keeps_rendered_mac() {
        let identity = DeviceIdentity::new("ESP32", "kitchen", MacAddress([1, 2, 3, 4, 5, 6]));
        assert_eq!(identity.device_id(), "ESP32");
        assert_eq!(identity.device_name(), "kitchen");
        assert_eq!(identity.mac_address(), "01:02:03:04:05:06");
    }

    #[test]
    fn tenths_render_two_decimals() {
        assert_eq!(Tenths(215).to_string(), "21.50");
        assert_eq!(Tenths(602).to_string(), "60.20");
        assert_eq!(Tenths(0).to_string(), "0.00");
        assert_eq!(Tenths(-5).to_string(), "-0.50");
        assert_eq!(Tenths(-123).to_string(), "-12.30");
        assert_eq!(Tenths(i16::MIN).to_string(), "-3276.80");
    }

    #[test]
    fn timestamp_at_unix_epoch() {
        assert_eq!(Timestamp::from_unix_secs(0).to_text().as_str(), "19700101000000");
    }

    #[test]
    fn timestamp_new_year_2024_noon() {
        let ts = Timestamp::from_unix_secs(1_704_110_400);
        assert_eq!(ts.to_text().as_str(), "20240101120000");
    }

    #[test]
    fn timestamp_handles_leap_day() {
        let ts = Timestamp::from_unix_secs(951_782_400 + 3_600 * 23 + 60 * 59 + 59);
        assert_eq!(
            ts,
            Timestamp {
                year: 2000,
                month: 2,
                day: 29,
                hour: 23,
                minute: 59,
                second: 59,
            }
        );
    }

    #[test]
    fn timestamp_is_always_fourteen_digits() {
        for secs in [0u64, 59, 86_399, 1_000_000_000, 4_102_444_800] {
            let text = Timestamp::from_unix_secs(secs).to_text();
            assert_eq!(text.len(), 14);
            assert!(text.bytes().all(|b| b.is_ascii_digit()));
        }
    }
}
