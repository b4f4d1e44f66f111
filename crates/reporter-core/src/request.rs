//! HTTP/1.0 request building for the two reporting endpoints

use alloc::string::String;
use core::fmt::Write;

use crate::config::ReporterConfig;
use crate::model::{DeviceIdentity, SensorReading, Timestamp};

pub const DEVICE_PATH: &str = "/device";
pub const MEASUREMENT_PATH: &str = "/measurement";
pub const CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// `application/x-www-form-urlencoded` body builder.
///
/// Keys are written as given. Values keep alphanumerics and `-._~:*` as-is,
/// spaces become `+`, every other byte is percent-encoded.
#[derive(Debug, Default)]
pub struct FormBody {
    text: String,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: &str, value: impl core::fmt::Display) -> Self {
        if !self.text.is_empty() {
            self.text.push('&');
        }
        self.text.push_str(key);
        self.text.push('=');
        let mut encoder = FormEncoder(&mut self.text);
        let _ = write!(encoder, "{}", value);
        self
    }

    pub fn finish(self) -> String {
        self.text
    }
}

struct FormEncoder<'a>(&'a mut String);

impl Write for FormEncoder<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for byte in s.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b':' | b'*' => {
                    self.0.push(byte as char)
                }
                b' ' => self.0.push('+'),
                other => write!(self.0, "%{:02X}", other)?,
            }
        }
        Ok(())
    }
}

/// `id=<id>&n=<name>&k=<mac>`
pub fn registration_body(identity: &DeviceIdentity) -> String {
    FormBody::new()
        .field("id", identity.device_id())
        .field("n", identity.device_name())
        .field("k", identity.mac_address())
        .finish()
}

/// `id=<id>&t=<temp>&h=<humidity>&timestamp=<ts>&key=<mac>`
pub fn measurement_body(
    identity: &DeviceIdentity,
    reading: &SensorReading,
    timestamp: &Timestamp,
) -> String {
    FormBody::new()
        .field("id", identity.device_id())
        .field("t", reading.temperature())
        .field("h", reading.humidity())
        .field("timestamp", timestamp)
        .field("key", identity.mac_address())
        .finish()
}

/// A complete request, ready to be written to a socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    path: &'static str,
    text: String,
    body_start: usize,
}

impl HttpRequest {
    pub fn post(config: &ReporterConfig, path: &'static str, body: &str) -> Self {
        let mut text = String::with_capacity(160 + body.len());
        let _ = write!(
            text,
            "POST {} HTTP/1.0\r\n\
             Host: {}:{}\r\n\
             User-Agent: {}\r\n\
             Content-Type: {}\r\n\
             Content-Length: {}\r\n\
             \r\n",
            path,
            config.server_ip,
            config.server_port,
            config.user_agent,
            CONTENT_TYPE,
            body.len()
        );
        let body_start = text.len();
        text.push_str(body);

        Self {
            path,
            text,
            body_start,
        }
    }

    pub fn registration(config: &ReporterConfig, identity: &DeviceIdentity) -> Self {
        Self::post(config, DEVICE_PATH, &registration_body(identity))
    }

    pub fn measurement(
        config: &ReporterConfig,
        identity: &DeviceIdentity,
        reading: &SensorReading,
        timestamp: &Timestamp,
    ) -> Self {
        Self::post(
            config,
            MEASUREMENT_PATH,
            &measurement_body(identity, reading, timestamp),
        )
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn body(&self) -> &str {
        &self.text[self.body_start..]
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }
}

/// Status line of a server reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLine {
    pub minor_version: u8,
    pub code: u16,
}

/// Parses `HTTP/1.x NNN ...` from the first bytes of a response.
pub fn parse_status_line(head: &[u8]) -> Option<StatusLine> {
    let line_end = head
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(head.len());
    let line = core::str::from_utf8(&head[..line_end]).ok()?;
    let mut parts = line.splitn(3, ' ');

    let version = parts.next()?.strip_prefix("HTTP/1.")?;
    let minor_version = version.parse().ok()?;

    let code = parts.next()?;
    if code.len() != 3 {
        return None;
    }
    let code = code.parse().ok()?;

    Some(StatusLine {
        minor_version,
        code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MacAddress;

    fn identity() -> DeviceIdentity {
        DeviceIdentity::new("ESP32", "ESP32", MacAddress([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]))
    }

    fn content_length(request: &HttpRequest) -> usize {
        request
            .as_str()
            .lines()
            .find_map(|line| line.strip_prefix("Content-Length: "))
            .and_then(|value| value.trim_end().parse().ok())
            .expect("Content-Length header")
    }

    fn body_after_headers(request: &HttpRequest) -> &str {
        let text = request.as_str();
        let split = text.find("\r\n\r\n").expect("header terminator");
        &text[split + 4..]
    }

    #[test]
    fn measurement_body_matches_wire_format() {
        let reading = SensorReading::new(215, 602);
        let ts = Timestamp::from_unix_secs(1_704_110_400);
        assert_eq!(
            measurement_body(&identity(), &reading, &ts),
            "id=ESP32&t=21.50&h=60.20&timestamp=20240101120000&key=AA:BB:CC:DD:EE:FF"
        );
    }

    #[test]
    fn negative_temperature_in_body() {
        let reading = SensorReading::new(-15, 300);
        let ts = Timestamp::from_unix_secs(0);
        let body = measurement_body(&identity(), &reading, &ts);
        assert!(body.contains("&t=-1.50&h=30.00&"));
    }

    #[test]
    fn registration_body_matches_wire_format() {
        assert_eq!(
            registration_body(&identity()),
            "id=ESP32&n=ESP32&k=AA:BB:CC:DD:EE:FF"
        );
    }

    #[test]
    fn values_outside_safe_set_are_encoded() {
        let body = FormBody::new()
            .field("n", "living room&co")
            .field("x", "a=b/ü")
            .finish();
        assert_eq!(body, "n=living+room%26co&x=a%3Db%2F%C3%BC");
    }

    #[test]
    fn registration_request_layout() {
        let request = HttpRequest::registration(&ReporterConfig::default(), &identity());
        assert_eq!(
            request.as_str(),
            "POST /device HTTP/1.0\r\n\
             Host: 192.168.0.3:9090\r\n\
             User-Agent: esp-hal/1.0 esp32s3\r\n\
             Content-Type: application/x-www-form-urlencoded\r\n\
             Content-Length: 36\r\n\
             \r\n\
             id=ESP32&n=ESP32&k=AA:BB:CC:DD:EE:FF"
        );
        assert_eq!(request.path(), DEVICE_PATH);
    }

    #[test]
    fn content_length_equals_body_bytes() {
        let config = ReporterConfig::default();
        let named = DeviceIdentity::new("ESP32", "salón de estar", MacAddress([0; 6]));
        let requests = [
            HttpRequest::registration(&config, &identity()),
            HttpRequest::registration(&config, &named),
            HttpRequest::measurement(
                &config,
                &identity(),
                &SensorReading::new(-400, 1000),
                &Timestamp::from_unix_secs(4_102_444_799),
            ),
            HttpRequest::post(&config, MEASUREMENT_PATH, ""),
        ];
        for request in requests.iter() {
            let body = body_after_headers(request);
            assert_eq!(content_length(request), body.len());
            assert_eq!(request.body(), body);
        }
    }

    #[test]
    fn status_line_is_parsed() {
        assert_eq!(
            parse_status_line(b"HTTP/1.0 201 Created\r\nServer: x\r\n"),
            Some(StatusLine {
                minor_version: 0,
                code: 201
            })
        );
        assert_eq!(
            parse_status_line(b"HTTP/1.1 404"),
            Some(StatusLine {
                minor_version: 1,
                code: 404
            })
        );
    }

    #[test]
    fn garbage_status_line_is_rejected() {
        assert_eq!(parse_status_line(b""), None);
        assert_eq!(parse_status_line(b"HTTP/2 200 OK\r\n"), None);
        assert_eq!(parse_status_line(b"HTTP/1.0 20 OK\r\n"), None);
        assert_eq!(parse_status_line(b"hello world\r\n"), None);
    }
}
