//! Minimal SNTPv4 client codec (RFC 4330)

use crate::error::SntpError;

pub const NTP_PORT: u16 = 123;
pub const PACKET_LEN: usize = 48;

/// Seconds between 1900-01-01 (NTP era 0) and 1970-01-01.
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;
const NTP_ERA_SECS: u64 = 1 << 32;

const VERSION: u8 = 4;
const MODE_CLIENT: u8 = 3;
const MODE_SERVER: u8 = 4;
const LEAP_ALARM: u8 = 3;
const TRANSMIT_SECS: usize = 40;

/// LI = 0, VN = 4, Mode = 3, everything else zero.
pub fn request() -> [u8; PACKET_LEN] {
    let mut packet = [0u8; PACKET_LEN];
    packet[0] = (VERSION << 3) | MODE_CLIENT;
    packet
}

/// Unix seconds carried in the transmit timestamp of a server reply.
pub fn parse_response(packet: &[u8]) -> Result<u64, SntpError> {
    if packet.len() < PACKET_LEN {
        return Err(SntpError::Malformed);
    }

    let leap = packet[0] >> 6;
    let mode = packet[0] & 0x07;
    let stratum = packet[1];

    if mode != MODE_SERVER {
        return Err(SntpError::NotServer);
    }
    if leap == LEAP_ALARM || stratum == 0 {
        return Err(SntpError::Unsynchronised);
    }

    let secs = u32::from_be_bytes([
        packet[TRANSMIT_SECS],
        packet[TRANSMIT_SECS + 1],
        packet[TRANSMIT_SECS + 2],
        packet[TRANSMIT_SECS + 3],
    ]);
    if secs == 0 {
        return Err(SntpError::Malformed);
    }

    // Era 1 starts in 2036; anything below the offset is taken to be there.
    let secs = u64::from(secs);
    Ok(if secs >= NTP_UNIX_OFFSET {
        secs - NTP_UNIX_OFFSET
    } else {
        secs + NTP_ERA_SECS - NTP_UNIX_OFFSET
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(first: u8, stratum: u8, transmit: u32) -> [u8; PACKET_LEN] {
        let mut packet = [0u8; PACKET_LEN];
        packet[0] = first;
        packet[1] = stratum;
        packet[TRANSMIT_SECS..TRANSMIT_SECS + 4].copy_from_slice(&transmit.to_be_bytes());
        packet
    }

    #[test]
    fn request_header_byte() {
        let packet = request();
        assert_eq!(packet[0], 0x23);
        assert!(packet[1..].iter().all(|b| *b == 0));
    }

    #[test]
    fn parses_server_time() {
        // 2024-01-01T12:00:00Z
        let ntp = (1_704_110_400u64 + NTP_UNIX_OFFSET) as u32;
        assert_eq!(parse_response(&reply(0x24, 2, ntp)), Ok(1_704_110_400));
    }

    #[test]
    fn wraps_into_next_era() {
        assert_eq!(
            parse_response(&reply(0x24, 1, 1)),
            Ok(NTP_ERA_SECS + 1 - NTP_UNIX_OFFSET)
        );
    }

    #[test]
    fn rejects_short_packet() {
        assert_eq!(parse_response(&[0x24; 47]), Err(SntpError::Malformed));
    }

    #[test]
    fn rejects_client_mode_echo() {
        assert_eq!(
            parse_response(&reply(0x23, 2, 3_900_000_000)),
            Err(SntpError::NotServer)
        );
    }

    #[test]
    fn rejects_kiss_of_death_and_alarm() {
        assert_eq!(
            parse_response(&reply(0x24, 0, 3_900_000_000)),
            Err(SntpError::Unsynchronised)
        );
        assert_eq!(
            parse_response(&reply(0xE4, 2, 3_900_000_000)),
            Err(SntpError::Unsynchronised)
        );
    }

    #[test]
    fn rejects_zero_transmit_time() {
        assert_eq!(parse_response(&reply(0x24, 2, 0)), Err(SntpError::Malformed));
    }
}
