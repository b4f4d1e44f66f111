//! Error types shared by the reporter and its hardware glue

use embassy_time::Duration;
use thiserror_no_std::Error;

/// Failure of a single HTTP POST attempt.
///
/// Every variant is terminal for the attempt. The reporter logs it and waits
/// [`PostError::backoff`] before handing control back to the loop.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostError {
    #[error("DNS lookup failed")]
    Dns,
    #[error("DNS lookup returned no address")]
    NoAddress,
    /// Socket allocation failed. `embassy-net` sockets borrow caller buffers
    /// and never fail to allocate, so no transport in this crate produces it.
    #[error("failed to allocate socket")]
    Socket,
    #[error("socket connect failed")]
    Connect,
    #[error("socket send failed")]
    Send,
    /// Setting the receive timeout failed. `TcpSocket::set_timeout` cannot
    /// fail, so like [`PostError::Socket`] this only keeps its back-off.
    #[error("failed to set socket receiving timeout")]
    Timeout,
}

impl PostError {
    /// Fixed delay applied after this failure.
    pub fn backoff(&self) -> Duration {
        match self {
            PostError::Dns | PostError::NoAddress | PostError::Socket => Duration::from_secs(1),
            PostError::Connect | PostError::Send | PostError::Timeout => Duration::from_secs(4),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("sensor did not respond in time")]
    Timeout,
    #[error("checksum mismatch")]
    ChecksumMismatch,
    #[error("GPIO error")]
    Pin,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SntpError {
    #[error("malformed SNTP reply")]
    Malformed,
    #[error("reply did not come from a server")]
    NotServer,
    #[error("server clock is not synchronised")]
    Unsynchronised,
    #[error("network error during time sync")]
    Network,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_per_failure_class() {
        for err in [PostError::Dns, PostError::NoAddress, PostError::Socket] {
            assert_eq!(err.backoff(), Duration::from_secs(1), "{err:?}");
        }
        for err in [PostError::Connect, PostError::Send, PostError::Timeout] {
            assert_eq!(err.backoff(), Duration::from_secs(4), "{err:?}");
        }
    }
}
