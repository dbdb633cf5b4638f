//! Connection manager configuration.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use serde::Deserialize;
use wire::Limits;

/// Settings for [`ConnectionManager`](crate::ConnectionManager).
///
/// Deserializes from the `net` section of the CLI config file; missing
/// fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Interface the listener binds to.
    pub bind_address: IpAddr,
    /// Disable Nagle's algorithm on every socket.
    pub nodelay: bool,
    /// Dial timeout per resolved address.
    pub connect_timeout_ms: u64,
    /// How often the non-blocking accept loop checks for shutdown.
    pub accept_poll_ms: u64,
    /// Size of each socket read.
    pub read_buffer_bytes: usize,
    /// Largest frame accepted or sent.
    pub max_frame_bytes: usize,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            nodelay: true,
            connect_timeout_ms: 5_000,
            accept_poll_ms: 10,
            read_buffer_bytes: 16 * 1024,
            max_frame_bytes: Limits::default().max_frame_bytes,
        }
    }
}

impl NetConfig {
    /// Loopback-only settings with small frames.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            connect_timeout_ms: 1_000,
            accept_poll_ms: 2,
            max_frame_bytes: Limits::for_testing().max_frame_bytes,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[must_use]
    pub const fn accept_poll(&self) -> Duration {
        Duration::from_millis(self.accept_poll_ms)
    }

    #[must_use]
    pub const fn wire_limits(&self) -> Limits {
        Limits {
            max_frame_bytes: self.max_frame_bytes,
        }
    }
}
