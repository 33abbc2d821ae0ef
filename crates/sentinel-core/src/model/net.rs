use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Owner shown when no process holds the socket inode.
pub const UNKNOWN_OWNER: &str = "?";

/// Connection table variant under `/proc/net/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Tcp6,
    Udp,
    Udp6,
}

impl Protocol {
    pub const ALL: [Protocol; 4] = [Protocol::Tcp, Protocol::Tcp6, Protocol::Udp, Protocol::Udp6];

    /// File name of the connection table, relative to `/proc/net`.
    pub fn table_name(self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Tcp6 => "tcp6",
            Protocol::Udp => "udp",
            Protocol::Udp6 => "udp6",
        }
    }

    /// Hex state code that marks a listening entry.
    ///
    /// TCP uses `TCP_LISTEN` (0x0A). UDP has no listen state, an unconnected
    /// bound socket reports `TCP_CLOSE` (0x07) instead.
    pub fn listen_state(self) -> &'static str {
        match self {
            Protocol::Tcp | Protocol::Tcp6 => "0A",
            Protocol::Udp | Protocol::Udp6 => "07",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Returned when a string names no [`Protocol`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProtocolError(pub String);

impl fmt::Display for ParseProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid protocol '{}' (expected tcp, tcp6, udp or udp6)",
            self.0
        )
    }
}

impl std::error::Error for ParseProtocolError {}

impl FromStr for Protocol {
    type Err = ParseProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Protocol::ALL
            .into_iter()
            .find(|p| p.table_name() == s)
            .ok_or_else(|| ParseProtocolError(s.to_string()))
    }
}

/// Listening row of a connection table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketEntry {
    pub port: u16,
    pub inode: u64,
    pub protocol: Protocol,
}

/// One row of the port report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortEntry {
    pub port: u16,
    /// Name of the owning process, or [`UNKNOWN_OWNER`].
    pub process: String,
}

/// Name of the loopback interface, left out of the address listing.
pub const LOOPBACK_INTERFACE: &str = "lo";

/// Address assigned to a network interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceAddress {
    pub name: String,
    pub address: IpAddr,
    pub prefix_len: u8,
}

impl InterfaceAddress {
    /// Address in CIDR notation, e.g. `192.0.2.10/24`.
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.address, self.prefix_len)
    }
}
