//! Data records produced by the collectors.
//!
//! Records are built fresh for every report and never mutated afterwards.

mod log;
mod net;
mod process;
mod system;

pub use log::{FailedLogin, HttpError, NginxReport, SshLogin, SshReport};
pub use net::{
    InterfaceAddress, LOOPBACK_INTERFACE, ParseProtocolError, PortEntry, Protocol, SocketEntry,
    UNKNOWN_OWNER,
};
pub use process::{ParseSortKeyError, ProcessRecord, SortKey};
pub use system::SystemSummary;
