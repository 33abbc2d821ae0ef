//! Collectors for the Linux `/proc` filesystem.
//!
//! This module provides parsers and collectors for reading process, socket
//! and system information from the `/proc` virtual filesystem.

pub mod cpu;
pub mod inode;
pub mod net;
pub mod parser;
pub mod process;
pub mod system;

pub use cpu::{TimeBase, cpu_usage_percent};
pub use inode::InodeResolver;
pub use net::SocketTable;
pub use parser::UserResolver;
pub use process::{CollectError, ProcessCollector};
pub use system::SystemCollector;
