//! Host introspection collectors for Linux.
//!
//! This module reads processes, listening sockets and host-wide metrics from
//! the `/proc` filesystem, with an in-memory source for tests. Interface
//! addresses and service logs go through the same [`SystemSource`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Collector                           │
//! │  ┌──────────────────┐  ┌─────────────┐  ┌─────────────────┐  │
//! │  │ ProcessCollector │  │ SocketTable │  │ SystemCollector │  │
//! │  │ - /proc/[pid]/*  │  │ - net/tcp.. │  │ - loadavg       │  │
//! │  │ - TimeBase       │  └──────┬──────┘  │ - meminfo       │  │
//! │  └────────┬─────────┘  ┌──────▼──────┐  └────────┬────────┘  │
//! │           │            │InodeResolver│           │           │
//! │           │            │ - [pid]/fd/*│           │           │
//! │           │            └──────┬──────┘           │           │
//! │           └──────────────┬────┴──────────────────┘           │
//! │                   ┌──────▼───────┐                           │
//! │                   │ SystemSource │ (trait)                   │
//! │                   └──────┬───────┘                           │
//! └──────────────────────────┼───────────────────────────────────┘
//!                  ┌─────────┴─────────┐
//!           ┌──────▼──────┐     ┌──────▼──────┐
//!           │   RealFs    │     │   MockFs    │
//!           │  (Linux)    │     │ (fixtures)  │
//!           └─────────────┘     └─────────────┘
//! ```
//!
//! [`log_collector::LogCollector`] parses sshd and nginx logs and sits next
//! to the `/proc` collectors on the same source.
//!
//! # Usage
//!
//! ```
//! use sentinel_core::collector::{Collector, MockFs};
//! use sentinel_core::model::{Protocol, SortKey};
//!
//! let collector = Collector::new(MockFs::two_process_system(), "/proc");
//! let processes = collector.process_report(SortKey::Cpu).unwrap();
//! assert_eq!(processes[0].name, "worker");
//!
//! let ports = collector.port_report(Protocol::Tcp).unwrap();
//! assert_eq!(ports[0].port, 8080);
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod log_collector;
pub mod mock;
pub mod procfs;
pub mod traits;

pub use collector::Collector;
pub use mock::MockFs;
pub use procfs::CollectError;
pub use traits::{FileStat, RealFs, SystemSource};
