//! sentinel-core — host introspection engine for vps-sentinel.
//!
//! Provides:
//! - `collector` — process, socket and system collection from `/proc`,
//!   interface addresses and service logs
//! - `model` — plain data records produced by the collectors
//! - `report` — deduplication and ordering of collected records

pub mod collector;
pub mod model;
pub mod report;
