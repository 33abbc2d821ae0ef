use serde::Serialize;

/// Host-wide load, memory and uptime at report time.
///
/// Memory values are in bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SystemSummary {
    pub hostname: String,
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
    pub mem_total: u64,
    pub mem_free: u64,
    pub swap_total: u64,
    pub swap_free: u64,
    pub uptime_secs: f64,
}
